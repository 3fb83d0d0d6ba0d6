//! Generate Command
//!
//! Runs the full fallback generation chain against a review corpus read
//! from a file or from repeated `--review` arguments.
//!
//! Usage:
//!   reviewgen generate --reviews-file reviews.txt
//!   reviewgen generate --review "맛있어요" --review "친절해요" --kind visitor
//!   reviewgen generate --reviews-file reviews.json --tone energetic --json

use std::path::PathBuf;
use std::sync::Arc;

use console::style;

use crate::config::{Config, ConfigLoader};
use crate::pipeline::FallbackOrchestrator;
use crate::report::TracingReporter;
use crate::source::{into_corpus, read_reviews_file};
use crate::types::{
    GenerationRequest, GenerationResponse, Result, ReviewError, ReviewKind, ToneMode, UserContext,
    failure_payload,
};

/// Options for one generate invocation
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// File holding the review corpus (JSON array or one review per line)
    pub reviews_file: Option<PathBuf>,
    /// Reviews passed directly on the command line
    pub reviews: Vec<String>,
    pub kind: ReviewKind,
    pub tone: ToneMode,
    pub impression: Option<String>,
    /// Emit the response contract as JSON instead of styled text
    pub json: bool,
    /// Config file overriding the resolution chain
    pub config_file: Option<PathBuf>,
}

pub async fn run(options: GenerateOptions) -> Result<()> {
    let config = match &options.config_file {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    let corpus = load_corpus(&options)?;
    let request = GenerationRequest::new(corpus, options.kind).with_context(UserContext {
        impression: options.impression.clone(),
        tone: options.tone,
    });

    let orchestrator = build_orchestrator(&config)?;

    if !options.json {
        println!(
            "{} Generating {} review from {} source reviews...",
            style("●").cyan(),
            options.kind_label(),
            request.reviews.len()
        );
    }

    match orchestrator.generate(&request).await {
        Ok(document) => {
            if options.json {
                let response = GenerationResponse::from(&document);
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!();
                println!("{}", document.assembled_text);
                println!();
                println!("{} Generation complete", style("✓").green());
            }
            Ok(())
        }
        Err(err) => {
            if options.json {
                println!("{}", serde_json::to_string_pretty(&failure_payload(&err))?);
            }
            Err(err)
        }
    }
}

impl GenerateOptions {
    fn kind_label(&self) -> &'static str {
        match self.kind {
            ReviewKind::Visitor => "visitor",
            ReviewKind::Blog => "blog",
        }
    }
}

fn load_corpus(options: &GenerateOptions) -> Result<Vec<String>> {
    match &options.reviews_file {
        Some(path) => read_reviews_file(path),
        None if !options.reviews.is_empty() => into_corpus(options.reviews.clone()),
        None => Err(ReviewError::InputValidation(
            "provide reviews via --reviews-file or --review".to_string(),
        )),
    }
}

fn build_orchestrator(config: &Config) -> Result<FallbackOrchestrator> {
    let providers = config.build_provider_chain()?;
    Ok(FallbackOrchestrator::new(
        providers,
        Arc::new(TracingReporter),
        config.orchestrator_config(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> GenerateOptions {
        GenerateOptions {
            reviews_file: None,
            reviews: vec!["맛있어요".into()],
            kind: ReviewKind::Blog,
            tone: ToneMode::Casual,
            impression: None,
            json: false,
            config_file: None,
        }
    }

    #[test]
    fn test_load_corpus_from_args() {
        let corpus = load_corpus(&options()).unwrap();
        assert_eq!(corpus, vec!["맛있어요".to_string()]);
    }

    #[test]
    fn test_load_corpus_requires_input() {
        let empty = GenerateOptions {
            reviews: vec![],
            ..options()
        };
        assert!(matches!(
            load_corpus(&empty),
            Err(ReviewError::InputValidation(_))
        ));
    }

    #[test]
    fn test_file_takes_precedence_over_args() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(file, "파일 리뷰").unwrap();

        let with_file = GenerateOptions {
            reviews_file: Some(file.path().to_path_buf()),
            ..options()
        };
        let corpus = load_corpus(&with_file).unwrap();
        assert_eq!(corpus, vec!["파일 리뷰".to_string()]);
    }
}
