//! Review Generation Pipeline
//!
//! Runs the multi-stage prompt chain against a single provider. The blog
//! shape walks Digesting → Outlining → SectionWriting → TitleWriting →
//! Assembled; the visitor shape is a single flat-paragraph stage sharing
//! the same retry, timeout, and sanitization machinery.
//!
//! Stages execute strictly in dependency order because each consumes the
//! prior stage's output. Section writing fans out concurrently across
//! outline titles, but results are reassembled in outline order. Any
//! stage's unrecoverable failure aborts this pipeline instance with a
//! single [`FailureReason`]; the orchestrator then advances to the next
//! provider (all-or-nothing, no partial documents).

pub mod orchestrator;
pub mod prompt;

pub use orchestrator::{FallbackOrchestrator, OrchestratorConfig};

use std::sync::LazyLock;
use std::time::{Duration, Instant};

use regex::Regex;
use tracing::debug;

use crate::ai::retry::{RetryPolicy, retry};
use crate::ai::timeout::with_timeout;
use crate::ai::provider::SharedProvider;
use crate::constants::{document as doc_constants, network as net_constants};
use crate::report::{PipelineStage, SharedReporter, StageOutcome};
use crate::text::{sanitize, sanitize_body};
use crate::types::{
    DocumentSection, FailureReason, GeneratedDocument, GenerationRequest, RequestId, ReviewKind,
};

/// Tuning for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Per-call retry policy applied to every model call
    pub retry: RetryPolicy,
    /// Outline section count requested and enforced
    pub section_count: usize,
    /// Deadline for each individual model call
    pub stage_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            section_count: doc_constants::SECTION_COUNT,
            stage_timeout: Duration::from_secs(net_constants::DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Splits raw outline text on newlines or leading enumerators
static OUTLINE_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n|\d+\.|\d+\)").expect("outline delimiter pattern is valid"));

/// Split a sanitized outline response into section titles.
///
/// Fragile against model output drift by nature; zero results are the
/// caller's signal to raise [`FailureReason::MalformedResponse`] rather
/// than proceeding with an empty outline.
pub fn parse_outline(text: &str, cap: usize) -> Vec<String> {
    OUTLINE_DELIMITER
        .split(text)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .take(cap)
        .map(String::from)
        .collect()
}

/// Multi-stage generation against one provider
pub struct ReviewPipeline {
    provider: SharedProvider,
    reporter: SharedReporter,
    config: PipelineConfig,
}

impl ReviewPipeline {
    pub fn new(provider: SharedProvider, reporter: SharedReporter, config: PipelineConfig) -> Self {
        Self {
            provider,
            reporter,
            config,
        }
    }

    /// Run the pipeline shape selected by `request.kind`.
    ///
    /// Returns the assembled document, or the failing stage's reason.
    /// Input validation happens in the orchestrator before any provider
    /// is committed.
    pub async fn run(
        &self,
        request: &GenerationRequest,
        request_id: &RequestId,
    ) -> std::result::Result<GeneratedDocument, FailureReason> {
        match request.kind {
            ReviewKind::Blog => self.run_blog(request, request_id).await,
            ReviewKind::Visitor => self.run_visitor(request, request_id).await,
        }
    }

    async fn run_blog(
        &self,
        request: &GenerationRequest,
        request_id: &RequestId,
    ) -> std::result::Result<GeneratedDocument, FailureReason> {
        // Digesting
        let digest_prompt =
            prompt::digest_prompt(&request.reviews, request.impression(), request.tone());
        let digest = self
            .run_stage(request_id, PipelineStage::Digest, &digest_prompt, false)
            .await?;

        // Outlining
        let outline_prompt = prompt::outline_prompt(&digest, self.config.section_count);
        let outline_text = self
            .run_stage(request_id, PipelineStage::Outline, &outline_prompt, true)
            .await?;
        let outline = parse_outline(&outline_text, self.config.section_count);
        if outline.is_empty() {
            return Err(FailureReason::MalformedResponse(
                "outline response produced no section titles".to_string(),
            ));
        }
        debug!(titles = outline.len(), "Outline parsed");

        // SectionWriting: fan out concurrently, reassemble in outline order.
        // try_join_all preserves input order regardless of completion order,
        // and its eager failure matches the all-or-nothing policy.
        let section_futures = outline.iter().map(|title| {
            let section_prompt = prompt::section_prompt(title, &digest);
            async move {
                let body = self
                    .run_stage_owned(request_id, PipelineStage::Section, section_prompt, true)
                    .await?;
                Ok::<_, FailureReason>(DocumentSection {
                    heading: title.clone(),
                    body,
                })
            }
        });
        let sections = futures::future::try_join_all(section_futures).await?;

        // TitleWriting
        let body_text = join_sections(&sections);
        let title_prompt = prompt::title_prompt(&body_text);
        let title_text = self
            .run_stage(request_id, PipelineStage::Title, &title_prompt, true)
            .await?;
        let title = first_nonblank_line(&title_text);

        // Assembled: one final cleanup pass so the document reads as plain
        // prose with only bold headings preserved
        let assembled = sanitize_body(&format!("**{}**\n\n{}", title, body_text));

        Ok(GeneratedDocument {
            title,
            sections,
            assembled_text: assembled,
        })
    }

    async fn run_visitor(
        &self,
        request: &GenerationRequest,
        request_id: &RequestId,
    ) -> std::result::Result<GeneratedDocument, FailureReason> {
        let visitor_prompt =
            prompt::visitor_prompt(&request.reviews, request.impression(), request.tone());
        let paragraph = self
            .run_stage(request_id, PipelineStage::Visitor, &visitor_prompt, true)
            .await?;

        Ok(GeneratedDocument {
            title: String::new(),
            sections: Vec::new(),
            assembled_text: paragraph,
        })
    }

    /// One stage: model call through retry and timeout, then sanitization.
    /// An empty sanitized result is a stage failure, never silently passed
    /// downstream.
    async fn run_stage(
        &self,
        request_id: &RequestId,
        stage: PipelineStage,
        stage_prompt: &str,
        strip_italics: bool,
    ) -> std::result::Result<String, FailureReason> {
        let start = Instant::now();

        let result = retry(&self.config.retry, || {
            with_timeout(
                self.config.stage_timeout,
                self.provider
                    .complete(stage_prompt, Some(prompt::SYSTEM_PROMPT)),
                "model call",
            )
        })
        .await
        .and_then(|raw| {
            let clean = if strip_italics {
                sanitize_body(&raw)
            } else {
                sanitize(&raw)
            };
            if clean.is_empty() {
                Err(FailureReason::EmptyResponse(format!(
                    "{} stage produced no usable text",
                    stage
                )))
            } else {
                Ok(clean)
            }
        });

        let outcome = match &result {
            Ok(_) => StageOutcome::Success,
            Err(reason) => StageOutcome::Failure(reason.clone()),
        };
        self.reporter.record_stage_result(
            request_id,
            stage,
            self.provider.id(),
            &outcome,
            start.elapsed(),
        );

        result
    }

    async fn run_stage_owned(
        &self,
        request_id: &RequestId,
        stage: PipelineStage,
        stage_prompt: String,
        strip_italics: bool,
    ) -> std::result::Result<String, FailureReason> {
        self.run_stage(request_id, stage, &stage_prompt, strip_italics)
            .await
    }
}

/// Canonical section serialization: bolded heading, body, sections joined
/// by blank lines
fn join_sections(sections: &[DocumentSection]) -> String {
    sections
        .iter()
        .map(|s| format!("**{}**\n{}", s.heading, s.body))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Title responses sometimes arrive with trailing commentary; keep only
/// the first non-blank line
fn first_nonblank_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use crate::ai::provider::ProviderClient;
    use crate::report::NoopReporter;
    use crate::types::{ProviderId, ToneMode, UserContext};

    /// Provider scripted by prompt shape, so concurrent section calls can
    /// be answered without ordering assumptions.
    struct ScriptedProvider {
        calls: AtomicU32,
        fail_outline: bool,
        empty_digest: bool,
    }

    impl ScriptedProvider {
        fn new() -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail_outline: false,
                empty_digest: false,
            }
        }
    }

    #[async_trait]
    impl ProviderClient for ScriptedProvider {
        async fn complete(
            &self,
            prompt: &str,
            _system_prompt: Option<&str>,
        ) -> std::result::Result<String, FailureReason> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if prompt.contains("소제목을 정확히") {
                if self.fail_outline {
                    return Err(FailureReason::RateLimited("429 too many requests".into()));
                }
                return Ok("감동의 맛 🍜\n포근한 분위기\n친절한 응대\n넉넉한 양\n깔끔한 매장\n합리적인 가격".into());
            }
            if prompt.contains("섹션의 본문만") {
                // Later sections resolve faster to exercise order preservation
                let delay = if prompt.contains("감동의 맛") { 30 } else { 1 };
                tokio::time::sleep(Duration::from_millis(delay)).await;
                let heading = ["감동의 맛", "포근한 분위기", "친절한 응대", "넉넉한 양", "깔끔한 매장", "합리적인 가격"]
                    .iter()
                    .find(|h| prompt.contains(*h))
                    .copied()
                    .unwrap_or("기타");
                return Ok(format!("{}에 대한 본문입니다. 정말 만족스러웠어요.", heading));
            }
            if prompt.contains("제목을 하나만") {
                return Ok("다시 가고 싶은 동네 맛집 🍜\n\n이 제목이 어떠세요?".into());
            }
            if prompt.contains("방문자 리뷰") {
                return Ok("네, 분위기도 좋고 음식도 맛있어서 만족스러운 방문이었어요.".into());
            }
            // Digest stage
            if self.empty_digest {
                return Ok("네,".into());
            }
            Ok("맛과 분위기, 응대가 모두 훌륭하다는 평이 많습니다.".into())
        }

        fn id(&self) -> ProviderId {
            ProviderId::OpenAi
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    fn pipeline(provider: ScriptedProvider) -> ReviewPipeline {
        ReviewPipeline::new(
            Arc::new(provider),
            Arc::new(NoopReporter),
            PipelineConfig {
                retry: RetryPolicy::new(0, Duration::from_millis(1), 1.0),
                ..Default::default()
            },
        )
    }

    fn blog_request() -> GenerationRequest {
        GenerationRequest::new(
            vec!["맛있어요 진짜 강추".into(), "분위기 좋고 친절해요".into()],
            ReviewKind::Blog,
        )
        .with_context(UserContext {
            impression: None,
            tone: ToneMode::Casual,
        })
    }

    #[test]
    fn test_parse_outline_splits_and_caps() {
        let raw = "첫째 주제\n둘째 주제\n1. 셋째 주제 2) 넷째 주제\n다섯\n여섯\n일곱\n여덟";
        let outline = parse_outline(raw, 6);
        assert_eq!(outline.len(), 6);
        assert_eq!(outline[0], "첫째 주제");
        assert_eq!(outline[2], "셋째 주제");
    }

    #[test]
    fn test_parse_outline_drops_empties() {
        assert!(parse_outline("", 6).is_empty());
        assert!(parse_outline("\n\n1. \n2) ", 6).is_empty());
    }

    #[test]
    fn test_first_nonblank_line() {
        assert_eq!(first_nonblank_line("\n\n제목입니다\n부연 설명"), "제목입니다");
        assert_eq!(first_nonblank_line("   "), "");
    }

    #[tokio::test]
    async fn test_blog_chain_assembles_in_outline_order() {
        let doc = pipeline(ScriptedProvider::new())
            .run(&blog_request(), &RequestId::new("req-1"))
            .await
            .unwrap();

        assert_eq!(doc.title, "다시 가고 싶은 동네 맛집 🍜");
        assert_eq!(doc.sections.len(), 6);
        // Section order follows the outline even though the first section
        // resolved last
        assert_eq!(doc.sections[0].heading, "감동의 맛 🍜");
        assert!(doc.assembled_text.starts_with("**다시 가고 싶은 동네 맛집 🍜**\n\n"));
        let pos_first = doc.assembled_text.find("감동의 맛").unwrap();
        let pos_last = doc.assembled_text.find("합리적인 가격").unwrap();
        assert!(pos_first < pos_last);
    }

    #[tokio::test]
    async fn test_assembled_text_has_no_residual_markdown() {
        let doc = pipeline(ScriptedProvider::new())
            .run(&blog_request(), &RequestId::new("req-1"))
            .await
            .unwrap();

        for line in doc.assembled_text.lines() {
            assert!(!line.starts_with('#'));
            assert!(!line.starts_with("- "));
        }
        // Bold headings preserved
        assert!(doc.assembled_text.contains("**포근한 분위기**"));
    }

    #[tokio::test]
    async fn test_empty_digest_fails_stage() {
        let provider = ScriptedProvider {
            empty_digest: true,
            ..ScriptedProvider::new()
        };
        let result = pipeline(provider)
            .run(&blog_request(), &RequestId::new("req-1"))
            .await;
        assert!(matches!(result, Err(FailureReason::EmptyResponse(_))));
    }

    #[tokio::test]
    async fn test_outline_failure_aborts_pipeline() {
        let provider = ScriptedProvider {
            fail_outline: true,
            ..ScriptedProvider::new()
        };
        let result = pipeline(provider)
            .run(&blog_request(), &RequestId::new("req-1"))
            .await;
        assert!(matches!(result, Err(FailureReason::RateLimited(_))));
    }

    #[tokio::test]
    async fn test_visitor_kind_is_flat_paragraph() {
        let request = GenerationRequest::new(
            vec!["맛있어요".into()],
            ReviewKind::Visitor,
        );
        let doc = pipeline(ScriptedProvider::new())
            .run(&request, &RequestId::new("req-1"))
            .await
            .unwrap();

        assert!(doc.title.is_empty());
        assert!(doc.sections.is_empty());
        // Greeting filler stripped by sanitization
        assert_eq!(
            doc.assembled_text,
            "분위기도 좋고 음식도 맛있어서 만족스러운 방문이었어요."
        );
    }

    #[tokio::test]
    async fn test_title_takes_first_nonblank_line_only() {
        let doc = pipeline(ScriptedProvider::new())
            .run(&blog_request(), &RequestId::new("req-1"))
            .await
            .unwrap();
        assert!(!doc.title.contains('\n'));
        assert!(!doc.title.contains("어떠세요"));
    }
}
