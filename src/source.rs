//! Review Source Boundary
//!
//! The generation core consumes review corpora through the [`ReviewSource`]
//! trait; where the strings come from (a scraper, an upstream service, a
//! local file) is the caller's concern. Implementations return raw review
//! strings; blank entries are tolerated here and filtered at the boundary,
//! but an empty usable corpus is a source error, never silently passed to
//! the pipeline.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::types::{Result, ReviewError};

/// Boundary trait for fetching the raw review corpus of a place
#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Fetch all available review strings for `target`.
    ///
    /// An `Ok` with zero usable entries must be surfaced as a
    /// [`ReviewError::Source`] by callers; [`into_corpus`] does this.
    async fn fetch_reviews(&self, target: &Url) -> Result<Vec<String>>;
}

/// In-memory source carrying a fixed corpus, for tests and callers that
/// already hold the reviews
#[derive(Debug, Clone, Default)]
pub struct FixedSource {
    reviews: Vec<String>,
}

impl FixedSource {
    pub fn new(reviews: Vec<String>) -> Self {
        Self { reviews }
    }
}

#[async_trait]
impl ReviewSource for FixedSource {
    async fn fetch_reviews(&self, _target: &Url) -> Result<Vec<String>> {
        Ok(self.reviews.clone())
    }
}

/// Normalize a fetched corpus: trim entries, drop blanks, reject an empty
/// result.
pub fn into_corpus(raw: Vec<String>) -> Result<Vec<String>> {
    let corpus: Vec<String> = raw
        .into_iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect();

    if corpus.is_empty() {
        return Err(ReviewError::Source(
            "source returned no usable reviews".to_string(),
        ));
    }
    debug!(count = corpus.len(), "Review corpus normalized");
    Ok(corpus)
}

/// Read a review corpus from a local file.
///
/// A `.json` file must hold an array of strings; any other extension is
/// read as plain text with one review per non-blank line.
pub fn read_reviews_file(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)?;

    let raw = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str::<Vec<String>>(&contents)?
    } else {
        contents.lines().map(String::from).collect()
    };

    into_corpus(raw)
}
