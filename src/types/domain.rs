//! Generation Domain Types
//!
//! Request and document model shared by the pipeline and the orchestrator.
//! A request is constructed once per invocation and treated as immutable;
//! the document is built incrementally by the pipeline and immutable once
//! returned.

use serde::{Deserialize, Serialize};

use super::error::{FailureReason, ProviderId, ReviewError, Result};

/// Tone selector used to steer prompt phrasing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToneMode {
    Gentle,
    #[default]
    Casual,
    Energetic,
}

impl ToneMode {
    /// Parse a tone from its wire form
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gentle" => Some(Self::Gentle),
            "casual" => Some(Self::Casual),
            "energetic" => Some(Self::Energetic),
            _ => None,
        }
    }
}

impl std::fmt::Display for ToneMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gentle => write!(f, "gentle"),
            Self::Casual => write!(f, "casual"),
            Self::Energetic => write!(f, "energetic"),
        }
    }
}

/// Which derivative artifact to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReviewKind {
    /// Short flat paragraph in visitor-review style
    Visitor,
    /// Full digest → outline → sections → title chain
    #[default]
    Blog,
}

/// Optional user-supplied steering context.
///
/// The impression string has already passed external length/toxicity/
/// relevance filtering; it is only interpolated into prompts here, never
/// re-validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impression: Option<String>,
    #[serde(default)]
    pub tone: ToneMode,
}

/// One generation request: raw review corpus plus optional steering context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Raw review strings, each non-empty. Insertion order is irrelevant
    /// to generation.
    pub reviews: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<UserContext>,
    #[serde(default)]
    pub kind: ReviewKind,
}

impl GenerationRequest {
    pub fn new(reviews: Vec<String>, kind: ReviewKind) -> Self {
        Self {
            reviews,
            context: None,
            kind,
        }
    }

    pub fn with_context(mut self, context: UserContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Structural validation performed before any provider is tried.
    /// Failures here are never retried.
    pub fn validate(&self) -> Result<()> {
        if self.reviews.is_empty() {
            return Err(ReviewError::InputValidation(
                "review corpus is empty".to_string(),
            ));
        }
        if self.reviews.iter().all(|r| r.trim().is_empty()) {
            return Err(ReviewError::InputValidation(
                "review corpus contains only blank entries".to_string(),
            ));
        }
        Ok(())
    }

    pub fn impression(&self) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|c| c.impression.as_deref())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn tone(&self) -> ToneMode {
        self.context.as_ref().map(|c| c.tone).unwrap_or_default()
    }
}

/// One heading/body pair of the blog-style document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSection {
    pub heading: String,
    pub body: String,
}

/// Final generation artifact.
///
/// `assembled_text` is the canonical serialization: bolded title, blank
/// line, then each section (bolded heading prefixing its body) joined by
/// blank lines. Visitor-kind documents carry no sections and the flat
/// paragraph doubles as `assembled_text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub title: String,
    pub sections: Vec<DocumentSection>,
    pub assembled_text: String,
}

/// Transient record of one provider try, used for aggregation and telemetry
#[derive(Debug, Clone)]
pub struct ProviderAttempt {
    pub provider: ProviderId,
    pub outcome: std::result::Result<(), FailureReason>,
    pub elapsed_ms: u64,
}

/// Success payload of the external response contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub review: String,
}

impl From<&GeneratedDocument> for GenerationResponse {
    fn from(doc: &GeneratedDocument) -> Self {
        Self {
            review: doc.assembled_text.clone(),
        }
    }
}

/// Total-failure payload: a summary message plus one verbatim message per
/// attempted provider (`openai_error`, `gemini_error`, `groq_error`).
pub fn failure_payload(err: &ReviewError) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    map.insert(
        "error".to_string(),
        serde_json::Value::String(err.to_string()),
    );
    for (provider, message) in err.provider_errors() {
        map.insert(
            format!("{}_error", provider),
            serde_json::Value::String(message),
        );
    }
    serde_json::Value::Object(map)
}
