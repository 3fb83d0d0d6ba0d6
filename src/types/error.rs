//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Every provider-facing failure is normalized to a [`FailureReason`]
//! before it leaves the provider layer, so callers never see raw
//! transport errors.
//!
//! ## Failure Taxonomy
//!
//! - **InputValidation**: rejected before any provider is tried, never retried
//! - **NetworkError / Timeout / RateLimited**: transport-level, retried per
//!   policy, then escalated to the next provider
//! - **MalformedResponse / EmptyResponse**: response-shape anomalies, treated
//!   like transport failures (operationally indistinguishable from an
//!   unavailable provider)
//! - **Composite**: raised only after every provider is exhausted, carries
//!   one reason per attempted provider

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Provider Identity
// =============================================================================

/// Identity of one LLM backend in the fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Primary provider (OpenAI Chat Completions)
    OpenAi,
    /// Secondary provider (Google Gemini)
    Gemini,
    /// Tertiary availability pool (Groq-hosted open models)
    Groq,
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Gemini => write!(f, "gemini"),
            Self::Groq => write!(f, "groq"),
        }
    }
}

// =============================================================================
// Failure Reason
// =============================================================================

/// Normalized failure for one model call or one pipeline run.
///
/// Every variant carries the underlying detail so composite errors can
/// report a distinct, attributable message per provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Connectivity failure (DNS, connect, broken transfer)
    NetworkError(String),
    /// Provider returned HTTP 429 or an explicit quota message
    RateLimited(String),
    /// Response arrived but its shape was unusable
    MalformedResponse(String),
    /// Response (or its sanitized form) contained no usable text
    EmptyResponse(String),
    /// Call exceeded the configured deadline
    Timeout(String),
    /// Anything that resists classification
    Unknown(String),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError(msg) => write!(f, "network error: {}", msg),
            Self::RateLimited(msg) => write!(f, "rate limited: {}", msg),
            Self::MalformedResponse(msg) => write!(f, "malformed response: {}", msg),
            Self::EmptyResponse(msg) => write!(f, "empty response: {}", msg),
            Self::Timeout(msg) => write!(f, "timeout: {}", msg),
            Self::Unknown(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for FailureReason {}

impl FailureReason {
    /// Short tag for logging and telemetry fields
    pub fn tag(&self) -> &'static str {
        match self {
            Self::NetworkError(_) => "NETWORK",
            Self::RateLimited(_) => "RATE_LIMITED",
            Self::MalformedResponse(_) => "MALFORMED",
            Self::EmptyResponse(_) => "EMPTY",
            Self::Timeout(_) => "TIMEOUT",
            Self::Unknown(_) => "UNKNOWN",
        }
    }

    /// Classify an HTTP error status into a failure reason
    pub fn from_http_status(status: u16, body: &str) -> Self {
        let msg = format!("HTTP {}: {}", status, truncate(body, 300));
        match status {
            429 => Self::RateLimited(msg),
            408 | 504 => Self::Timeout(msg),
            500 | 502 | 503 => Self::NetworkError(msg),
            _ => Self::Unknown(msg),
        }
    }

    /// Classify a reqwest transport error into a failure reason
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() || err.is_body() {
            Self::NetworkError(err.to_string())
        } else if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

// =============================================================================
// Provider Failure (for composite aggregation)
// =============================================================================

/// One provider's terminal failure inside a fallback run
#[derive(Debug, Clone)]
pub struct ProviderFailure {
    pub provider: ProviderId,
    pub reason: FailureReason,
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.provider, self.reason)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ReviewError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Generation Errors
    // -------------------------------------------------------------------------
    /// Rejected before any provider call was attempted
    #[error("invalid input: {0}")]
    InputValidation(String),

    /// Every configured provider failed; carries one reason per provider
    #[error("{}", format_composite(.0))]
    AllProvidersFailed(Vec<ProviderFailure>),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("review source error: {0}")]
    Source(String),
}

impl ReviewError {
    /// Per-provider error messages for the total-failure response payload
    pub fn provider_errors(&self) -> Vec<(ProviderId, String)> {
        match self {
            Self::AllProvidersFailed(failures) => failures
                .iter()
                .map(|f| (f.provider, f.reason.to_string()))
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn format_composite(failures: &[ProviderFailure]) -> String {
    let details: Vec<String> = failures.iter().map(|f| f.to_string()).collect();
    format!("all providers failed [{}]", details.join("; "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &s[..end])
    }
}

pub type Result<T> = std::result::Result<T, ReviewError>;

// =============================================================================
// Tests
// =============================================================================
