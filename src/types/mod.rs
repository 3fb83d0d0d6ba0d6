pub mod domain;
pub mod error;

pub use domain::{
    DocumentSection, GeneratedDocument, GenerationRequest, GenerationResponse, ProviderAttempt,
    ReviewKind, ToneMode, UserContext, failure_payload,
};
pub use error::{FailureReason, ProviderFailure, ProviderId, Result, ReviewError};

// =============================================================================
// Domain Newtypes
// =============================================================================

use std::fmt;

/// Type-safe wrapper for generation request IDs
///
/// Prevents accidental mixing of request IDs with other string types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random request ID
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
