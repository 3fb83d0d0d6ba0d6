//! LLM Provider Abstraction
//!
//! Defines the ProviderClient trait for plain-text completion requests.
//! Every variant normalizes its transport and response-shape failures to
//! [`FailureReason`] before returning, so callers never see raw HTTP
//! errors.
//!
//! ## Variants
//!
//! - `openai`: primary provider (OpenAI Chat Completions)
//! - `gemini`: secondary provider (Google Gemini generateContent)
//! - `groq`: tertiary availability pool over several small open models

mod gemini;
mod groq;
mod openai;

pub use gemini::GeminiProvider;
pub use groq::GroqProvider;
pub use openai::OpenAiProvider;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::constants::network as net_constants;
use crate::types::{FailureReason, ProviderId, Result, ReviewError};

/// One completion request against one model backend.
///
/// Implementations must validate the transport response has a
/// recognizable success shape (non-error status, parseable body,
/// non-empty first choice/candidate) before returning text.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Issue one completion request and return the raw model text.
    async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> std::result::Result<String, FailureReason>;

    /// Stable identity used in telemetry and composite errors
    fn id(&self) -> ProviderId;

    /// Model name currently in use (first pool member for the pool tier)
    fn model(&self) -> &str;
}

/// Shared provider handle for concurrent access across pipeline stages.
pub type SharedProvider = Arc<dyn ProviderClient>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for LLM providers
///
/// Note: API keys are handled securely - they are never serialized to
/// output and are redacted in debug output. Each provider converts the
/// key to SecretString internally for runtime protection.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type: "openai", "gemini", "groq"
    pub provider: String,
    /// Model name (provider-specific)
    pub model: Option<String>,
    /// Ordered fallback models for the pool tier (groq only)
    #[serde(default)]
    pub model_pool: Vec<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Temperature for LLM generation
    pub temperature: f32,
    /// API key; never serialized to output for security
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL (for custom endpoints)
    #[serde(default)]
    pub api_base: Option<String>,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("model_pool", &self.model_pool)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

fn default_max_tokens() -> usize {
    2048
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            model_pool: Vec::new(),
            timeout_secs: net_constants::DEFAULT_TIMEOUT_SECS,
            temperature: 0.7,
            api_key: None,
            api_base: None,
            max_tokens: 2048,
        }
    }
}

impl ProviderConfig {
    /// Build the HTTP client shared by all provider variants
    pub(crate) fn http_client(&self) -> std::result::Result<reqwest::Client, ReviewError> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(net_constants::CONNECTION_TIMEOUT_SECS))
            .build()
            .map_err(|e| ReviewError::Config(format!("failed to create HTTP client: {}", e)))
    }
}

/// Create a shared provider from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiProvider::new(config.clone())?)),
        "gemini" => Ok(Arc::new(GeminiProvider::new(config.clone())?)),
        "groq" => Ok(Arc::new(GroqProvider::new(config.clone())?)),
        _ => Err(ReviewError::Config(format!(
            "Unknown provider: {}. Supported: openai, gemini, groq",
            config.provider
        ))),
    }
}
