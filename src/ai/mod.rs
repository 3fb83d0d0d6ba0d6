//! AI Integration Layer
//!
//! Provider abstraction, per-call retry, and stage timeouts.

pub mod provider;
pub mod retry;
pub mod timeout;

pub use provider::{
    GeminiProvider, GroqProvider, OpenAiProvider, ProviderClient, ProviderConfig, SharedProvider,
    create_provider,
};
pub use retry::{RetryPolicy, retry};
pub use timeout::with_timeout;
