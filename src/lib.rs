//! reviewgen - AI Review Generator with Ordered Provider Fallback
//!
//! Collects real visitor reviews for a place and synthesizes two derivative
//! artifacts through a chain of LLM providers: a short visitor-style
//! paragraph and a longer blog-style document built by a digest → outline →
//! sections → title pipeline. Providers are tried in a fixed priority order
//! with per-call bounded retry; the first success wins.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use reviewgen::{ConfigLoader, FallbackOrchestrator, TracingReporter};
//! use reviewgen::types::{GenerationRequest, ReviewKind};
//!
//! let config = ConfigLoader::load()?;
//! let orchestrator = FallbackOrchestrator::new(
//!     config.build_provider_chain()?,
//!     Arc::new(TracingReporter),
//!     config.orchestrator_config(),
//! );
//! let request = GenerationRequest::new(reviews, ReviewKind::Blog);
//! let document = orchestrator.generate(&request).await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: LLM provider abstraction, retry, timeouts
//! - [`pipeline`]: generation chain and fallback orchestration
//! - [`text`]: idempotent model-output sanitization
//! - [`report`]: outcome telemetry sink
//! - [`config`]: hierarchical configuration
//! - [`source`]: review corpus boundary

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod text;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, GenerationConfig, ProvidersConfig};

// Error Types
pub use types::error::{FailureReason, ProviderId, Result, ReviewError};

// Telemetry
pub use report::{NoopReporter, OutcomeReporter, SharedReporter, TracingReporter};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use pipeline::{
    FallbackOrchestrator, OrchestratorConfig, PipelineConfig, ReviewPipeline, parse_outline,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    GeminiProvider,
    GroqProvider,
    OpenAiProvider,
    ProviderClient,
    ProviderConfig,
    // Retry
    RetryPolicy,
    SharedProvider,
    create_provider,
    retry,
    // Timeout
    with_timeout,
};

// =============================================================================
// Text Re-exports
// =============================================================================

pub use text::{sanitize, sanitize_body};
