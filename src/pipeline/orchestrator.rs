//! Fallback Orchestrator
//!
//! Top of the generation core: walks an immutable, ordered provider list,
//! running the full [`ReviewPipeline`](super::ReviewPipeline) against one
//! provider at a time. The first success short-circuits the chain; a
//! provider failure is recorded and the next provider is tried. Providers
//! run strictly sequentially, never in parallel, to avoid duplicate
//! billable calls and duplicate telemetry events. The orchestrator never
//! re-runs a failed provider; per-call retry lives inside the pipeline.
//!
//! After exhaustion the caller receives a composite error enumerating
//! every provider's reason, so diagnostics carry all three messages.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::{PipelineConfig, ReviewPipeline};
use crate::ai::provider::SharedProvider;
use crate::constants::admission as admission_constants;
use crate::report::SharedReporter;
use crate::types::{
    GeneratedDocument, GenerationRequest, ProviderAttempt, ProviderFailure, RequestId, Result,
    ReviewError,
};

/// Orchestrator tuning
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Bounds of the randomized admission delay before the first provider
    /// attempt. A zero maximum disables the delay.
    pub admission_delay_ms: (u64, u64),
    /// Pipeline tuning shared by every provider attempt
    pub pipeline: PipelineConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            admission_delay_ms: (
                admission_constants::MIN_DELAY_MS,
                admission_constants::MAX_DELAY_MS,
            ),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Config without admission shaping, for tests and interactive use
    pub fn immediate() -> Self {
        Self {
            admission_delay_ms: (0, 0),
            ..Default::default()
        }
    }
}

/// Ordered-fallback generation entry point
pub struct FallbackOrchestrator {
    /// Fixed priority order; earlier providers are tried first
    providers: Vec<SharedProvider>,
    reporter: SharedReporter,
    config: OrchestratorConfig,
}

impl FallbackOrchestrator {
    pub fn new(
        providers: Vec<SharedProvider>,
        reporter: SharedReporter,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            providers,
            reporter,
            config,
        }
    }

    /// Generate a document, trying providers in priority order.
    ///
    /// Fails with `InputValidation` before any provider call when the
    /// corpus is structurally invalid, and with `AllProvidersFailed` only
    /// when every configured provider's pipeline failed.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedDocument> {
        request.validate()?;

        if self.providers.is_empty() {
            return Err(ReviewError::Config(
                "no providers configured in fallback chain".to_string(),
            ));
        }

        let request_id = RequestId::generate();
        let start = Instant::now();

        self.reporter.record_start(&request_id);
        self.admission_delay().await;

        let mut attempts: Vec<ProviderAttempt> = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            let provider_id = provider.id();
            let attempt_start = Instant::now();

            info!(provider = %provider_id, kind = ?request.kind, "Attempting provider");

            let pipeline = ReviewPipeline::new(
                Arc::clone(provider),
                Arc::clone(&self.reporter),
                self.config.pipeline.clone(),
            );

            match pipeline.run(request, &request_id).await {
                Ok(document) => {
                    let elapsed = start.elapsed();
                    info!(
                        provider = %provider_id,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Generation succeeded"
                    );
                    self.reporter
                        .record_completion(&request_id, true, elapsed, None);
                    return Ok(document);
                }
                Err(reason) => {
                    let elapsed_ms = attempt_start.elapsed().as_millis() as u64;
                    warn!(
                        provider = %provider_id,
                        reason = %reason,
                        category = reason.tag(),
                        elapsed_ms,
                        "Provider exhausted, advancing to next"
                    );
                    attempts.push(ProviderAttempt {
                        provider: provider_id,
                        outcome: Err(reason),
                        elapsed_ms,
                    });
                }
            }
        }

        let error = ReviewError::AllProvidersFailed(failures_from_attempts(attempts));
        self.reporter.record_completion(
            &request_id,
            false,
            start.elapsed(),
            Some(&error.to_string()),
        );
        Err(error)
    }

    /// Randomized delay before the first provider attempt, an
    /// admission-shaping measure against synchronized request bursts.
    /// A zero maximum disables the delay.
    async fn admission_delay(&self) {
        let (min, max) = self.config.admission_delay_ms;
        if max == 0 || max < min {
            return;
        }
        let delay_ms = rand::rng().random_range(min..=max);
        debug!(delay_ms, "Admission delay before first provider attempt");
        sleep(Duration::from_millis(delay_ms)).await;
    }
}

/// Collapse the attempt log into the failures carried by the composite
/// error, preserving chain order and skipping any successful attempt.
fn failures_from_attempts(attempts: Vec<ProviderAttempt>) -> Vec<ProviderFailure> {
    attempts
        .into_iter()
        .filter_map(|attempt| match attempt.outcome {
            Ok(()) => None,
            Err(reason) => Some(ProviderFailure {
                provider: attempt.provider,
                reason,
            }),
        })
        .collect()
}
