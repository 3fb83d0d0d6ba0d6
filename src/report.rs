//! Outcome Telemetry Sink
//!
//! The generation core emits structured success/failure events to an
//! injected [`OutcomeReporter`]. The reporter is an append-only external
//! sink: the core never reads back from it and never blocks on delivery,
//! but per-request ordering is preserved ("started" before
//! "completed/failed"). Constructed explicitly and passed into the
//! orchestrator, so tests can substitute an in-memory fake.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::types::{FailureReason, ProviderId, RequestId};

/// Pipeline stage identifiers for telemetry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Digest,
    Outline,
    Section,
    Title,
    Visitor,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Digest => write!(f, "digest"),
            Self::Outline => write!(f, "outline"),
            Self::Section => write!(f, "section"),
            Self::Title => write!(f, "title"),
            Self::Visitor => write!(f, "visitor"),
        }
    }
}

/// Outcome of one stage attempt against one provider
#[derive(Debug, Clone)]
pub enum StageOutcome {
    Success,
    Failure(FailureReason),
}

/// Structured telemetry sink for generation outcomes.
///
/// Methods are fire-and-forget; implementations must not block the
/// pipeline on delivery.
pub trait OutcomeReporter: Send + Sync {
    fn record_start(&self, request_id: &RequestId);

    fn record_stage_result(
        &self,
        request_id: &RequestId,
        stage: PipelineStage,
        provider: ProviderId,
        outcome: &StageOutcome,
        elapsed: Duration,
    );

    fn record_completion(
        &self,
        request_id: &RequestId,
        success: bool,
        total_elapsed: Duration,
        error: Option<&str>,
    );
}

/// Shared reporter handle
pub type SharedReporter = Arc<dyn OutcomeReporter>;

// =============================================================================
// Shipped Implementations
// =============================================================================

/// Reporter that forwards events to the `tracing` subscriber
#[derive(Debug, Default)]
pub struct TracingReporter;

impl OutcomeReporter for TracingReporter {
    fn record_start(&self, request_id: &RequestId) {
        info!(
            request_id = %request_id,
            timestamp = %Utc::now().to_rfc3339(),
            "Generation started"
        );
    }

    fn record_stage_result(
        &self,
        request_id: &RequestId,
        stage: PipelineStage,
        provider: ProviderId,
        outcome: &StageOutcome,
        elapsed: Duration,
    ) {
        match outcome {
            StageOutcome::Success => info!(
                request_id = %request_id,
                stage = %stage,
                provider = %provider,
                elapsed_ms = elapsed.as_millis() as u64,
                "Stage succeeded"
            ),
            StageOutcome::Failure(reason) => warn!(
                request_id = %request_id,
                stage = %stage,
                provider = %provider,
                elapsed_ms = elapsed.as_millis() as u64,
                reason = %reason,
                category = reason.tag(),
                "Stage failed"
            ),
        }
    }

    fn record_completion(
        &self,
        request_id: &RequestId,
        success: bool,
        total_elapsed: Duration,
        error: Option<&str>,
    ) {
        if success {
            info!(
                request_id = %request_id,
                total_elapsed_ms = total_elapsed.as_millis() as u64,
                timestamp = %Utc::now().to_rfc3339(),
                "Generation completed"
            );
        } else {
            warn!(
                request_id = %request_id,
                total_elapsed_ms = total_elapsed.as_millis() as u64,
                error = error.unwrap_or("unknown"),
                "Generation failed"
            );
        }
    }
}

/// Reporter that drops every event, for callers without telemetry
#[derive(Debug, Default)]
pub struct NoopReporter;

impl OutcomeReporter for NoopReporter {
    fn record_start(&self, _request_id: &RequestId) {}

    fn record_stage_result(
        &self,
        _request_id: &RequestId,
        _stage: PipelineStage,
        _provider: ProviderId,
        _outcome: &StageOutcome,
        _elapsed: Duration,
    ) {
    }

    fn record_completion(
        &self,
        _request_id: &RequestId,
        _success: bool,
        _total_elapsed: Duration,
        _error: Option<&str>,
    ) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(PipelineStage::Digest.to_string(), "digest");
        assert_eq!(PipelineStage::Visitor.to_string(), "visitor");
    }

    #[test]
    fn test_tracing_reporter_accepts_full_sequence() {
        let reporter = TracingReporter;
        let id = RequestId::new("req-1");

        reporter.record_start(&id);
        reporter.record_stage_result(
            &id,
            PipelineStage::Digest,
            ProviderId::OpenAi,
            &StageOutcome::Success,
            Duration::from_millis(120),
        );
        reporter.record_stage_result(
            &id,
            PipelineStage::Outline,
            ProviderId::OpenAi,
            &StageOutcome::Failure(FailureReason::RateLimited("429".into())),
            Duration::from_millis(80),
        );
        reporter.record_completion(&id, false, Duration::from_millis(200), Some("boom"));
    }
}
