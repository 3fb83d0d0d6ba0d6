//! Stage Timeout Wrapper
//!
//! Wraps a model call with a deadline. An elapsed deadline is normalized
//! to [`FailureReason::Timeout`] so the retry and fallback machinery
//! treats it exactly like a transport failure.

use std::future::Future;
use std::time::Duration;

use crate::types::FailureReason;

/// Execute an async operation with a deadline.
///
/// `operation_name` appears in the timeout message for diagnostics.
pub async fn with_timeout<T, F>(
    timeout: Duration,
    future: F,
    operation_name: &str,
) -> Result<T, FailureReason>
where
    F: Future<Output = Result<T, FailureReason>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(FailureReason::Timeout(format!(
            "{} exceeded {:?}",
            operation_name, timeout
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, FailureReason>(42) },
            "fast call",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_deadline_elapse_becomes_timeout_reason() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, FailureReason>(42)
            },
            "slow call",
        )
        .await;

        match result {
            Err(FailureReason::Timeout(msg)) => assert!(msg.contains("slow call")),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let result: Result<(), _> = with_timeout(
            Duration::from_secs(1),
            async { Err(FailureReason::EmptyResponse("nothing".into())) },
            "call",
        )
        .await;
        assert!(matches!(result, Err(FailureReason::EmptyResponse(_))));
    }
}
