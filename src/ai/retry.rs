//! Bounded Retry with Exponential Backoff
//!
//! Generic retry wrapper used around every individual model call. A call
//! is attempted `max_retries + 1` times; the delay before each retry
//! starts at `initial_delay` and is multiplied by `multiplier` after every
//! failed attempt. The final error propagates unchanged so callers can
//! distinguish failure causes.
//!
//! Structurally invalid inputs (e.g. an empty corpus) must be rejected
//! before entering the executor; nothing here inspects the error value.
//! Independent calls may retry concurrently, which is what allows
//! per-section generation to fan out.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::constants::retry as retry_constants;

/// Retry tuning for one call site
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the initial attempt (total attempts = max_retries + 1)
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after every failed attempt
    pub multiplier: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: retry_constants::MAX_RETRIES,
            initial_delay: Duration::from_millis(retry_constants::INITIAL_DELAY_MS),
            multiplier: retry_constants::BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration, multiplier: f32) -> Self {
        Self {
            max_retries,
            initial_delay,
            multiplier,
        }
    }

    /// Policy that never retries, for tests and preflight calls
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::ZERO,
            multiplier: 1.0,
        }
    }
}

/// Run `operation`, retrying per `policy`. Returns the first success or
/// the last error unchanged.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = policy.initial_delay;
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt > policy.max_retries {
                    return Err(err);
                }
                debug!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retrying after backoff"
                );
                sleep(delay).await;
                delay = delay.mul_f32(policy.multiplier);
            }
        }
    }
}
