use std::time::Duration;

use derive_setters::Setters;
use serde::{Deserialize, Serialize};

/// Exponential backoff parameters, delays expressed in milliseconds.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Setters)]
#[setters(strip_option, into)]
pub struct BackoffConfig {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    /// Fraction of the capped delay used as the jitter window, in `[0, 1]`.
    pub jitter_fraction: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1000,
            max_delay_ms: 10_000,
            multiplier: 2.0,
            jitter_fraction: 0.2,
        }
    }
}

/// Retry budget for a single candidate identifier.
///
/// `max_retries` counts retries after the first attempt, so the operation
/// runs at most `max_retries + 1` times.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Setters)]
#[setters(strip_option, into)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub backoff: BackoffConfig,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 2, backoff: BackoffConfig::default() }
    }
}

/// Result of driving an operation through the retry loop, with the number of
/// attempts made and the time spent sleeping between them.
#[derive(Debug)]
pub struct RetryOutcome<T> {
    pub result: std::result::Result<T, anyhow::Error>,
    pub attempts: usize,
    pub elapsed: Duration,
}

impl<T> RetryOutcome<T> {
    pub fn success(value: T, attempts: usize, elapsed: Duration) -> Self {
        Self { result: Ok(value), attempts, elapsed }
    }

    pub fn failure(error: anyhow::Error, attempts: usize, elapsed: Duration) -> Self {
        Self { result: Err(error), attempts, elapsed }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Collapses the outcome into a plain `Result`, dropping the diagnostics.
    pub fn into_result(self) -> anyhow::Result<T> {
        self.result
    }
}
