use std::time::Duration;

use anvil_domain::BackoffConfig;

/// Exponential backoff with centered jitter.
///
/// `delay(n) = floor(min(initial · multiplier^n, max) + jitter)` where the
/// jitter is a uniform draw over `±(capped · jitter_fraction / 2)`. The
/// jitter window scales with the capped delay, so early cheap retries stay
/// cheap while long waits still spread out.
#[derive(Clone, Debug)]
pub struct BackoffCalculator {
    config: BackoffConfig,
}

impl BackoffCalculator {
    pub fn new(config: BackoffConfig) -> Self {
        Self { config }
    }

    /// Delay before the retry that follows the given 0-indexed attempt.
    pub fn delay(&self, attempt: usize) -> Duration {
        let base = self.config.initial_delay_ms as f64 * self.config.multiplier.powi(attempt as i32);
        let capped = base.min(self.config.max_delay_ms as f64);
        let jitter = capped * self.config.jitter_fraction * (rand::random::<f64>() - 0.5);
        Duration::from_millis((capped + jitter).floor() as u64)
    }

    /// Sum of `retries` independent delay draws, for a worst-case estimate.
    pub fn total_delay(&self, retries: usize) -> Duration {
        (0..retries).map(|attempt| self.delay(attempt)).sum()
    }
}
