use std::future::Future;
use std::time::{Duration, Instant};

use anvil_domain::{Error, RetryOutcome, RetryPolicy};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::retry::backoff::BackoffCalculator;

type RetryHook = Box<dyn FnMut(usize, Duration, &anyhow::Error) -> anyhow::Result<()> + Send>;
type FailureHook = Box<dyn FnMut(&anyhow::Error, usize) -> anyhow::Result<()> + Send>;

/// Observability callbacks fired by [`RetryExecutor`].
///
/// Hook errors are logged and dropped; a failing hook must never change the
/// outcome of the retry loop.
#[derive(Default)]
pub struct RetryHooks {
    on_retry: Option<RetryHook>,
    on_failure: Option<FailureHook>,
}

impl RetryHooks {
    /// Called after a failed attempt, before the backoff sleep, with the
    /// 1-indexed attempt number and the computed delay.
    pub fn on_retry(
        mut self,
        hook: impl FnMut(usize, Duration, &anyhow::Error) -> anyhow::Result<()> + Send + 'static,
    ) -> Self {
        self.on_retry = Some(Box::new(hook));
        self
    }

    /// Called once when the loop gives up, with the final error and the
    /// total number of attempts made.
    pub fn on_failure(
        mut self,
        hook: impl FnMut(&anyhow::Error, usize) -> anyhow::Result<()> + Send + 'static,
    ) -> Self {
        self.on_failure = Some(Box::new(hook));
        self
    }

    fn fire_retry(&mut self, attempt: usize, delay: Duration, error: &anyhow::Error) {
        if let Some(hook) = self.on_retry.as_mut()
            && let Err(hook_error) = hook(attempt, delay, error)
        {
            warn!(error = %hook_error, "on_retry hook failed, continuing the retry loop");
        }
    }

    fn fire_failure(&mut self, error: &anyhow::Error, attempts: usize) {
        if let Some(hook) = self.on_failure.as_mut()
            && let Err(hook_error) = hook(error, attempts)
        {
            warn!(error = %hook_error, "on_failure hook failed, returning the original error");
        }
    }
}

/// Drives one fallible async operation through the retry policy.
///
/// The predicate decides whether a failure is worth another attempt; the
/// executor owns only the attempt budget and the backoff sleeps. Cancellation
/// is observed before each attempt and during the sleep, so an abort never
/// starts a fresh network call.
pub struct RetryExecutor {
    policy: RetryPolicy,
    backoff: BackoffCalculator,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        let backoff = BackoffCalculator::new(policy.backoff.clone());
        Self { policy, backoff }
    }

    pub async fn execute<T, F, Fut, P>(
        &self,
        mut operation: F,
        mut should_retry: P,
        mut hooks: RetryHooks,
        token: CancellationToken,
    ) -> RetryOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
        P: FnMut(&anyhow::Error) -> bool,
    {
        let started = Instant::now();
        let mut attempt = 0usize;

        loop {
            if token.is_cancelled() {
                return RetryOutcome::failure(
                    Error::Cancelled.into(),
                    attempt.max(1),
                    started.elapsed(),
                );
            }

            match operation().await {
                Ok(value) => return RetryOutcome::success(value, attempt + 1, started.elapsed()),
                Err(error) => {
                    let attempts = attempt + 1;
                    let budget_spent = attempts > self.policy.max_retries;
                    if budget_spent || !should_retry(&error) {
                        hooks.fire_failure(&error, attempts);
                        return RetryOutcome::failure(error, attempts, started.elapsed());
                    }

                    let delay = self.backoff.delay(attempt);
                    hooks.fire_retry(attempts, delay, &error);
                    warn!(
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Attempt failed, backing off before retry"
                    );

                    tokio::select! {
                        _ = token.cancelled() => {
                            return RetryOutcome::failure(
                                Error::Cancelled.into(),
                                attempts,
                                started.elapsed(),
                            );
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }

                    attempt = attempts;
                }
            }
        }
    }
}
