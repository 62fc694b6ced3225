//! Timeout and retry helpers for external engine calls.

use crate::error::{ParloError, Result};
use std::thread;
use std::time::Duration;

/// Bounded retry policy with doubling backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, first try included.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each failure.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: crate::defaults::MAX_ATTEMPTS,
            initial_delay: crate::defaults::RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep after the given (1-based) failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.initial_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Runs a blocking engine call with a hard upper bound on its duration.
///
/// The call runs on a helper thread; if it does not complete within
/// `timeout`, `on_timeout` is returned and the helper thread is abandoned
/// (its eventual result is discarded). This makes the timeout independent of
/// the engine's own behavior — a hung engine cannot stall the calling stage.
pub fn call_with_timeout<T, F>(timeout: Duration, on_timeout: ParloError, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded(1);
    thread::Builder::new()
        .name("engine-call".to_string())
        .spawn(move || {
            // The receiver may be gone if we timed out; nothing to do then.
            let _ = tx.send(f());
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(_) => Err(on_timeout),
    }
}

/// Runs `attempt` until it succeeds, a non-transient error occurs, or the
/// policy's attempt budget is exhausted. Sleeps with doubling backoff
/// between transient failures.
pub fn run_with_retry<T>(policy: &RetryPolicy, mut attempt: impl FnMut() -> Result<T>) -> Result<T> {
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = None;

    for n in 1..=max_attempts {
        match attempt() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() => {
                log::warn!("engine attempt {}/{} failed: {}", n, max_attempts, e);
                last_error = Some(e);
                if n < max_attempts {
                    thread::sleep(policy.delay_after(n));
                }
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| ParloError::Other("retries exhausted".to_string())))
}
