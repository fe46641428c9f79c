//! Bounded retry with exponential backoff for outbound HTTP calls

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Delay before the first retry
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Maximum backoff duration
const BACKOFF_MAX: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (0-based), doubling each time
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base_delay.saturating_mul(factor).min(BACKOFF_MAX)
    }

    /// Run `op` until it succeeds, fails permanently, or retries run out
    ///
    /// `is_transient` decides whether a failure is worth another attempt.
    pub async fn run<T, E, F, Fut, P>(&self, what: &str, mut op: F, is_transient: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: Display,
    {
        let mut retry = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if retry >= self.max_retries || !is_transient(&e) {
                        return Err(e);
                    }

                    let delay = self.delay_for(retry);
                    retry += 1;
                    warn!(
                        "{} failed ({}); retry {}/{} in {:?}",
                        what, e, retry, self.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
