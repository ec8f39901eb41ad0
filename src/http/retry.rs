//! Bounded retry policy with fixed delays.
//!
//! Requests are retried a fixed number of times with a constant pause
//! between attempts. HTTP 429 responses use a longer, separate pause.
//! Every loop may also carry a deadline so that nested retry loops (the
//! per-request loop inside the per-item loop) share one wall-clock cap.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Error, Result};

/// Attempts made for a single request.
pub const DEFAULT_REQUEST_ATTEMPTS: u32 = 3;

/// Attempts made for a whole item download.
pub const DEFAULT_DOWNLOAD_ATTEMPTS: u32 = 3;

const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(3);
const DEFAULT_DOWNLOAD_DELAY: Duration = Duration::from_secs(5);
const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(10);

/// Why the previous attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Network or protocol failure.
    Transient,
    /// The server answered HTTP 429.
    RateLimited,
}

/// Decision on whether to make another attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait `delay`, then make attempt number `attempt`.
    Retry { delay: Duration, attempt: u32 },

    /// Give up.
    DoNotRetry { reason: String },
}

/// Retry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
    rate_limit_delay: Duration,
    max_elapsed: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::request()
    }
}

impl RetryPolicy {
    /// Creates a policy with `max_attempts` (at least one) and a fixed delay.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            rate_limit_delay: DEFAULT_RATE_LIMIT_DELAY,
            max_elapsed: None,
        }
    }

    /// Policy used around every raw request: 3 attempts, 3 seconds apart.
    #[must_use]
    pub fn request() -> Self {
        Self::new(DEFAULT_REQUEST_ATTEMPTS, DEFAULT_REQUEST_DELAY)
    }

    /// Policy used around a whole fetch-and-save: 3 attempts, 5 seconds apart.
    #[must_use]
    pub fn download() -> Self {
        Self::new(DEFAULT_DOWNLOAD_ATTEMPTS, DEFAULT_DOWNLOAD_DELAY)
    }

    #[must_use]
    pub fn with_rate_limit_delay(mut self, delay: Duration) -> Self {
        self.rate_limit_delay = delay;
        self
    }

    /// Caps the total time spent in one retry loop.
    #[must_use]
    pub fn with_max_elapsed(mut self, max_elapsed: Option<Duration>) -> Self {
        self.max_elapsed = max_elapsed;
        self
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub fn rate_limit_delay(&self) -> Duration {
        self.rate_limit_delay
    }

    #[must_use]
    pub fn max_elapsed(&self) -> Option<Duration> {
        self.max_elapsed
    }

    /// Deadline for a loop started at `start`, tightened by an outer deadline.
    #[must_use]
    pub fn deadline(&self, start: Instant, outer: Option<Instant>) -> Option<Instant> {
        let own = self.max_elapsed.map(|max| start + max);
        match (own, outer) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Decides whether attempt number `attempt` (1-indexed) should be followed
    /// by another one.
    pub fn should_retry(
        &self,
        backoff: Backoff,
        attempt: u32,
        deadline: Option<Instant>,
    ) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = match backoff {
            Backoff::Transient => self.delay,
            Backoff::RateLimited => self.rate_limit_delay,
        };

        if let Some(deadline) = deadline {
            if Instant::now() + delay > deadline {
                debug!(attempt, delay_ms = delay.as_millis(), "retry window closed");
                return RetryDecision::DoNotRetry {
                    reason: "retry time budget exhausted".to_string(),
                };
            }
        }

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }
}

/// Sleeps for `delay` unless `cancel` fires first.
pub async fn pause(delay: Duration, cancel: &CancellationToken) -> Result<()> {
    tokio::select! {
        _ = tokio::time::sleep(delay) => Ok(()),
        _ = cancel.cancelled() => Err(Error::Cancelled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_request_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay(), Duration::from_secs(3));
        assert_eq!(policy.rate_limit_delay(), Duration::from_secs(10));
        assert_eq!(policy.max_elapsed(), None);
    }

    #[test]
    fn test_download_policy() {
        let policy = RetryPolicy::download();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay(), Duration::from_secs(5));
    }

    #[test]
    fn test_max_attempts_minimum_is_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }

    #[test]
    fn test_retries_until_budget_exhausted() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));

        assert_eq!(
            policy.should_retry(Backoff::Transient, 1, None),
            RetryDecision::Retry {
                delay: Duration::from_millis(10),
                attempt: 2
            }
        );
        assert_eq!(
            policy.should_retry(Backoff::Transient, 2, None),
            RetryDecision::Retry {
                delay: Duration::from_millis(10),
                attempt: 3
            }
        );
        assert!(matches!(
            policy.should_retry(Backoff::Transient, 3, None),
            RetryDecision::DoNotRetry { .. }
        ));
    }

    #[test]
    fn test_rate_limit_uses_longer_delay() {
        let policy = RetryPolicy::new(3, Duration::from_secs(3))
            .with_rate_limit_delay(Duration::from_secs(10));

        match policy.should_retry(Backoff::RateLimited, 1, None) {
            RetryDecision::Retry { delay, .. } => assert_eq!(delay, Duration::from_secs(10)),
            other => panic!("expected retry, got {:?}", other),
        }
    }

    #[test]
    fn test_deadline_blocks_retry() {
        let policy = RetryPolicy::new(3, Duration::from_secs(5));
        let deadline = Instant::now() + Duration::from_secs(1);

        assert!(matches!(
            policy.should_retry(Backoff::Transient, 1, Some(deadline)),
            RetryDecision::DoNotRetry { .. }
        ));
    }

    #[test]
    fn test_deadline_takes_the_tighter_bound() {
        let start = Instant::now();
        let policy = RetryPolicy::request().with_max_elapsed(Some(Duration::from_secs(60)));

        let outer = start + Duration::from_secs(10);
        assert_eq!(policy.deadline(start, Some(outer)), Some(outer));

        let loose = start + Duration::from_secs(600);
        assert_eq!(
            policy.deadline(start, Some(loose)),
            Some(start + Duration::from_secs(60))
        );

        assert_eq!(RetryPolicy::request().deadline(start, None), None);
    }

    #[test]
    fn test_pause_observes_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = tokio_test::block_on(pause(Duration::from_secs(60), &cancel));
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
