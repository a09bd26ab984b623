// Retry policy for rate-limited requests.
// Computes how long to back off from the platform's rate limit headers.

use std::time::Duration;

/// Bounded retry schedule for HTTP 403/429 responses.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt before giving up.
    pub max_retries: u32,
    /// Wait used when the response carries no usable headers.
    pub default_wait: Duration,
    /// Lower bound when waiting for `x-ratelimit-reset`.
    pub min_reset_wait: Duration,
    /// Upper bound on any single wait, whatever the headers say.
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            default_wait: Duration::from_secs(60),
            min_reset_wait: Duration::from_secs(5),
            max_wait: Duration::from_secs(60 * 60),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Whether another attempt is allowed after `retries_done` retries.
    pub fn should_retry(&self, retries_done: u32) -> bool {
        retries_done < self.max_retries
    }

    /// Wait before the next attempt.
    ///
    /// `retry-after` (seconds) wins; otherwise wait until one second past
    /// `x-ratelimit-reset` (epoch seconds), but at least `min_reset_wait`.
    /// Never longer than `max_wait`.
    pub fn wait_for(
        &self,
        retry_after: Option<u64>,
        ratelimit_reset: Option<u64>,
        now_millis: i64,
    ) -> Duration {
        let wait = if let Some(secs) = retry_after {
            Duration::from_secs(secs)
        } else if let Some(reset) = ratelimit_reset {
            let until_reset = i64::try_from(reset)
                .unwrap_or(i64::MAX)
                .saturating_mul(1000)
                .saturating_sub(now_millis)
                .saturating_add(1000);
            let floor = i64::try_from(self.min_reset_wait.as_millis()).unwrap_or(i64::MAX);
            Duration::from_millis(until_reset.max(floor).unsigned_abs())
        } else {
            self.default_wait
        };

        wait.min(self.max_wait)
    }
}
