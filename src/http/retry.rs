//! Retry budget and backoff for a single request

use crate::error::Error;
use crate::types::BackoffType;
use std::time::Duration;

/// How many times, and how far apart, a failed request is re-sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Shape of the delay curve
    pub backoff: BackoffType,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any computed delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: BackoffType::Exponential,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(20),
        }
    }
}

impl RetryPolicy {
    /// Whether `error` may be followed by another attempt
    pub fn allows_retry(&self, error: &Error, retries_used: u32) -> bool {
        retries_used < self.max_retries && is_transient(error)
    }

    /// Delay before the next attempt
    ///
    /// Throttled responses wait for the server's `Retry-After`; everything
    /// else follows the backoff curve, capped at `max_delay`.
    pub fn delay_before_retry(&self, error: &Error, retries_used: u32) -> Duration {
        if let Error::RateLimited {
            retry_after_seconds,
        } = error
        {
            return Duration::from_secs(*retry_after_seconds);
        }

        let delay = match self.backoff {
            BackoffType::Constant => self.initial_delay,
            BackoffType::Linear => self.initial_delay.saturating_mul(retries_used + 1),
            BackoffType::Exponential => self
                .initial_delay
                .saturating_mul(2u32.saturating_pow(retries_used)),
        };
        delay.min(self.max_delay)
    }
}

// Only refused/timed-out connections are worth re-sending among raw
// transport errors; builder and body errors would fail the same way again.
fn is_transient(error: &Error) -> bool {
    match error {
        Error::Http(e) => e.is_connect() || e.is_timeout(),
        other => other.is_retryable(),
    }
}
