//! Request pacing
//!
//! A listing sends its pages one after another, so one unkeyed governor
//! bucket per client is enough to space out page requests and their retries.

use governor::{DefaultDirectRateLimiter, Quota};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Pacing settings, as written in the client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    /// Sustained requests per second
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,
    /// Requests allowed back to back before pacing kicks in
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

fn default_rps() -> u32 {
    10
}

fn default_burst() -> u32 {
    5
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_rps(),
            burst_size: default_burst(),
        }
    }
}

/// Shared token bucket
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<DefaultDirectRateLimiter>,
}

impl RateLimiter {
    /// Build a bucket from the settings; zero values count as one
    pub fn new(config: &RateLimiterConfig) -> Self {
        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN);

        Self {
            bucket: Arc::new(governor::RateLimiter::direct(
                Quota::per_second(per_second).allow_burst(burst),
            )),
        }
    }

    /// Wait for a send slot
    pub async fn wait(&self) {
        self.bucket.until_ready().await;
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RateLimiter")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: RateLimiterConfig = serde_yaml::from_str("requests_per_second: 2").unwrap();
        assert_eq!(
            config,
            RateLimiterConfig {
                requests_per_second: 2,
                burst_size: 5,
            }
        );
    }

    #[test]
    fn test_burst_then_throttled() {
        let limiter = RateLimiter::new(&RateLimiterConfig {
            requests_per_second: 1,
            burst_size: 3,
        });

        for _ in 0..3 {
            assert!(limiter.bucket.check().is_ok());
        }
        assert!(limiter.bucket.check().is_err());
    }

    #[tokio::test]
    async fn test_zero_settings_still_send() {
        let limiter = RateLimiter::new(&RateLimiterConfig {
            requests_per_second: 0,
            burst_size: 0,
        });
        limiter.wait().await;
    }
}
