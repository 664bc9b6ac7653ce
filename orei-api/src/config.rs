//! Client configuration
//!
//! Defaults match the matrix's observed behaviour: a 5 second request
//! timeout, a 5 second freshness window for status replies, and up to five
//! attempts one second apart for status queries.

use std::time::Duration;

use crate::error::ApiError;

/// Retry policy for status queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first
    pub max_attempts: u32,
    /// Pause between consecutive attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no pause
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// `max_attempts` attempts separated by a fixed `delay`
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Pause to take after the given (1-based) failed attempt
    ///
    /// There is no pause after the final attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        if attempt == 0 || attempt >= self.max_attempts {
            Duration::ZERO
        } else {
            self.delay
        }
    }
}

/// Configuration for [`crate::MatrixClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Timeout for each HTTP request
    /// Default: 5 seconds
    pub request_timeout: Duration,

    /// How long a status reply is served from the cache
    /// Default: 5 seconds
    pub cache_ttl: Duration,

    /// Retry policy for status queries; mutating commands never retry
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            cache_ttl: crate::cache::DEFAULT_TTL,
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.request_timeout == Duration::ZERO {
            return Err(ApiError::Configuration(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(ApiError::Configuration(
                "Retry policy needs at least one attempt".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
