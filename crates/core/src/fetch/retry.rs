//! Retry policy for remote fetches.

use std::time::Duration;

use crate::config::{Backoff, RetryConfig};

/// Upper bound for a single backoff delay.
const MAX_DELAY: Duration = Duration::from_secs(300);

/// How many times a fetch is attempted and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Base delay between attempts.
    pub delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: Duration::from_millis(config.delay_ms),
            backoff: config.backoff,
        }
    }
}

impl RetryPolicy {
    /// Fixed delay between attempts.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            backoff: Backoff::Fixed,
        }
    }

    /// Retry immediately (for tests).
    pub fn no_delay(max_attempts: u32) -> Self {
        Self::fixed(max_attempts, Duration::ZERO)
    }

    /// Delay to wait after the `failed_attempts`-th failure (1-based).
    pub fn delay_for(&self, failed_attempts: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential => {
                let exponent = failed_attempts.saturating_sub(1).min(16);
                self.delay
                    .checked_mul(1u32 << exponent)
                    .unwrap_or(MAX_DELAY)
                    .min(MAX_DELAY)
            }
        }
    }
}
