//! # Checkout Configuration

use std::time::Duration;

/// Default time budget for staging one checkout attempt.
pub const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default wait for the store to acknowledge a commit.
pub const DEFAULT_COMMIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of bill numbers tried before a collision is reported.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Tuning for [`crate::CheckoutCommitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Bound on staging each attempt (begin and every insert). Running
    /// out rolls the attempt back.
    pub timeout: Duration,

    /// Bound on waiting for `commit()`. Running out leaves the outcome
    /// unknown, since the store may already have applied it.
    pub commit_timeout: Duration,

    /// Attempts on bill-number collision (minimum 1).
    pub max_attempts: u32,
}

impl CheckoutConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_commit_timeout(mut self, timeout: Duration) -> Self {
        self.commit_timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        CheckoutConfig {
            timeout: DEFAULT_CHECKOUT_TIMEOUT,
            commit_timeout: DEFAULT_COMMIT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_builder() {
        let config = CheckoutConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.commit_timeout, Duration::from_secs(10));
        assert_eq!(config.max_attempts, 3);

        let config = config
            .with_timeout(Duration::from_millis(250))
            .with_commit_timeout(Duration::from_secs(2))
            .with_max_attempts(0);
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.commit_timeout, Duration::from_secs(2));
        assert_eq!(config.max_attempts, 1);
    }
}
