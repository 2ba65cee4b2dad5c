//! Bounded retry policy for credential refresh
//!
//! A guarded request gets at most `max_attempts` refresh attempts. Which
//! failures earn another attempt is explicit here rather than buried in the
//! interceptor loop.

use crate::error::Error;

/// Default number of refresh attempts per guarded request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total refresh attempts, the first one included.
    pub max_attempts: u32,
    /// Retry after a rejected grant. The store has been wiped by then, so the
    /// next attempt is a password grant rather than a repeat of the failure.
    pub retry_invalid_grant: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_invalid_grant: true,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            retry_invalid_grant: false,
        }
    }

    /// Whether `error`, raised by attempt number `attempt` (1-based), earns another attempt.
    pub fn should_retry(&self, attempt: u32, error: &Error) -> bool {
        if attempt >= self.max_attempts {
            return false;
        }
        match error {
            Error::Protocol(_) => true,
            Error::InvalidGrant(_) => self.retry_invalid_grant,
            Error::State(_) | Error::Storage(_) | Error::Transport(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allows_exactly_one_retry() {
        let policy = RetryPolicy::default();
        let err = Error::Protocol("503".into());
        assert!(policy.should_retry(1, &err));
        assert!(!policy.should_retry(2, &err));
    }

    #[test]
    fn invalid_grant_retry_is_configurable() {
        let err = Error::InvalidGrant("invalid_request".into());
        assert!(RetryPolicy::default().should_retry(1, &err));

        let strict = RetryPolicy {
            retry_invalid_grant: false,
            ..RetryPolicy::default()
        };
        assert!(!strict.should_retry(1, &err));
    }

    #[test]
    fn non_protocol_errors_are_not_retried() {
        let policy = RetryPolicy {
            max_attempts: 5,
            retry_invalid_grant: true,
        };
        assert!(!policy.should_retry(1, &Error::Transport("connection refused".into())));
        assert!(!policy.should_retry(1, &Error::no_credential()));
        assert!(!policy.should_retry(1, &Error::Storage("disk full".into())));
    }

    #[test]
    fn no_retry_policy() {
        assert!(!RetryPolicy::no_retry().should_retry(1, &Error::Protocol("x".into())));
    }
}
