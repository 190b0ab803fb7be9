//! Retry policy for provider calls
//!
//! The policy decides how many attempts to make and how long to wait
//! between them. [`StatusClass`] decides what a provider status means.

use crate::config::RetryConfig;
use std::time::Duration;

/// How a provider HTTP status is handled by the retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 200: parse the payload
    Success,
    /// 401: credential rejected, never retried
    Unauthorized,
    /// 503 (model warming up) or 429 (rate limited)
    Transient,
    /// Anything else; retried, surfaced on the last attempt
    Failure,
}

impl StatusClass {
    /// Classify an HTTP status code
    ///
    /// # Examples
    ///
    /// ```
    /// use codeproxy::providers::retry::StatusClass;
    ///
    /// assert_eq!(StatusClass::of(200), StatusClass::Success);
    /// assert_eq!(StatusClass::of(503), StatusClass::Transient);
    /// assert_eq!(StatusClass::of(500), StatusClass::Failure);
    /// ```
    pub fn of(status: u16) -> Self {
        match status {
            200 => Self::Success,
            401 => Self::Unauthorized,
            429 | 503 => Self::Transient,
            _ => Self::Failure,
        }
    }
}

/// Bounded exponential backoff
///
/// Attempts are numbered from zero. The delay after attempt `n` is
/// `base_delay * 2^n`; no delay follows the final attempt.
///
/// # Examples
///
/// ```
/// use codeproxy::providers::retry::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_attempts(), 3);
/// assert_eq!(policy.delay_for(0), Duration::from_secs(1));
/// assert_eq!(policy.delay_for(1), Duration::from_secs(2));
/// assert!(policy.is_final(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    /// Create a policy with `max_attempts` total attempts
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Build a policy from configuration
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
        )
    }

    /// Total attempts, including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after the first failed attempt
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Backoff to wait after the zero-based `attempt` failed
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Whether the zero-based `attempt` is the last one allowed
    pub fn is_final(&self, attempt: u32) -> bool {
        attempt + 1 >= self.max_attempts
    }

    /// The full backoff schedule between attempts
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_attempts.saturating_sub(1))
            .map(|attempt| self.delay_for(attempt))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule_doubles_from_one_second() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.schedule(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[test]
    fn test_schedule_for_single_attempt_is_empty() {
        let policy = RetryPolicy::new(1, Duration::from_secs(1));
        assert!(policy.schedule().is_empty());
        assert!(policy.is_final(0));
    }

    #[test]
    fn test_is_final() {
        let policy = RetryPolicy::default();
        assert!(!policy.is_final(0));
        assert!(!policy.is_final(1));
        assert!(policy.is_final(2));
    }

    #[test]
    fn test_delay_saturates_instead_of_overflowing() {
        let policy = RetryPolicy::new(100, Duration::from_secs(1));
        assert_eq!(policy.delay_for(64), Duration::from_secs(u64::from(u32::MAX)));
        assert_eq!(
            RetryPolicy::new(100, Duration::MAX).delay_for(3),
            Duration::MAX
        );
    }

    #[test]
    fn test_from_config() {
        let config = RetryConfig {
            max_attempts: 5,
            base_delay_ms: 250,
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.base_delay(), Duration::from_millis(250));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1000));
    }
}
