//! Retry and backoff policy for transient failures.
//!
//! A [`RetryPolicy`] decides how many times the request executor attempts a
//! request that fails with a transient error (429, 5xx, connection failure)
//! and how long it waits between attempts.

use std::time::Duration;

use rand::Rng;

use crate::error::ConfigError;

/// Default number of attempts, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default multiplicative backoff factor.
pub const DEFAULT_FACTOR: f64 = 2.0;

/// Default jitter, as a fraction of the computed delay.
pub const DEFAULT_JITTER: f64 = 0.25;

/// Default upper bound for a single delay, before jitter.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Exponential backoff with jitter and a capped attempt budget.
///
/// The delay after failed attempt `n` (1-based) is
/// `min(base_delay * factor^(n-1), max_delay)`, stretched by a random
/// fraction in `[0, jitter)`. As long as `jitter < factor - 1` and the cap is
/// not reached, consecutive delays are strictly increasing.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use sapim::RetryPolicy;
///
/// let policy = RetryPolicy::new(3, Duration::from_millis(100))
///     .with_factor(3.0)
///     .with_jitter(0.0);
///
/// assert_eq!(policy.backoff(1), Duration::from_millis(100));
/// assert_eq!(policy.backoff(2), Duration::from_millis(300));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    factor: f64,
    jitter: f64,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            factor: DEFAULT_FACTOR,
            jitter: DEFAULT_JITTER,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given budget and base delay, and default
    /// factor, jitter and cap.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            ..Self::default()
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Sets the multiplicative backoff factor.
    #[must_use]
    pub const fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    /// Sets the jitter fraction.
    #[must_use]
    pub const fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Sets the cap applied to a single delay.
    #[must_use]
    pub const fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Returns the total number of attempts, including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay before the first retry.
    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Returns the backoff factor.
    #[must_use]
    pub const fn factor(&self) -> f64 {
        self.factor
    }

    /// Returns the jitter fraction.
    #[must_use]
    pub const fn jitter(&self) -> f64 {
        self.jitter
    }

    /// Returns the cap applied to a single delay, before jitter.
    #[must_use]
    pub const fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Checks that the policy can be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRetryPolicy`] when the attempt budget is
    /// zero, the factor is below 1, or the jitter is outside `[0, 1)`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidRetryPolicy {
                reason: "max_attempts must be at least 1".to_string(),
            });
        }
        if !self.factor.is_finite() || self.factor < 1.0 {
            return Err(ConfigError::InvalidRetryPolicy {
                reason: format!("backoff factor must be >= 1.0, got {}", self.factor),
            });
        }
        if !(0.0..1.0).contains(&self.jitter) {
            return Err(ConfigError::InvalidRetryPolicy {
                reason: format!("jitter must be in [0, 1), got {}", self.jitter),
            });
        }
        Ok(())
    }

    /// Returns the un-jittered delay after failed attempt `attempt` (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.base_delay.as_secs_f64() * self.factor.powi(exponent);
        let capped = secs.min(self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(capped).unwrap_or(self.max_delay)
    }

    /// Returns the delay to sleep after failed attempt `attempt`, with jitter.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let backoff = self.backoff(attempt);
        if self.jitter <= 0.0 || backoff.is_zero() {
            return backoff;
        }
        let stretch = rand::thread_rng().gen_range(0.0..self.jitter);
        backoff.mul_f64(1.0 + stretch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_matches_documented_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.base_delay(), Duration::from_secs(1));
        assert!((policy.factor() - 2.0).abs() < f64::EPSILON);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_backoff_grows_geometrically() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1)).with_jitter(0.0);
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
        assert_eq!(policy.backoff(4), Duration::from_secs(8));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy::new(20, Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(10));
        assert_eq!(policy.backoff(10), Duration::from_secs(10));
    }

    #[test]
    fn test_jittered_delays_are_strictly_increasing() {
        let policy = RetryPolicy::default();
        for _ in 0..50 {
            let delays: Vec<Duration> = (1..policy.max_attempts())
                .map(|attempt| policy.delay_for(attempt))
                .collect();
            assert!(delays.windows(2).all(|pair| pair[0] < pair[1]), "{delays:?}");
        }
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100)).with_jitter(0.5);
        for _ in 0..50 {
            let delay = policy.delay_for(1);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay < Duration::from_millis(150));
        }
    }

    #[test]
    fn test_validate_rejects_bad_policies() {
        assert!(RetryPolicy::new(0, Duration::from_secs(1)).validate().is_err());
        assert!(RetryPolicy::default().with_factor(0.5).validate().is_err());
        assert!(RetryPolicy::default().with_jitter(1.0).validate().is_err());
        assert!(RetryPolicy::default().with_jitter(-0.1).validate().is_err());
    }

    #[test]
    fn test_no_retry_policy() {
        let policy = RetryPolicy::no_retry();
        assert_eq!(policy.max_attempts(), 1);
        assert!(policy.validate().is_ok());
    }
}
