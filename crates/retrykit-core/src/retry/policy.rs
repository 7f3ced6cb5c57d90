//! Retry policy: which error kinds to retry, how often, and how long to wait.

use super::attempt::ErrorKind;
use crate::error::PolicyError;
use std::collections::HashSet;
use std::time::Duration;

pub(crate) const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub(crate) const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);
pub(crate) const DEFAULT_MULTIPLIER: f64 = 1.0;

/// Immutable retry configuration.
///
/// Delays grow exponentially between attempts. For initial delay `d0` and
/// multiplier `m`:
///
/// ```text
/// attempt 1   immediate
/// attempt 2   after d0
/// attempt 3   after d0 * m
/// attempt k   after d0 * m^(k-2)
/// ```
///
/// each delay optionally capped at `max_delay` and randomised by `jitter`.
///
/// # Classification
///
/// - a kind in `exclude` is never retried;
/// - otherwise, if `include` is non-empty, only kinds in `include` are retried;
/// - if both sets are empty, every kind is retried.
///
/// # Examples
///
/// ```rust
/// use retrykit_core::retry::RetryPolicy;
/// use std::time::Duration;
///
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// # enum Kind { RemoteAccess, RemoteTimeout }
/// # impl std::fmt::Display for Kind {
/// #     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{self:?}") }
/// # }
/// let policy = RetryPolicy::builder()
///     .include([Kind::RemoteAccess, Kind::RemoteTimeout])
///     .max_attempts(3)
///     .initial_delay(Duration::from_millis(5000))
///     .multiplier(2.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(policy.delay_before_attempt(1), None);
/// assert_eq!(policy.delay_before_attempt(2), Some(Duration::from_millis(5000)));
/// assert_eq!(policy.delay_before_attempt(3), Some(Duration::from_millis(10000)));
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy<K: ErrorKind> {
    include: HashSet<K>,
    exclude: HashSet<K>,
    max_attempts: u32,
    initial_delay: Duration,
    multiplier: f64,
    max_delay: Option<Duration>,
    jitter: f64,
}

impl<K: ErrorKind> RetryPolicy<K> {
    /// Default number of attempts, including the first invocation.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = DEFAULT_MAX_ATTEMPTS;
    /// Default delay before the first retry.
    pub const DEFAULT_INITIAL_DELAY: Duration = DEFAULT_INITIAL_DELAY;
    /// Default multiplier (fixed delay).
    pub const DEFAULT_MULTIPLIER: f64 = DEFAULT_MULTIPLIER;

    /// Create a new builder for configuring a retry policy.
    pub fn builder() -> RetryPolicyBuilder<K> {
        RetryPolicyBuilder::default()
    }

    /// Whether a failure of this kind may be retried.
    pub fn is_retryable(&self, kind: &K) -> bool {
        if self.exclude.contains(kind) {
            return false;
        }
        self.include.is_empty() || self.include.contains(kind)
    }

    /// The delay to wait before the given attempt (1-indexed).
    ///
    /// Returns `None` for the first attempt, which always runs immediately.
    pub fn delay_before_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt <= 1 {
            return None;
        }

        // Work in nanoseconds so integral multipliers stay exact.
        let exponent = i32::try_from(attempt - 2).unwrap_or(i32::MAX);
        let base = self.initial_delay.as_nanos() as f64 * self.multiplier.powi(exponent);

        let jittered = if self.jitter > 0.0 {
            let jitter_amount = base * self.jitter * (rand::random::<f64>() - 0.5) * 2.0;
            base + jitter_amount
        } else {
            base
        };

        let capped = match self.max_delay {
            Some(max) => jittered.min(max.as_nanos() as f64),
            None => jittered,
        };

        Some(nanos_to_duration(capped))
    }

    /// Maximum number of invocations, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the first retry.
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Factor by which the delay grows after each retry.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Upper bound on any single delay, if configured.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Jitter factor in `[0.0, 1.0]`.
    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// Kinds explicitly marked retryable.
    pub fn include(&self) -> &HashSet<K> {
        &self.include
    }

    /// Kinds explicitly excluded from retry.
    pub fn exclude(&self) -> &HashSet<K> {
        &self.exclude
    }
}

impl<K: ErrorKind> Default for RetryPolicy<K> {
    /// Retry every kind: 3 attempts, 1s fixed delay, no cap, no jitter.
    fn default() -> Self {
        Self {
            include: HashSet::new(),
            exclude: HashSet::new(),
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            initial_delay: Self::DEFAULT_INITIAL_DELAY,
            multiplier: Self::DEFAULT_MULTIPLIER,
            max_delay: None,
            jitter: 0.0,
        }
    }
}

fn nanos_to_duration(nanos: f64) -> Duration {
    if !nanos.is_finite() || nanos >= u64::MAX as f64 {
        return Duration::from_nanos(u64::MAX);
    }
    Duration::from_nanos(nanos.max(0.0).round() as u64)
}

/// Builder for [`RetryPolicy`].
///
/// Unset parameters fall back to the [`RetryPolicy::default`] values.
/// [`build`](Self::build) validates the result.
#[derive(Debug)]
pub struct RetryPolicyBuilder<K: ErrorKind> {
    include: HashSet<K>,
    exclude: HashSet<K>,
    max_attempts: Option<u32>,
    initial_delay: Option<Duration>,
    multiplier: Option<f64>,
    max_delay: Option<Duration>,
    jitter: Option<f64>,
}

impl<K: ErrorKind> Default for RetryPolicyBuilder<K> {
    fn default() -> Self {
        Self {
            include: HashSet::new(),
            exclude: HashSet::new(),
            max_attempts: None,
            initial_delay: None,
            multiplier: None,
            max_delay: None,
            jitter: None,
        }
    }
}

impl<K: ErrorKind> RetryPolicyBuilder<K> {
    /// Mark these kinds as retryable.
    ///
    /// When at least one kind is included, every other kind is not retried.
    pub fn include(mut self, kinds: impl IntoIterator<Item = K>) -> Self {
        self.include.extend(kinds);
        self
    }

    /// Never retry these kinds. Exclusion wins over inclusion.
    pub fn exclude(mut self, kinds: impl IntoIterator<Item = K>) -> Self {
        self.exclude.extend(kinds);
        self
    }

    /// Set the total number of attempts, including the first.
    ///
    /// Default: 3
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Set the delay before the first retry.
    ///
    /// Default: 1s
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = Some(delay);
        self
    }

    /// Set the exponential multiplier.
    ///
    /// Default: 1.0 (fixed delay)
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    /// Cap every delay at `delay`.
    ///
    /// Default: uncapped
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Set the jitter factor (0.0 to 1.0).
    ///
    /// A jitter of 0.1 lets each delay vary by ±10%. Out-of-range values are
    /// clamped; NaN and infinite values are rejected by [`build`](Self::build).
    ///
    /// Default: 0.0 (exact schedule)
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = Some(jitter);
        self
    }

    /// Validate and build the policy.
    pub fn build(self) -> Result<RetryPolicy<K>, PolicyError> {
        let max_attempts = self.max_attempts.unwrap_or(RetryPolicy::<K>::DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }

        let initial_delay = self
            .initial_delay
            .unwrap_or(RetryPolicy::<K>::DEFAULT_INITIAL_DELAY);
        if initial_delay.is_zero() {
            return Err(PolicyError::ZeroDelay);
        }

        let multiplier = self.multiplier.unwrap_or(RetryPolicy::<K>::DEFAULT_MULTIPLIER);
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(PolicyError::InvalidMultiplier(multiplier));
        }

        if let Some(max) = self.max_delay
            && max < initial_delay
        {
            return Err(PolicyError::MaxDelayTooShort {
                max_ms: max.as_millis(),
                initial_ms: initial_delay.as_millis(),
            });
        }

        let jitter = self.jitter.unwrap_or(0.0);
        if !jitter.is_finite() {
            return Err(PolicyError::InvalidJitter(jitter));
        }

        Ok(RetryPolicy {
            include: self.include,
            exclude: self.exclude,
            max_attempts,
            initial_delay,
            multiplier,
            max_delay: self.max_delay,
            jitter: jitter.clamp(0.0, 1.0),
        })
    }
}
