//! Error types crossing the retrykit boundaries.
//!
//! Attempt failures never reach the caller directly. The executor turns them
//! into retry/recover decisions and only surfaces [`RetryError`] once the
//! policy is exhausted without a matching recovery, or when the caller
//! cancels.

mod boundary;

use crate::retry::ErrorKind;

/// Attempts were exhausted and no recovery is registered for the final kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "retries exhausted after {attempts} attempt(s); no recovery registered for {kind}: {message}"
)]
pub struct UnrecoveredError<K: ErrorKind> {
    /// Kind of the last observed failure.
    pub kind: K,
    /// Message of the last observed failure.
    pub message: String,
    /// Number of attempts made before giving up.
    pub attempts: u32,
}

/// Outcome of an execution that produced neither a success nor a recovery value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetryError<K: ErrorKind> {
    /// No recovery function matched the final error kind.
    #[error(transparent)]
    Unrecovered(#[from] UnrecoveredError<K>),

    /// The caller cancelled the execution while it was waiting to retry.
    #[error("retry cancelled after {attempts} attempt(s)")]
    Cancelled {
        /// Attempts completed before cancellation was observed.
        attempts: u32,
    },
}

impl<K: ErrorKind> RetryError<K> {
    /// Returns `true` if this is a cancellation rather than an exhausted retry.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled { .. })
    }

    /// Error kind of the final failure, if the execution was not cancelled.
    pub fn kind(&self) -> Option<K> {
        match self {
            RetryError::Unrecovered(err) => Some(err.kind),
            RetryError::Cancelled { .. } => None,
        }
    }
}

/// Invalid retry policy parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    /// `max_attempts` must allow at least the initial invocation.
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    /// The initial backoff delay must be positive.
    #[error("initial delay must be greater than zero")]
    ZeroDelay,

    /// The multiplier must be finite and at least 1.0.
    #[error("multiplier must be a finite number >= 1.0, got {0}")]
    InvalidMultiplier(f64),

    /// The jitter factor must be a finite number.
    #[error("jitter must be a finite number, got {0}")]
    InvalidJitter(f64),

    /// The delay cap must not be below the initial delay.
    #[error("max delay ({max_ms}ms) is shorter than the initial delay ({initial_ms}ms)")]
    MaxDelayTooShort {
        /// Configured cap in milliseconds.
        max_ms: u128,
        /// Configured initial delay in milliseconds.
        initial_ms: u128,
    },
}

/// Errors raised while loading a [`RetryPolicyConfig`](crate::config::RetryPolicyConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("failed to parse retry config: {0}")]
    Parse(String),

    /// The config file could not be read.
    #[error("failed to read retry config: {0}")]
    Io(String),

    /// An environment override held an unusable value.
    #[error("{var} must be {expected}, got: '{value}'")]
    InvalidEnv {
        /// Variable name.
        var: String,
        /// Raw value found in the environment.
        value: String,
        /// Description of what was expected.
        expected: &'static str,
    },

    /// The values parsed but do not form a valid policy.
    #[error("invalid retry policy: {0}")]
    Policy(#[from] PolicyError),
}

crate::error_boundary!(toml::de::Error => ConfigError, |e| {
    ConfigError::Parse(e.to_string())
});

crate::error_boundary!(std::io::Error => ConfigError, |e| {
    ConfigError::Io(e.to_string())
});
