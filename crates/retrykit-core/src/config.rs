//! Loading retry policies from TOML and the environment.

use crate::error::ConfigError;
use crate::retry::{
    DEFAULT_INITIAL_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MULTIPLIER, ErrorKind, RetryPolicy,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Serializable mirror of [`RetryPolicy`].
///
/// Durations are expressed in milliseconds. Missing fields take the
/// [`RetryPolicy`] defaults.
///
/// ```toml
/// max_attempts = 3
/// delay_ms = 5000
/// multiplier = 2.0
/// include = ["remote_access", "remote_timeout"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    default,
    deny_unknown_fields,
    bound(serialize = "K: Serialize", deserialize = "K: Deserialize<'de>")
)]
pub struct RetryPolicyConfig<K> {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub delay_ms: u64,
    /// Delay growth factor.
    pub multiplier: f64,
    /// Cap on any single delay.
    pub max_delay_ms: Option<u64>,
    /// Randomisation factor in `[0.0, 1.0]`.
    pub jitter: f64,
    /// Retryable kinds; empty means every kind not excluded.
    pub include: Vec<K>,
    /// Kinds never retried.
    pub exclude: Vec<K>,
}

impl<K> Default for RetryPolicyConfig<K> {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_ms: duration_to_millis(DEFAULT_INITIAL_DELAY),
            multiplier: DEFAULT_MULTIPLIER,
            max_delay_ms: None,
            jitter: 0.0,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl<K> RetryPolicyConfig<K>
where
    K: for<'de> Deserialize<'de>,
{
    /// Parse a config from a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Read and parse a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}

const JITTER_EXPECTED: &str = "a number between 0 and 1";

impl<K> RetryPolicyConfig<K> {
    /// Override numeric fields from environment variables.
    ///
    /// This will look for:
    /// - `<PREFIX>_MAX_ATTEMPTS` (u32)
    /// - `<PREFIX>_DELAY_MS` (u64)
    /// - `<PREFIX>_MULTIPLIER` (f64)
    /// - `<PREFIX>_MAX_DELAY_MS` (u64)
    /// - `<PREFIX>_JITTER` (f64)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if a variable is set but cannot be
    /// parsed, or if the jitter is not a number between 0 and 1.
    pub fn apply_env(mut self, prefix: &str) -> Result<Self, ConfigError> {
        if let Some(max_attempts) = env_override(prefix, "MAX_ATTEMPTS", "a whole number")? {
            self.max_attempts = max_attempts;
        }
        if let Some(delay_ms) = env_override(prefix, "DELAY_MS", "a number of milliseconds")? {
            self.delay_ms = delay_ms;
        }
        if let Some(multiplier) = env_override(prefix, "MULTIPLIER", "a number")? {
            self.multiplier = multiplier;
        }
        if let Some(max_delay_ms) =
            env_override(prefix, "MAX_DELAY_MS", "a number of milliseconds")?
        {
            self.max_delay_ms = Some(max_delay_ms);
        }
        if let Some(jitter) = env_override::<f64>(prefix, "JITTER", JITTER_EXPECTED)? {
            if !(0.0..=1.0).contains(&jitter) {
                return Err(ConfigError::InvalidEnv {
                    var: format!("{prefix}_JITTER"),
                    value: jitter.to_string(),
                    expected: JITTER_EXPECTED,
                });
            }
            self.jitter = jitter;
        }
        Ok(self)
    }
}

impl<K: ErrorKind> RetryPolicyConfig<K> {
    /// Validate and convert into a [`RetryPolicy`].
    pub fn into_policy(self) -> Result<RetryPolicy<K>, ConfigError> {
        let mut builder = RetryPolicy::builder()
            .include(self.include)
            .exclude(self.exclude)
            .max_attempts(self.max_attempts)
            .initial_delay(Duration::from_millis(self.delay_ms))
            .multiplier(self.multiplier)
            .jitter(self.jitter);
        if let Some(max_delay_ms) = self.max_delay_ms {
            builder = builder.max_delay(Duration::from_millis(max_delay_ms));
        }
        Ok(builder.build()?)
    }
}

impl<K: ErrorKind> From<&RetryPolicy<K>> for RetryPolicyConfig<K> {
    fn from(policy: &RetryPolicy<K>) -> Self {
        Self {
            max_attempts: policy.max_attempts(),
            delay_ms: duration_to_millis(policy.initial_delay()),
            multiplier: policy.multiplier(),
            max_delay_ms: policy.max_delay().map(duration_to_millis),
            jitter: policy.jitter(),
            include: policy.include().iter().copied().collect(),
            exclude: policy.exclude().iter().copied().collect(),
        }
    }
}

/// Whole milliseconds, rounding any sub-millisecond remainder up so a
/// non-zero duration never becomes zero.
fn duration_to_millis(duration: Duration) -> u64 {
    let partial = u128::from(duration.subsec_nanos() % 1_000_000 != 0);
    u64::try_from(duration.as_millis() + partial).unwrap_or(u64::MAX)
}

fn env_override<V: FromStr>(
    prefix: &str,
    name: &str,
    expected: &'static str,
) -> Result<Option<V>, ConfigError> {
    let var = format!("{prefix}_{name}");
    match std::env::var(&var) {
        Ok(value) => value
            .trim()
            .parse::<V>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                var,
                value,
                expected,
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PolicyError;
    use std::fmt;
    use std::io::Write;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    enum Kind {
        RemoteAccess,
        RemoteTimeout,
    }

    impl fmt::Display for Kind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{self:?}")
        }
    }

    #[test]
    fn test_parse_full_config() {
        let config = RetryPolicyConfig::<Kind>::from_toml_str(
            r#"
            max_attempts = 3
            delay_ms = 5000
            multiplier = 2.0
            max_delay_ms = 30000
            include = ["remote_access", "remote_timeout"]
            "#,
        )
        .unwrap();

        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.include, vec![Kind::RemoteAccess, Kind::RemoteTimeout]);

        let policy = config.into_policy().unwrap();
        assert!(policy.is_retryable(&Kind::RemoteTimeout));
        assert_eq!(
            policy.delay_before_attempt(3),
            Some(Duration::from_millis(10000))
        );
        assert_eq!(policy.max_delay(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = RetryPolicyConfig::<Kind>::from_toml_str("").unwrap();
        assert_eq!(config, RetryPolicyConfig::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = RetryPolicyConfig::<Kind>::from_toml_str("max_retries = 3");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result = RetryPolicyConfig::<Kind>::from_toml_str(r#"include = ["remote_dns"]"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_policy_surfaces_policy_error() {
        let config = RetryPolicyConfig::<Kind> {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.into_policy(),
            Err(ConfigError::Policy(PolicyError::ZeroAttempts))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_attempts = 5\ndelay_ms = 250").unwrap();

        let config = RetryPolicyConfig::<Kind>::from_file(file.path()).unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.delay_ms, 250);
    }

    #[test]
    fn test_from_missing_file() {
        let result = RetryPolicyConfig::<Kind>::from_file("/nonexistent/retry.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_env_overrides() {
        temp_env::with_vars(
            [
                ("RETRYTEST_MAX_ATTEMPTS", Some("7")),
                ("RETRYTEST_DELAY_MS", Some("20")),
                ("RETRYTEST_MULTIPLIER", Some("3")),
                ("RETRYTEST_MAX_DELAY_MS", Some("100")),
                ("RETRYTEST_JITTER", None),
            ],
            || {
                let config = RetryPolicyConfig::<Kind>::default()
                    .apply_env("RETRYTEST")
                    .unwrap();

                assert_eq!(config.max_attempts, 7);
                assert_eq!(config.delay_ms, 20);
                assert_eq!(config.multiplier, 3.0);
                assert_eq!(config.max_delay_ms, Some(100));
                assert_eq!(config.jitter, 0.0);
            },
        );
    }

    #[test]
    fn test_invalid_env_value_names_variable() {
        temp_env::with_var("RETRYBAD_MAX_ATTEMPTS", Some("three"), || {
            let err = RetryPolicyConfig::<Kind>::default()
                .apply_env("RETRYBAD")
                .unwrap_err();

            assert_eq!(
                err.to_string(),
                "RETRYBAD_MAX_ATTEMPTS must be a whole number, got: 'three'"
            );
        });
    }

    #[test]
    fn test_config_mirrors_policy() {
        let policy = RetryPolicy::builder()
            .include([Kind::RemoteTimeout])
            .max_attempts(4)
            .initial_delay(Duration::from_millis(300))
            .multiplier(2.0)
            .build()
            .unwrap();

        let config = RetryPolicyConfig::from(&policy);
        assert_eq!(config.max_attempts, 4);
        assert_eq!(config.delay_ms, 300);
        assert_eq!(config.include, vec![Kind::RemoteTimeout]);

        let rebuilt = config.into_policy().unwrap();
        assert_eq!(rebuilt.delay_before_attempt(3), policy.delay_before_attempt(3));
    }

    #[test]
    fn test_sub_millisecond_delays_round_up() {
        let policy = RetryPolicy::<Kind>::builder()
            .initial_delay(Duration::from_micros(500))
            .max_delay(Duration::from_micros(1500))
            .build()
            .unwrap();

        let config = RetryPolicyConfig::from(&policy);
        assert_eq!(config.delay_ms, 1);
        assert_eq!(config.max_delay_ms, Some(2));

        let rebuilt = config.into_policy().unwrap();
        assert_eq!(rebuilt.initial_delay(), Duration::from_millis(1));
        assert_eq!(rebuilt.max_delay(), Some(Duration::from_millis(2)));
    }

    #[test]
    fn test_default_config_matches_default_policy() {
        let from_config = RetryPolicyConfig::<Kind>::default().into_policy().unwrap();
        let default = RetryPolicy::<Kind>::default();

        assert_eq!(from_config.max_attempts(), default.max_attempts());
        assert_eq!(from_config.initial_delay(), default.initial_delay());
        assert_eq!(from_config.multiplier(), default.multiplier());
        assert_eq!(from_config.max_delay(), default.max_delay());
        assert_eq!(from_config.jitter(), default.jitter());
        assert_eq!(
            RetryPolicyConfig::from(&default),
            RetryPolicyConfig::<Kind>::default()
        );
    }

    #[test]
    fn test_env_jitter_out_of_range_rejected() {
        temp_env::with_var("RETRYJIT_JITTER", Some("7"), || {
            let err = RetryPolicyConfig::<Kind>::default()
                .apply_env("RETRYJIT")
                .unwrap_err();

            assert_eq!(
                err.to_string(),
                "RETRYJIT_JITTER must be a number between 0 and 1, got: '7'"
            );
        });
    }

    #[test]
    fn test_env_jitter_nan_rejected() {
        temp_env::with_var("RETRYNAN_JITTER", Some("NaN"), || {
            let result = RetryPolicyConfig::<Kind>::default().apply_env("RETRYNAN");

            assert!(matches!(
                result,
                Err(ConfigError::InvalidEnv { ref var, .. }) if var == "RETRYNAN_JITTER"
            ));
        });
    }

    #[test]
    fn test_env_jitter_in_range_accepted() {
        temp_env::with_var("RETRYJOK_JITTER", Some("0.25"), || {
            let policy = RetryPolicyConfig::<Kind>::default()
                .apply_env("RETRYJOK")
                .unwrap()
                .into_policy()
                .unwrap();

            assert_eq!(policy.jitter(), 0.25);
        });
    }
}
