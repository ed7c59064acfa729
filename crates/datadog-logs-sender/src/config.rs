// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BATCH_MAX_CONTENT_SIZE, DEFAULT_BATCH_MAX_SIZE, DEFAULT_BATCH_WAIT, DEFAULT_CHAN_SIZE,
};
use crate::errors::ConfigError;

/// Settings of a logs sender. Fixed once the sender is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Send records in batches. When false every record is its own payload.
    pub use_batching: bool,
    /// How long the first record of a batch may wait before the batch is flushed
    pub batch_wait: Duration,
    /// Maximum number of records per batch
    pub batch_max_size: usize,
    /// Maximum cumulative content size per batch, in bytes
    pub batch_max_content_size: usize,
    /// Capacity of the input and output queues
    pub chan_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            use_batching: true,
            batch_wait: DEFAULT_BATCH_WAIT,
            batch_max_size: DEFAULT_BATCH_MAX_SIZE,
            batch_max_content_size: DEFAULT_BATCH_MAX_CONTENT_SIZE,
            chan_size: DEFAULT_CHAN_SIZE,
        }
    }
}

impl Config {
    /// Reads overrides from the environment on top of the defaults.
    ///
    /// Unset variables keep their default. Values that do not parse, and zero
    /// limits, are rejected.
    pub fn new() -> Result<Config, ConfigError> {
        let mut config = Config::default();

        if let Some(use_batching) = read_bool("DD_LOGS_CONFIG_USE_BATCHING")? {
            config.use_batching = use_batching;
        }
        if let Ok(val) = env::var("DD_LOGS_CONFIG_BATCH_WAIT") {
            // Seconds, fractional values allowed (e.g. "0.5")
            config.batch_wait = val
                .parse::<f64>()
                .ok()
                .filter(|secs| secs.is_finite() && *secs > 0.0)
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                .ok_or(ConfigError::InvalidValue {
                    key: "DD_LOGS_CONFIG_BATCH_WAIT",
                    value: val,
                })?;
        }
        if let Some(size) = read_positive("DD_LOGS_CONFIG_BATCH_MAX_SIZE")? {
            config.batch_max_size = size;
        }
        if let Some(size) = read_positive("DD_LOGS_CONFIG_BATCH_MAX_CONTENT_SIZE")? {
            config.batch_max_content_size = size;
        }
        if let Some(size) = read_positive("DD_LOGS_CONFIG_CHAN_SIZE")? {
            config.chan_size = size;
        }

        Ok(config)
    }

    /// Rejects limits a sender cannot run with.
    ///
    /// `Config::new` never produces such values, but the fields are public
    /// and a config built in code skips the environment parsing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero = |key: &'static str| ConfigError::InvalidValue {
            key,
            value: "0".to_string(),
        };
        if self.batch_wait.is_zero() {
            return Err(zero("DD_LOGS_CONFIG_BATCH_WAIT"));
        }
        if self.batch_max_size == 0 {
            return Err(zero("DD_LOGS_CONFIG_BATCH_MAX_SIZE"));
        }
        if self.batch_max_content_size == 0 {
            return Err(zero("DD_LOGS_CONFIG_BATCH_MAX_CONTENT_SIZE"));
        }
        if self.chan_size == 0 {
            return Err(zero("DD_LOGS_CONFIG_CHAN_SIZE"));
        }
        Ok(())
    }
}

fn read_positive<T>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr + PartialOrd + Default,
{
    match env::var(key) {
        Ok(val) => match val.trim().parse::<T>() {
            Ok(parsed) if parsed > T::default() => Ok(Some(parsed)),
            _ => Err(ConfigError::InvalidValue { key, value: val }),
        },
        Err(_) => Ok(None),
    }
}

fn read_bool(key: &'static str) -> Result<Option<bool>, ConfigError> {
    match env::var(key) {
        Ok(val) => match val.to_lowercase().as_str() {
            "true" | "1" => Ok(Some(true)),
            "false" | "0" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidValue { key, value: val }),
        },
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 5] = [
        "DD_LOGS_CONFIG_USE_BATCHING",
        "DD_LOGS_CONFIG_BATCH_WAIT",
        "DD_LOGS_CONFIG_BATCH_MAX_SIZE",
        "DD_LOGS_CONFIG_BATCH_MAX_CONTENT_SIZE",
        "DD_LOGS_CONFIG_CHAN_SIZE",
    ];

    fn clear_env() {
        for key in KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::new().unwrap();
        assert_eq!(config, Config::default());
        assert!(config.use_batching);
        assert_eq!(config.batch_wait, Duration::from_secs(5));
        assert_eq!(config.batch_max_size, 20);
        assert_eq!(config.batch_max_content_size, 1_000_000);
        assert_eq!(config.chan_size, 100);
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        env::set_var("DD_LOGS_CONFIG_USE_BATCHING", "false");
        env::set_var("DD_LOGS_CONFIG_BATCH_WAIT", "0.5");
        env::set_var("DD_LOGS_CONFIG_BATCH_MAX_SIZE", "1000");
        env::set_var("DD_LOGS_CONFIG_BATCH_MAX_CONTENT_SIZE", "5242880");
        env::set_var("DD_LOGS_CONFIG_CHAN_SIZE", "42");

        let config = Config::new().unwrap();

        assert!(!config.use_batching);
        assert_eq!(config.batch_wait, Duration::from_millis(500));
        assert_eq!(config.batch_max_size, 1000);
        assert_eq!(config.batch_max_content_size, 5_242_880);
        assert_eq!(config.chan_size, 42);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_zero_limits_rejected() {
        clear_env();
        env::set_var("DD_LOGS_CONFIG_BATCH_MAX_SIZE", "0");
        assert_eq!(
            Config::new().unwrap_err(),
            ConfigError::InvalidValue {
                key: "DD_LOGS_CONFIG_BATCH_MAX_SIZE",
                value: "0".to_string(),
            }
        );
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_values_rejected() {
        for (key, value) in [
            ("DD_LOGS_CONFIG_BATCH_WAIT", "soon"),
            ("DD_LOGS_CONFIG_BATCH_WAIT", "-1"),
            ("DD_LOGS_CONFIG_BATCH_WAIT", "0"),
            ("DD_LOGS_CONFIG_BATCH_MAX_CONTENT_SIZE", "1MB"),
            ("DD_LOGS_CONFIG_USE_BATCHING", "yes please"),
        ] {
            clear_env();
            env::set_var(key, value);
            assert!(
                matches!(Config::new(), Err(ConfigError::InvalidValue { key: k, .. }) if k == key),
                "{key}={value} should be rejected"
            );
        }
        clear_env();
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        assert_eq!(Config::default().validate(), Ok(()));

        for (config, key) in [
            (
                Config {
                    batch_wait: Duration::ZERO,
                    ..Config::default()
                },
                "DD_LOGS_CONFIG_BATCH_WAIT",
            ),
            (
                Config {
                    batch_max_size: 0,
                    ..Config::default()
                },
                "DD_LOGS_CONFIG_BATCH_MAX_SIZE",
            ),
            (
                Config {
                    batch_max_content_size: 0,
                    ..Config::default()
                },
                "DD_LOGS_CONFIG_BATCH_MAX_CONTENT_SIZE",
            ),
            (
                Config {
                    chan_size: 0,
                    ..Config::default()
                },
                "DD_LOGS_CONFIG_CHAN_SIZE",
            ),
        ] {
            assert_eq!(
                config.validate(),
                Err(ConfigError::InvalidValue {
                    key,
                    value: "0".to_string(),
                })
            );
        }
    }
}
