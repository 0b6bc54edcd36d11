//! Keyed query configuration
//!
//! Fixed settings a [`KeyedAccess`](crate::model::KeyedAccess) is built with.

use std::env::{self, VarError};

use serde::Deserialize;

use crate::error::{ModelError, ModelResult};

/// Environment variable overriding the batch size
pub const BATCH_SIZE_ENV: &str = "KEYED_QUERY_BATCH_SIZE";

/// Default number of keys placed into one batched query
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Configuration for batched key lookups
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KeyQueryConfig {
    /// Maximum number of keys in a single query
    pub batch_size: usize,
}

impl Default for KeyQueryConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl KeyQueryConfig {
    /// Create a configuration with a custom batch size
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self { batch_size }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> ModelResult<Self> {
        Self::from_env_value(env::var(BATCH_SIZE_ENV))
    }

    fn from_env_value(value: Result<String, VarError>) -> ModelResult<Self> {
        let config = match value {
            Ok(raw) => Self::with_batch_size(parse_batch_size(&raw)?),
            Err(VarError::NotPresent) => Self::default(),
            Err(VarError::NotUnicode(raw)) => {
                tracing::warn!("Rejecting non-unicode {}={:?}", BATCH_SIZE_ENV, raw);
                return Err(ModelError::Configuration(format!(
                    "{} is not valid unicode",
                    BATCH_SIZE_ENV
                )));
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ModelResult<()> {
        if self.batch_size == 0 {
            return Err(ModelError::Configuration(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_batch_size(raw: &str) -> ModelResult<usize> {
    raw.trim().parse::<usize>().map_err(|_| {
        tracing::warn!("Rejecting {}={:?}", BATCH_SIZE_ENV, raw);
        ModelError::Configuration(format!(
            "Invalid value for {}: '{}', expected a positive integer",
            BATCH_SIZE_ENV, raw
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = KeyQueryConfig::default();
        assert_eq!(config.batch_size, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = KeyQueryConfig::with_batch_size(0).validate().unwrap_err();
        assert!(matches!(err, ModelError::Configuration(_)));
    }

    #[test]
    fn test_parse_batch_size() {
        assert_eq!(parse_batch_size(" 250 ").unwrap(), 250);
        assert!(parse_batch_size("many").is_err());
        assert!(parse_batch_size("-1").is_err());
    }

    #[test]
    fn test_env_value_paths() {
        assert_eq!(
            KeyQueryConfig::from_env_value(Err(VarError::NotPresent)).unwrap(),
            KeyQueryConfig::default()
        );
        assert_eq!(
            KeyQueryConfig::from_env_value(Ok("25".to_string()))
                .unwrap()
                .batch_size,
            25
        );

        let zero = KeyQueryConfig::from_env_value(Ok("0".to_string())).unwrap_err();
        assert!(matches!(zero, ModelError::Configuration(ref msg) if msg.contains("zero")));

        let garbled = VarError::NotUnicode(std::ffi::OsString::from("1\u{fffd}0"));
        assert!(matches!(
            KeyQueryConfig::from_env_value(Err(garbled)),
            Err(ModelError::Configuration(_))
        ));
    }

    // the only test touching the process environment
    #[test]
    fn test_from_env() {
        use crate::model::KeyedAccess;
        use crate::tests::Cell;

        env::remove_var(BATCH_SIZE_ENV);
        assert_eq!(KeyQueryConfig::from_env().unwrap().batch_size, 100);
        assert_eq!(KeyedAccess::<Cell>::from_env().unwrap().config().batch_size, 100);

        env::set_var(BATCH_SIZE_ENV, "40");
        assert_eq!(KeyQueryConfig::from_env().unwrap().batch_size, 40);
        assert_eq!(KeyedAccess::<Cell>::from_env().unwrap().config().batch_size, 40);

        env::set_var(BATCH_SIZE_ENV, "0");
        assert!(KeyQueryConfig::from_env().is_err());
        assert!(matches!(
            KeyedAccess::<Cell>::from_env(),
            Err(ModelError::Configuration(_))
        ));

        env::remove_var(BATCH_SIZE_ENV);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: KeyQueryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, KeyQueryConfig::default());

        let config: KeyQueryConfig = serde_json::from_str(r#"{"batch_size": 25}"#).unwrap();
        assert_eq!(config.batch_size, 25);
    }
}
