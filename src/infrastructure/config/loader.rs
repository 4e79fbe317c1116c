//! Hierarchical configuration loading.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Poll delay must be at least one millisecond.
    #[error("Invalid poll delay: {0}ms. Must be at least 1")]
    InvalidDelay(u64),

    /// A tick budget of zero would never observe anything.
    #[error("Invalid {direction} budget: must be at least 1 tick")]
    InvalidBudget {
        /// Which budget failed ("start" or "stop").
        direction: &'static str,
    },

    /// Unknown log level string.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Configuration loader with hierarchical merging.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults
    /// 2. `hostwatch.yaml` in the working directory
    /// 3. Environment variables (`HOSTWATCH_` prefix, `__` separator)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file("hostwatch.yaml"))
            .merge(Env::prefixed("HOSTWATCH_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.polling.delay_ms == 0 {
            return Err(ConfigError::InvalidDelay(config.polling.delay_ms));
        }

        if config.polling.start_budget == 0 {
            return Err(ConfigError::InvalidBudget { direction: "start" });
        }

        if config.polling.stop_budget == 0 {
            return Err(ConfigError::InvalidBudget { direction: "stop" });
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.polling.delay_ms, 500);
        assert_eq!(config.polling.start_budget, 15);
        assert_eq!(config.polling.stop_budget, 5);
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
polling:
  delay_ms: 250
  start_budget: 20
  stop_budget: 3
logging:
  level: debug
  format: pretty
";
        let config: Config = serde_yaml::from_str(yaml).expect("yaml should parse");

        assert_eq!(config.polling.delay_ms, 250);
        assert_eq!(config.polling.start_budget, 20);
        assert_eq!(config.polling.stop_budget, 3);
        assert_eq!(config.logging.level, "debug");
        ConfigLoader::validate(&config).expect("parsed config should be valid");
    }

    #[test]
    fn test_validate_zero_delay() {
        let mut config = Config::default();
        config.polling.delay_ms = 0;

        let result = ConfigLoader::validate(&config);
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidDelay(0)));
    }

    #[test]
    fn test_validate_zero_budgets() {
        let mut config = Config::default();
        config.polling.start_budget = 0;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidBudget { direction: "start" }
        ));

        let mut config = Config::default();
        config.polling.stop_budget = 0;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidBudget { direction: "stop" }
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();

        let result = ConfigLoader::validate(&config);
        match result.unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "verbose"),
            other => panic!("expected InvalidLogLevel, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "polling:\n  delay_ms: 100\nlogging:\n  level: warn").unwrap();
        file.flush().unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.polling.delay_ms, 100);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.polling.start_budget, 15, "defaults fill gaps");
    }

    #[test]
    fn test_hierarchical_merging() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(
            base_file,
            "polling:\n  delay_ms: 100\n  stop_budget: 4\nlogging:\n  level: info"
        )
        .unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "polling:\n  delay_ms: 50").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.polling.delay_ms, 50, "override should win");
        assert_eq!(
            config.polling.stop_budget, 4,
            "base value should persist when not overridden"
        );
    }
}
