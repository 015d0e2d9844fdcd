//! Configuration loading from TOML files.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};

/// Top-level application configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub database: DatabaseConfig,
    pub labeling: LabelingConfig,
    pub logging: LoggingConfig,
}

/// Database location.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLite database path. Overridden by `DATABASE_URL` when set.
    pub url: String,
}

/// Risk-event labeling parameters.
///
/// The threshold is required configuration: the labeler has no hidden
/// default of its own.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelingConfig {
    /// Absolute percent move that must be strictly exceeded to flag a day.
    pub threshold_pct: f64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_path().display().to_string(),
        }
    }
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self { threshold_pct: 3.0 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

/// Default database location under the platform data directory.
fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("metalstore")
        .join("metalstore.db")
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or a value
    /// fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let mut config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file when it exists, otherwise fall back to
    /// defaults (still honoring environment overrides).
    ///
    /// # Errors
    /// Returns an error if an existing file fails to load or validate.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            return Self::load(path);
        }
        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.is_empty() {
                self.database.url = url;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "database.url",
            }
            .into());
        }
        if !(self.labeling.threshold_pct > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "labeling.threshold_pct",
                reason: format!("must be positive, got {}", self.labeling.threshold_pct),
            }
            .into());
        }
        Ok(())
    }
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    ///
    /// CLI verbosity flags win over the configured level: `--quiet` drops
    /// to warnings, any `-v` raises to debug.
    pub fn init(&self, verbose: u8, quiet: bool) {
        let level = if quiet {
            "warn"
        } else if verbose > 0 {
            "debug"
        } else {
            &self.level
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.labeling.threshold_pct, 3.0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parses_partial_files() {
        let config: Config = toml::from_str(
            r#"
            [labeling]
            threshold_pct = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(config.labeling.threshold_pct, 2.0);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn rejects_non_positive_threshold() {
        let config: Config = toml::from_str(
            r#"
            [labeling]
            threshold_pct = 0.0
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unknown_fields() {
        let result: std::result::Result<Config, _> = toml::from_str(
            r#"
            [labeling]
            treshold_pct = 3.0
            "#,
        );
        assert!(result.is_err());
    }
}
