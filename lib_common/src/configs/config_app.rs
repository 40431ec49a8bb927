use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the optional configuration file.
const CONFIG_FILE_NAME: &str = "wishtrack.config.json";
/// Environment variable that overrides the configuration file location.
const CONFIG_ENV_VAR: &str = "WISHTRACK_CONFIG";

#[derive(Debug, Error)]
/// Errors produced while locating, reading or validating configuration.
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    /// The configuration file is not valid JSON for [`AppConfig`].
    #[error("failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A configuration value is outside its accepted range.
    #[error("configuration value out of range: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
/// # Application Configuration
///
/// All tunables of a run. Every field has a default, so a missing file or a
/// partial file are both fine.
pub struct AppConfig {
    /// Maximum fetch attempts per endpoint, including the first one.
    pub max_retries: u32,
    /// First backoff delay in whole seconds; doubles after each failure.
    pub initial_delay_secs: u64,
    /// Item-ranking truncation for the textual summary.
    pub top_items_text: usize,
    /// Item-ranking truncation for the chart sink.
    pub top_items_chart: usize,
    /// Budget for one whole aggregation run, in seconds.
    pub aggregation_timeout_secs: u64,
    /// Directory receiving the exported files.
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_secs: 2,
            top_items_text: 5,
            top_items_chart: 10,
            aggregation_timeout_secs: 60,
            output_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// The first backoff delay as a [`Duration`].
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    /// The aggregation budget as a [`Duration`].
    pub fn aggregation_timeout(&self) -> Duration {
        Duration::from_secs(self.aggregation_timeout_secs)
    }

    /// Rejects values the fetch layer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries < 1 {
            return Err(ConfigError::InvalidValue(
                "max_retries must be at least 1".to_string(),
            ));
        }
        if self.initial_delay_secs < 1 {
            return Err(ConfigError::InvalidValue(
                "initial_delay_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolves the configuration file location.
///
/// Order: the explicit path if given, then `WISHTRACK_CONFIG`, then
/// `<platform config dir>/wishtrack/wishtrack.config.json`.
pub fn config_file_location(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(from_env) = env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(from_env));
    }
    dirs::config_dir().map(|base| base.join("wishtrack").join(CONFIG_FILE_NAME))
}

/// Loads the application configuration.
///
/// A missing file yields the defaults unless the path was explicit, in
/// which case the I/O error is surfaced. A present file must parse and
/// validate.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let location = config_file_location(explicit);

    let config = match location {
        Some(path) if path.is_file() => {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str::<AppConfig>(&raw)?
        }
        Some(path) if explicit.is_some() => {
            // An explicitly named file must exist.
            return Err(ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("configuration file not found: {}", path.display()),
            )));
        }
        _ => AppConfig::default(),
    };

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_delay_secs, 2);
        assert_eq!(config.top_items_text, 5);
        assert_eq!(config.top_items_chart, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{"max_retries": 5, "top_items_text": 3}"#).expect("write");

        let config = load_config(Some(&path)).expect("load");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.top_items_text, 3);
        assert_eq!(config.initial_delay_secs, 2);
    }

    #[test]
    fn zero_retries_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{"max_retries": 0}"#).expect("write");

        let result = load_config(Some(&path));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let result = load_config(Some(Path::new("/definitely/not/here.json")));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
