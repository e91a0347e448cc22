//! Application configuration management.
//!
//! Loads chart defaults, logging and UI settings from a TOML file. Every
//! field has a default, so a missing or partial file is fine.

use crate::charts::{ChartStyle, MAX_SIZE, MIN_SIZE};
use crate::export::DownloadFormat;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "wheel_map.toml";

/// Errors related to application configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Top-level application configuration
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub chart: ChartConfig,
    pub logging: LoggingConfig,
    pub app: UiConfig,
}

/// Defaults for newly created charts
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub font_family: String,
    pub font_size: f64,
    #[serde(deserialize_with = "deserialize_format")]
    pub download_format: DownloadFormat,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

/// UI configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub sample_data_url: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        let style = ChartStyle::default();
        Self {
            width: 750,
            height: 750,
            font_family: style.font_family,
            font_size: style.font_size,
            download_format: DownloadFormat::Png,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            sample_data_url:
                "https://raw.githubusercontent.com/abdalimran/wheel-map/main/sample_data_wheel_map.csv"
                    .to_string(),
        }
    }
}

impl ChartConfig {
    pub fn style(&self) -> ChartStyle {
        ChartStyle {
            font_family: self.font_family.clone(),
            font_size: self.font_size,
        }
    }
}

fn deserialize_format<'de, D>(deserializer: D) -> Result<DownloadFormat, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit path if given, else `wheel_map.toml` when present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("chart.width", self.chart.width), ("chart.height", self.chart.height)] {
            if !(MIN_SIZE..=MAX_SIZE).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("must be between {} and {}", MIN_SIZE, MAX_SIZE),
                });
            }
        }

        if !(self.chart.font_size > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "chart.font_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.chart.width, 750);
        assert_eq!(config.chart.height, 750);
        assert_eq!(config.chart.download_format, DownloadFormat::Png);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [chart]
            width = 1200
            download_format = "html (div only)"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.chart.width, 1200);
        assert_eq!(config.chart.height, 750);
        assert_eq!(config.chart.download_format, DownloadFormat::HtmlDiv);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.chart.style(), ChartStyle::default());
    }

    #[test]
    fn test_validate_size_range() {
        let mut config = AppConfig::default();
        config.chart.width = 499;
        assert!(config.validate().is_err());

        config.chart.width = 2500;
        config.chart.height = 2501;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "chart.height"
        ));
    }

    #[test]
    fn test_validate_font_size_and_level() {
        let mut config = AppConfig::default();
        config.chart.font_size = 0.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.level = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_format_is_parse_error() {
        let err = AppConfig::from_toml("[chart]\ndownload_format = \"gif\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[chart]\nfont_size = 14.0").unwrap();
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.chart.font_size, 14.0);

        let missing = AppConfig::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(missing, Err(ConfigError::ReadError { .. })));
    }
}
