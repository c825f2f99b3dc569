//! Application configuration
//!
//! [`AppConfig`] is read from and written to JSON and validated on both paths, and again
//! when a tracker is created from it.

use crate::api::formatting::NumberLocale;
use crate::core::constants::{DEFAULT_STORE_NAMESPACE, GPS_PROVIDER};
use crate::core::EarthModel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Longest accepted fix timeout (milliseconds)
const MAX_FIX_TIMEOUT_MS: u64 = 10 * 60 * 1000;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Language tag selecting digit grouping, e.g. "de-DE"
    pub locale: String,
    /// Directory holding key-value namespace files
    pub store_dir: PathBuf,
    /// Namespace holding the last fix
    pub store_namespace: String,
    /// Time allowed for a single fix (milliseconds)
    pub fix_timeout_ms: u64,
    /// Location provider to query
    pub provider: String,
    /// Earth model for distance computation
    pub earth_model: EarthModel,
    /// Platform API level; below 23 no runtime permission checks apply
    pub api_level: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            locale: "de-DE".to_string(),
            store_dir: PathBuf::from("."),
            store_namespace: DEFAULT_STORE_NAMESPACE.to_string(),
            fix_timeout_ms: 60_000,
            provider: GPS_PROVIDER.to_string(),
            earth_model: EarthModel::default(),
            api_level: 30,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid parameter value
    #[error("invalid {parameter} = {value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Configuration file I/O error
    #[error("config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON serialization/deserialization error
    #[error("config serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

fn invalid(parameter: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl AppConfig {
    /// Load and validate configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.as_ref().to_string_lossy().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Parse and validate configuration from JSON text
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: AppConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write configuration as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        self.validate()?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content).map_err(|source| ConfigError::Io {
            path: path.as_ref().to_string_lossy().to_string(),
            source,
        })
    }

    /// Check every parameter, reporting the first invalid one
    pub fn validate(&self) -> ConfigResult<()> {
        if self.fix_timeout_ms == 0 || self.fix_timeout_ms > MAX_FIX_TIMEOUT_MS {
            return Err(invalid(
                "fix_timeout_ms",
                self.fix_timeout_ms,
                "must be between 1 ms and 10 minutes",
            ));
        }

        if self.provider.trim().is_empty() {
            return Err(invalid("provider", &self.provider, "must not be empty"));
        }

        if self.store_namespace.trim().is_empty()
            || self.store_namespace.contains(['/', '\\'])
            || self.store_namespace.starts_with('.')
        {
            return Err(invalid(
                "store_namespace",
                &self.store_namespace,
                "must be a plain file stem",
            ));
        }

        let radius = self.earth_model.mean_radius_m;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(invalid(
                "earth_model.mean_radius_m",
                radius,
                "must be a positive number",
            ));
        }

        Ok(())
    }

    /// Digit grouping for the configured locale
    pub fn number_locale(&self) -> NumberLocale {
        NumberLocale::from_tag(&self.locale)
    }

    pub fn fix_timeout(&self) -> Duration {
        Duration::from_millis(self.fix_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.store_namespace, "koordinaten_prefs");
        assert_eq!(config.provider, "gps");
        assert_eq!(config.number_locale(), NumberLocale::german());
        assert_eq!(config.fix_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AppConfig::from_json_str(r#"{ "locale": "en-US", "fix_timeout_ms": 5000 }"#)
            .unwrap();

        assert_eq!(config.number_locale(), NumberLocale::english());
        assert_eq!(config.fix_timeout_ms, 5000);
        assert_eq!(config.provider, "gps");
        assert_eq!(config.api_level, 30);
    }

    #[test]
    fn test_invalid_parameters() {
        let cases = [
            r#"{ "fix_timeout_ms": 0 }"#,
            r#"{ "fix_timeout_ms": 600001 }"#,
            r#"{ "provider": "  " }"#,
            r#"{ "store_namespace": "../escape" }"#,
            r#"{ "store_namespace": "" }"#,
            r#"{ "earth_model": { "mean_radius_m": -1.0 } }"#,
        ];

        for json in cases {
            let result = AppConfig::from_json_str(json);
            assert!(
                matches!(result, Err(ConfigError::InvalidParameter { .. })),
                "accepted {}",
                json
            );
        }
    }

    #[test]
    fn test_malformed_json() {
        let result = AppConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(ConfigError::Serialization(_))));
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = AppConfig {
            locale: "fr-FR".to_string(),
            store_dir: dir.path().join("prefs"),
            fix_timeout_ms: 15_000,
            api_level: 22,
            ..Default::default()
        };
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let result = AppConfig::from_file(dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
