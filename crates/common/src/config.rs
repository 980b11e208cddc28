//! Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RetimeError, RetimeResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Defaults used when creating new remap documents.
    pub defaults: RemapDefaults,

    /// Naming of rendered output files.
    pub output: OutputDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default remap parameters for new documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemapDefaults {
    /// Default remap mode ("speed" or "frames").
    pub mode: String,

    /// Scalar playback speed in percent of normal speed.
    pub speed_percent: f64,

    /// Blur-stretch compensation in `[0.0, 1.0]`.
    pub blur_stretch: f64,
}

/// Output file naming defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputDefaults {
    /// Prefix prepended to each rendered frame number.
    pub path_prefix: String,

    /// Zero-padding width of the frame number.
    pub frame_digits: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "retime_engine=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: RemapDefaults::default(),
            output: OutputDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RemapDefaults {
    fn default() -> Self {
        Self {
            mode: "speed".to_string(),
            speed_percent: 100.0,
            blur_stretch: 1.0,
        }
    }
}

impl Default for OutputDefaults {
    fn default() -> Self {
        Self {
            path_prefix: "render/frame_".to_string(),
            frame_digits: 4,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                Self::default()
            }
        }
    }

    /// Load config from an explicit path.
    pub fn load_from(path: impl AsRef<Path>) -> RetimeResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RetimeError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.check()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> RetimeResult<()> {
        self.save_to(config_file_path())
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> RetimeResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    fn check(&self) -> RetimeResult<()> {
        if !(0.0..=1.0).contains(&self.defaults.blur_stretch) {
            return Err(RetimeError::config(format!(
                "blur_stretch must be within [0, 1], got {}",
                self.defaults.blur_stretch
            )));
        }
        if self.output.frame_digits == 0 {
            return Err(RetimeError::config("frame_digits must be at least 1"));
        }
        Ok(())
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("retime").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.defaults.mode, "speed");
        assert!((config.defaults.speed_percent - 100.0).abs() < 1e-9);
        assert_eq!(config.output.frame_digits, 4);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"defaults":{"speed_percent":50.0}}"#).unwrap();
        assert!((config.defaults.speed_percent - 50.0).abs() < 1e-9);
        assert!((config.defaults.blur_stretch - 1.0).abs() < 1e-9);
        assert_eq!(config.output.path_prefix, "render/frame_");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("retime_test_config");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("config.json");

        let mut config = AppConfig::default();
        config.output.frame_digits = 6;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.output.frame_digits, 6);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_rejects_out_of_range_stretch() {
        let dir = std::env::temp_dir().join("retime_test_config_invalid");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"defaults":{"blur_stretch":1.5}}"#).unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, RetimeError::Config { .. }));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load_from("/nonexistent/retime/config.json").unwrap_err();
        assert!(matches!(err, RetimeError::FileNotFound { .. }));
    }
}
