//! Application Configuration
//!
//! Service settings stored in TOML format.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Image and OCR settings
    pub vision: VisionSettings,
    /// Output formatting
    pub output: OutputSettings,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Image and OCR settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionSettings {
    /// Convert decoded images to grayscale
    pub grayscale: bool,
    /// Histogram-equalize before detection (implies grayscale)
    pub enhance_contrast: bool,
    /// Recognize regions in parallel
    pub parallel_recognition: bool,
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            grayscale: false,
            enhance_contrast: false,
            parallel_recognition: true,
        }
    }
}

/// Output formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Pretty-print JSON
    pub pretty: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let config: AppConfig =
        toml::from_str(&content).with_context(|| format!("Invalid config file: {:?}", path))?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        assert_eq!(config.logging.level, "info");
        assert!(!config.vision.grayscale);
        assert!(!config.vision.enhance_contrast);
        assert!(config.vision.parallel_recognition);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = AppConfig::default();
        config.logging.level = "menu_vision=debug".to_string();
        config.vision.enhance_contrast = true;

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.logging.level, "menu_vision=debug");
        assert!(parsed.vision.enhance_contrast);
        assert_eq!(config.output.pretty, parsed.output.pretty);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: AppConfig = toml::from_str("[vision]\ngrayscale = true\n").unwrap();

        assert!(parsed.vision.grayscale);
        assert!(parsed.vision.parallel_recognition);
        assert_eq!(parsed.logging.level, "info");
        assert!(parsed.output.pretty);
    }

    #[test]
    fn test_save_and_load_config() {
        let mut config = AppConfig::default();
        config.output.pretty = false;

        let temp_file = NamedTempFile::new().unwrap();
        save_config(&config, temp_file.path()).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert!(!loaded.output.pretty);
        assert_eq!(config.vision.parallel_recognition, loaded.vision.parallel_recognition);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }
}
