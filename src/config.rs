//! Application configuration.
//!
//! Loads settings from config.json at startup. Provides the Tesseract
//! location, OCR preprocessing parameters and the snapshot file name.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::ocr::OcrSettings;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Complete application configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Tesseract installation folder or executable picked by the user
    pub tesseract_path: Option<PathBuf>,
    /// Explicit tessdata directory (otherwise Tesseract uses its own default)
    pub tessdata_dir: Option<PathBuf>,
    /// Tesseract language code
    pub ocr_language: String,
    /// Tesseract page segmentation mode (11 = sparse text)
    pub page_segmentation_mode: u8,
    /// Pixels brighter than this become white, everything else black
    pub binary_threshold: u8,
    /// Integer upscale applied after thresholding
    pub upscale_factor: u32,
    /// Median filter radius (4 = 9x9 window, 0 disables the filter)
    pub median_radius: u32,
    /// Snapshot file name, relative to the working directory
    pub snapshot_file: String,
    /// Source identifier for challenges added by hand
    pub manual_source: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tesseract_path: None,
            tessdata_dir: None,
            ocr_language: "eng".to_string(),
            page_segmentation_mode: 11,
            binary_threshold: 200,
            upscale_factor: 3,
            median_radius: 4,
            snapshot_file: "challenges_info.json".to_string(),
            manual_source: "manual".to_string(),
        }
    }
}

impl AppConfig {
    /// Load config from file, or return defaults if the file is missing or invalid.
    pub fn load(config_path: &Path) -> Self {
        crate::log(&format!("Looking for config at: {}", config_path.display()));

        if config_path.exists() {
            match fs::read_to_string(config_path) {
                Ok(contents) => match serde_json::from_str(&contents) {
                    Ok(config) => {
                        crate::log("Config loaded from config.json");
                        return config;
                    }
                    Err(e) => {
                        crate::log(&format!(
                            "Failed to parse config.json: {}. Using defaults.",
                            e
                        ));
                    }
                },
                Err(e) => {
                    crate::log(&format!(
                        "Failed to read config.json: {}. Using defaults.",
                        e
                    ));
                }
            }
        } else {
            crate::log("config.json not found. Using default config.");
        }

        Self::default()
    }

    /// Writes the config back as pretty-printed JSON.
    pub fn save(&self, config_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(config_path, json)
            .with_context(|| format!("Failed to write config: {}", config_path.display()))
    }

    /// OCR parameters handed to the worker thread.
    pub fn ocr_settings(&self, tesseract_exe: PathBuf) -> OcrSettings {
        OcrSettings {
            tesseract_exe,
            tessdata_dir: self.tessdata_dir.clone(),
            language: self.ocr_language.clone(),
            page_segmentation_mode: self.page_segmentation_mode,
            binary_threshold: self.binary_threshold,
            upscale_factor: self.upscale_factor,
            median_radius: self.median_radius,
        }
    }
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config() {
    let _ = CONFIG.set(AppConfig::load(&crate::paths::get_config_path()));
}

/// Returns a reference to the global configuration.
/// Falls back to defaults if called before init_config().
pub fn get_config() -> &'static AppConfig {
    CONFIG.get_or_init(AppConfig::default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("config.json"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "binary_threshold": 180 }"#).unwrap();

        let config = AppConfig::load(&path);
        assert_eq!(config.binary_threshold, 180);
        assert_eq!(config.snapshot_file, "challenges_info.json");
        assert_eq!(config.page_segmentation_mode, 11);
    }

    #[test]
    fn test_invalid_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        assert_eq!(AppConfig::load(&path), AppConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = AppConfig {
            tesseract_path: Some(PathBuf::from("/opt/tesseract")),
            ..AppConfig::default()
        };

        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path), config);
    }
}
