//! Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use versemark_core::config::{ConfigError, EngineConfig};
use versemark_core::render::ViewSize;

/// Engine tunables plus host-shell settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    /// Where the file store keeps annotations. `None` uses the platform
    /// data directory.
    pub storage_dir: Option<PathBuf>,
    /// Translation of freshly created tabs.
    pub default_translation: String,
    /// Viewport width in CSS pixels.
    pub width: f64,
    /// Content height in CSS pixels.
    pub content_height: f64,
    pub device_pixel_ratio: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            storage_dir: None,
            default_translation: "ESV".to_string(),
            width: 800.0,
            content_height: 1200.0,
            device_pixel_ratio: 1.0,
        }
    }
}

impl AppConfig {
    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.engine.validate()?;
        if config.width <= 0.0 || config.content_height <= 0.0 {
            return Err(ConfigError::Parse("view dimensions must be positive".to_string()));
        }
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// Geometry of every document view.
    pub fn view_size(&self) -> ViewSize {
        ViewSize::new(self.width, self.content_height).with_device_pixel_ratio(self.device_pixel_ratio)
    }
}
