// SPDX-License-Identifier: GPL-3.0-only

//! Persisted capture preferences

use crate::backends::camera::types::{PhotoCodec, Position};
use crate::constants::{
    CapturePreset, DEFAULT_PREVIEW_CAPACITY, DEFAULT_WARMUP_FRAMES, QualityPrioritization,
};
use crate::errors::ConfigError;
use crate::flash::FlashMode;
use crate::pipelines::photo::AspectRatio;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory name under the platform configuration directory
const CONFIG_DIR_NAME: &str = "camera-capture";
const CONFIG_FILE_NAME: &str = "config.json";

/// User capture preferences
///
/// Missing fields fall back to their defaults so older files keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Facing position selected at startup
    pub position: Position,
    pub preset: CapturePreset,
    /// Requested photo codec; the hardware may fall back to another
    pub codec: PhotoCodec,
    pub flash: FlashMode,
    pub aspect_ratio: AspectRatio,
    pub prioritization: QualityPrioritization,
    /// Preview frames discarded after the preview channel is (re)created
    pub warmup_frames: u32,
    /// Preview frames buffered for a slow consumer
    pub preview_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            position: Position::default(),
            preset: CapturePreset::default(),
            codec: PhotoCodec::default(),
            flash: FlashMode::default(),
            aspect_ratio: AspectRatio::default(),
            prioritization: QualityPrioritization::default(),
            warmup_frames: DEFAULT_WARMUP_FRAMES,
            preview_capacity: DEFAULT_PREVIEW_CAPACITY,
        }
    }
}

impl Config {
    /// `<config dir>/camera-capture/config.json`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from `path`, returning the default when the file does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let config = serde_json::from_str(&contents)?;
                debug!(path = %path.display(), "Loaded configuration");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No configuration file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }
}
