//! User settings persistence.
//!
//! This module handles loading and saving user preferences across sessions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::downsample::Downsampler;
use crate::labels::event_types::LabelKey;
use crate::labels::{LabelId, LabelStream};
use crate::persistence::{JsonFileStore, StoreError};
use crate::state::DEFAULT_LABEL_WIDTH;

/// User settings that persist across sessions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Settings file version for migration support
    #[serde(default = "default_version")]
    pub version: u32,
    /// Downsample plotted signals to the visible resolution
    #[serde(default = "default_downsampling")]
    pub downsampling: bool,
    /// Width of labels created by a click, in data-time units
    #[serde(default = "default_label_width")]
    pub default_label_width: f64,
    /// Root of the label store; platform data dir when unset
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
}

fn default_version() -> u32 {
    1
}

fn default_downsampling() -> bool {
    true
}

fn default_label_width() -> f64 {
    DEFAULT_LABEL_WIDTH
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            downsampling: default_downsampling(),
            default_label_width: default_label_width(),
            storage_dir: None,
        }
    }
}

impl Settings {
    /// Get the config directory path for sensorlabel
    pub fn get_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sensorlabel"))
    }

    /// Get the path to the settings JSON file
    pub fn get_settings_path() -> Option<PathBuf> {
        Self::get_config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::get_settings_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid settings file {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<(), StoreError> {
        let path = Self::get_settings_path().ok_or(StoreError::NoDataDir)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    pub fn downsampler(&self) -> Downsampler {
        Downsampler::new(self.downsampling)
    }

    /// Create-by-click: a selected label of `default_label_width` centered on `p`
    pub fn create_label(
        &self,
        stream: &mut LabelStream,
        p: f64,
        key: LabelKey,
    ) -> Option<LabelId> {
        stream.create_at(p, self.default_label_width, key)
    }

    /// Label store at `storage_dir`, or the platform default
    pub fn store(&self) -> Result<JsonFileStore, StoreError> {
        match &self.storage_dir {
            Some(dir) => Ok(JsonFileStore::new(dir.clone())),
            None => JsonFileStore::default_location(),
        }
    }
}
