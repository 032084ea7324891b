//! Engine configuration — optional `~/.soundscape/config.yaml`.
//!
//! Every field has a default, so an empty or partial file is valid and a
//! missing file is not an error.

use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::params::EngineParameters;
use crate::theory::ScaleKind;

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_BLOCK_SIZE: usize = 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed RNG seed. `None` draws a new one per run.
    pub seed: Option<u64>,
    pub scale: ScaleKind,
    pub parameters: EngineParameters,
    /// Sample rate for offline rendering. Live playback uses the device rate.
    pub sample_rate: u32,
    /// Frames rendered per step.
    pub block_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            scale: ScaleKind::default(),
            parameters: EngineParameters::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl EngineConfig {
    /// Parse a YAML document.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                debug!("config: loaded {}", path.display());
                Self::from_yaml(&content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("config: {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load from the default location, or the defaults when there is no home
    /// directory.
    pub fn load_default() -> Result<Self, ConfigError> {
        match config_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }
}

/// `~/.soundscape/config.yaml`
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".soundscape").join("config.yaml"))
}
