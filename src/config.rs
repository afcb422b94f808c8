// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_QUEUE_WARN_LEN, DEFAULT_THREAD_NAME,
};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Scan worker settings
///
/// Missing fields fall back to their defaults, so a config file only needs
/// to name what it changes.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Name of the worker thread (shows up in logs and debuggers)
    pub thread_name: String,
    /// Downscale frames whose larger side exceeds this before scanning
    pub max_dimension: Option<u32>,
    /// Queue length at which a warning is logged
    pub queue_warn_len: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            max_dimension: None, // Scan at full resolution
            queue_warn_len: DEFAULT_QUEUE_WARN_LEN,
        }
    }
}

impl ScanConfig {
    /// Default config file location (`~/.config/framescan/config.json`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load a config file
    pub fn load(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        let config: ScanConfig = serde_json::from_str(&text)?;
        info!(path = %path.display(), "Loaded scan config");
        Ok(config)
    }

    /// Load from `path`, or from the default location when it exists
    ///
    /// A missing default file is not an error; an explicit path must exist.
    pub fn load_or_default(path: Option<&Path>) -> AppResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }
}
