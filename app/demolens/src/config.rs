//! FILENAME: app/demolens/src/config.rs
// PURPOSE: Backend configuration loaded from a JSON file.
// CONTEXT: Every field has a default, so an empty object or a missing file
// gives a working setup.

use crate::error::AppError;
use payload_engine::{NoiseBands, ValueShapeConfig, VisualizationProfile};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DemoLensConfig {
    /// Library JSON file.
    pub storage_path: PathBuf,
    /// Unified log file. No file logging when unset.
    pub log_path: Option<PathBuf>,
    /// Profile for captures that do not name one.
    pub profile: VisualizationProfile,
    /// Masking used for queries without their own override.
    pub default_shape: ValueShapeConfig,
    pub noise: NoiseBands,
    pub poll_interval_ms: u64,
    pub poll_max_attempts: u32,
}

impl Default for DemoLensConfig {
    fn default() -> Self {
        DemoLensConfig {
            storage_path: PathBuf::from("demolens-library.json"),
            log_path: None,
            profile: VisualizationProfile::Explore,
            default_shape: ValueShapeConfig::default(),
            noise: NoiseBands::default(),
            poll_interval_ms: 1000,
            poll_max_attempts: 30,
        }
    }
}

impl DemoLensConfig {
    /// Reads a config file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&text)
            .map_err(|e| AppError::InvalidConfig(format!("{}: {}", path.display(), e)))
    }
}
