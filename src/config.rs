//! Engine configuration loaded from JSON.
//!
//! ```json
//! { "tessellation": { "resolution": 6, "position_tolerance": 1e-9 } }
//! ```
//!
//! Every field is optional; missing fields take their defaults and an
//! out-of-range resolution is clamped to `[1, 10]`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geom::TessellationOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub tessellation: TessellationOptions,
}

impl EngineConfig {
    /// Parses a JSON config. Bad tolerances are already replaced by
    /// [`TessellationOptions`] deserialization.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Reads and parses a JSON config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let config = EngineConfig::from_json_str(&text)?;
    log::debug!("loaded config from {}: {config:?}", path.display());
    Ok(config)
}
