use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Color;
use crate::context::ApplicationContext;

/// Errors that can occur while loading a host configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Host settings. Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Directory that relative sprite and icon paths are resolved against
    pub resource_root: PathBuf,
    /// Directories scanned for plugin libraries
    pub plugin_dirs: Vec<PathBuf>,
    /// Widget creation fails once a tool owns this many widgets
    pub max_widgets_per_tool: usize,
    /// Largest accepted canvas width or height
    pub max_canvas_side: usize,
    /// Fill color of a freshly created canvas
    pub canvas_background: Color,
    /// Number of decoded sprites kept for `put_sprite`
    pub sprite_cache_size: usize,
    /// Initial drawing colors
    pub context: ApplicationContext,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            resource_root: PathBuf::from("."),
            plugin_dirs: vec![PathBuf::from("plugins")],
            max_widgets_per_tool: 64,
            max_canvas_side: 4096,
            canvas_background: Color::WHITE,
            sprite_cache_size: 32,
            context: ApplicationContext::default(),
        }
    }
}

impl HostConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded host config from {}", path.display());
        Ok(config)
    }
}
