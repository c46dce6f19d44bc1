//! Host configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Configuration for the bridge host.
///
/// Kept deliberately small: the core only needs to know where to find its
/// plugins. Binding layers with richer configuration translate into this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Directory scanned for plugin modules at initialization
    #[serde(default = "default_plugin_dir")]
    pub plugin_dir: PathBuf,
}

fn default_plugin_dir() -> PathBuf {
    PathBuf::from("./plugins")
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            plugin_dir: default_plugin_dir(),
        }
    }
}

impl BridgeConfig {
    /// Create a config pointing at `plugin_dir`
    pub fn new(plugin_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
        }
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}
