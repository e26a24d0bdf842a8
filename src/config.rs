//! Config file discovery.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub use vs_core::config::*;

/// Locations searched, in order, when no config path is given.
const DEFAULT_PATHS: &[&str] = &["./vidshrink.toml", "~/.config/vidshrink/config.toml"];

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config = Config::from_toml(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    for warning in config.validate() {
        tracing::warn!("{warning}");
    }

    Ok(config)
}

/// Load config from an explicit path, the default locations, or defaults.
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    match custom_path.map(Path::to_path_buf).or_else(find_default_config) {
        Some(path) => {
            tracing::debug!("using config {}", path.display());
            load_config(&path)
        }
        None => Ok(Config::default()),
    }
}

/// First default config location that exists.
pub fn find_default_config() -> Option<PathBuf> {
    DEFAULT_PATHS
        .iter()
        .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
        .find(|p| p.exists())
}
