//! Configuration management for umatl CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use umatl::{ContentType, ExtractConfig};

/// Game data directory relative to the home directory
const GAME_DATA_DIR: &str = "AppData/LocalLow/Cygames/umamusume";

#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub asset_root: Option<PathBuf>,
    pub meta_path: Option<PathBuf>,
    pub export_root: Option<PathBuf>,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("umatl");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file, or default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        Ok(())
    }

    fn game_data_dir() -> PathBuf {
        dirs::home_dir().unwrap_or_default().join(GAME_DATA_DIR)
    }

    /// Asset directory: CLI flag, then config, then the game's `dat` dir
    pub fn resolve_asset_root(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.asset_root.clone())
            .unwrap_or_else(|| Self::game_data_dir().join("dat"))
    }

    /// Metadata file: CLI flag, then config, then the game's `meta` file
    pub fn resolve_meta_path(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.meta_path.clone())
            .unwrap_or_else(|| Self::game_data_dir().join("meta"))
    }

    /// Export root for one content type. A configured root gets the content
    /// type appended; a CLI flag is used as given.
    pub fn resolve_export_root(&self, flag: Option<PathBuf>, content_type: ContentType) -> PathBuf {
        match (flag, &self.export_root) {
            (Some(dst), _) => dst,
            (None, Some(root)) => root.join(content_type.as_str()),
            (None, None) => ExtractConfig::default_export_root(content_type),
        }
    }
}
