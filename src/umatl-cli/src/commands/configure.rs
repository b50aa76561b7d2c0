//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up umatl defaults.

use crate::config::Config;
use anyhow::Result;
use std::path::PathBuf;

/// Handle the configure command
pub fn handle(
    asset_root: Option<PathBuf>,
    meta: Option<PathBuf>,
    export_root: Option<PathBuf>,
    show: bool,
) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if !apply(&mut config, asset_root, meta, export_root) {
        show_usage();
        return Ok(());
    }

    config.save()?;
    show_config(&config);
    if let Ok(path) = Config::config_path() {
        println!("Config saved to: {}", path.display());
    }

    Ok(())
}

/// Set any provided values; returns whether anything changed
fn apply(
    config: &mut Config,
    asset_root: Option<PathBuf>,
    meta: Option<PathBuf>,
    export_root: Option<PathBuf>,
) -> bool {
    let changed = asset_root.is_some() || meta.is_some() || export_root.is_some();
    if asset_root.is_some() {
        config.asset_root = asset_root;
    }
    if meta.is_some() {
        config.meta_path = meta;
    }
    if export_root.is_some() {
        config.export_root = export_root;
    }
    changed
}

/// Display current configuration
fn show_config(config: &Config) {
    let show = |label: &str, value: &Option<PathBuf>| match value {
        Some(p) => println!("{label}: {}", p.display()),
        None => println!("{label}: (default)"),
    };
    show("Asset root", &config.asset_root);
    show("Metadata", &config.meta_path);
    show("Export root", &config.export_root);

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

fn show_usage() {
    println!("Usage: umatl configure [--asset-root DIR] [--meta FILE] [--export-root DIR]");
    println!("   or: umatl configure --show");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_only_sets_given_values() {
        let mut config = Config {
            asset_root: Some("/old".into()),
            ..Config::default()
        };
        assert!(apply(&mut config, None, Some("/meta".into()), None));
        assert_eq!(config.asset_root, Some(PathBuf::from("/old")));
        assert_eq!(config.meta_path, Some(PathBuf::from("/meta")));
        assert!(config.export_root.is_none());
    }

    #[test]
    fn test_apply_nothing() {
        let mut config = Config::default();
        assert!(!apply(&mut config, None, None, None));
        assert_eq!(config, Config::default());
    }
}
