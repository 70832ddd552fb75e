//! Configuration loading and discovery
//!
//! Finds and loads `themeshift.toml`, applies CLI overrides, and reads
//! mapping files.

use super::schema::{MappingConfig, ThemeshiftConfig};
use crate::mapping::Mapping;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Project configuration file name
pub const CONFIG_FILE_NAME: &str = "themeshift.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// Mapping file could not be read
    #[error("Failed to read mapping file {}: {source}", .path.display())]
    ReadMapping {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// TOML parsing error
    #[error("Failed to parse themeshift.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// JSON / JSON5 syntax error in a mapping file
    #[error("Failed to parse mapping: {0}")]
    Json(#[from] json5::Error),
    /// Mapping file is valid JSON but not a mapping
    #[error("Invalid mapping: {0}")]
    Shape(#[from] serde_json::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override rewrite strategy
    pub strategy: Option<String>,
    /// Replace the configured mapping files
    pub mapping: Option<Vec<PathBuf>>,
    /// Override companion file name
    pub companion: Option<String>,
    /// Override whether outputs import the companion
    pub import: Option<bool>,
    /// Override extraction prefix
    pub prefix: Option<String>,
    /// Override theme prefix
    pub theme_prefix: Option<String>,
}

/// Find themeshift.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for themeshift.toml
/// 2. Check XDG_CONFIG_HOME/themeshift/themeshift.toml (or ~/.config/themeshift/themeshift.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find themeshift.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("themeshift").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find themeshift.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a themeshift.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
pub fn load_config(path: Option<&Path>) -> Result<ThemeshiftConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(default_config()),
    }
}

/// Load configuration from a specific file path.
///
/// Relative mapping paths are resolved against the directory holding the file.
pub fn load_config_file(path: &Path) -> Result<ThemeshiftConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: ThemeshiftConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    if let Some(root) = project_root(path) {
        config.migrate.mapping =
            config.migrate.mapping.iter().map(|p| resolve_path(root, p)).collect();
    }

    Ok(config)
}

/// Configuration used when no themeshift.toml is found.
pub fn default_config() -> ThemeshiftConfig {
    ThemeshiftConfig::default()
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut ThemeshiftConfig, overrides: &CliOverrides) {
    if let Some(ref strategy) = overrides.strategy {
        config.migrate.strategy = strategy.clone();
    }

    if let Some(ref mapping) = overrides.mapping {
        config.migrate.mapping = mapping.clone();
    }

    if let Some(ref companion) = overrides.companion {
        config.migrate.companion = companion.clone();
    }

    if let Some(import) = overrides.import {
        config.migrate.import = import;
    }

    if let Some(ref prefix) = overrides.prefix {
        config.extract.prefix = prefix.clone();
    }

    if let Some(ref theme_prefix) = overrides.theme_prefix {
        config.extract.theme_prefix = Some(theme_prefix.clone());
    }
}

/// Read a mapping file and merge it into its effective table.
pub fn load_mapping_file(path: &Path) -> Result<Mapping, ConfigError> {
    let contents = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadMapping { path: path.to_path_buf(), source })?;
    Ok(parse_mapping_config(&contents)?.effective())
}

/// Parse mapping file contents (JSON or JSON5).
///
/// An object with `defaultMapping` or `overrides` is read as a
/// [`MappingConfig`]; any other object is read as a flat `defaultMapping`.
pub fn parse_mapping_config(contents: &str) -> Result<MappingConfig, ConfigError> {
    let value: serde_json::Value = json5::from_str(contents)?;

    let structured = value
        .as_object()
        .is_some_and(|obj| obj.contains_key("defaultMapping") || obj.contains_key("overrides"));

    if structured {
        Ok(serde_json::from_value(value)?)
    } else {
        let default_mapping: Mapping = serde_json::from_value(value)?;
        Ok(MappingConfig { default_mapping, overrides: Mapping::new() })
    }
}

/// Get the project root directory from a config file path.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
