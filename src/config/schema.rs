//! Configuration schema types
//!
//! Two files are read: mapping files (`MappingConfig`, JSON or JSON5) and the
//! optional `themeshift.toml` project file (`ThemeshiftConfig`).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::alias::DEFAULT_PREFIX;
use crate::mapping::{resolve, Mapping};

/// A mapping file: default entries plus overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MappingConfig {
    #[serde(default)]
    pub default_mapping: Mapping,
    #[serde(default)]
    pub overrides: Mapping,
}

impl MappingConfig {
    /// Merged table the rewrite engine consumes; overrides win.
    pub fn effective(&self) -> Mapping {
        resolve(Some(&self.default_mapping), Some(&self.overrides))
    }
}

/// `[migrate]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrateConfig {
    /// `"ast"` or `"regex"`
    #[serde(default = "default_strategy")]
    pub strategy: String,
    /// Mapping files, applied as successive passes
    #[serde(default)]
    pub mapping: Vec<PathBuf>,
    /// File name of the companion placeholder stylesheet
    #[serde(default = "default_companion")]
    pub companion: String,
    /// Prepend `@import` of the companion to each output
    #[serde(default = "default_true")]
    pub import: bool,
}

fn default_strategy() -> String {
    "ast".to_string()
}

fn default_companion() -> String {
    "theme-variables.css".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            mapping: Vec::new(),
            companion: default_companion(),
            import: true,
        }
    }
}

/// `[extract]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_prefix: Option<String>,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { prefix: default_prefix(), theme_prefix: None }
    }
}

/// Watch mode configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Debounce delay in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u32,
    /// Clear terminal between runs
    #[serde(default)]
    pub clear_screen: bool,
}

fn default_debounce_ms() -> u32 {
    100
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: default_debounce_ms(), clear_screen: false }
    }
}

/// Complete themeshift.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeshiftConfig {
    #[serde(default)]
    pub migrate: MigrateConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "extract.prefix")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "themeshift.toml: '{}' {}", self.field, self.message)
    }
}

impl ThemeshiftConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.migrate.companion.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "migrate.companion".to_string(),
                message: "must be a non-empty file name".to_string(),
            });
        }

        if self.extract.prefix.is_empty() {
            errors.push(ConfigValidationError {
                field: "extract.prefix".to_string(),
                message: "must be a non-empty string".to_string(),
            });
        }

        if self.extract.theme_prefix.as_deref().is_some_and(str::is_empty) {
            errors.push(ConfigValidationError {
                field: "extract.theme_prefix".to_string(),
                message: "must be a non-empty string when set".to_string(),
            });
        }

        if self.watch.debounce_ms == 0 {
            errors.push(ConfigValidationError {
                field: "watch.debounce_ms".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
