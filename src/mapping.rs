//! Mapping tables and their merge rules
//!
//! A mapping key is either a custom-property name (`--bs-primary`) or any
//! literal text (`#0d6efd`); the value is the replacement string exactly as it
//! was typed into the configuration file.
//!
//! # Example
//!
//! ```
//! use themeshift::mapping::{resolve, Mapping};
//!
//! let mut base = Mapping::new();
//! base.insert("--bs-primary".to_string(), "--theme-primary".to_string());
//! base.insert("--bs-body-bg".to_string(), "#fff".to_string());
//!
//! let mut overrides = Mapping::new();
//! overrides.insert("--bs-body-bg".to_string(), "--theme-surface".to_string());
//!
//! let merged = resolve(Some(&base), Some(&overrides));
//! assert_eq!(merged["--bs-body-bg"], "--theme-surface");
//! assert_eq!(merged["--bs-primary"], "--theme-primary");
//! ```

use std::collections::BTreeMap;

/// Prefix that marks a custom property (and a variable-valued replacement)
pub const VARIABLE_PREFIX: &str = "--";

/// Effective key -> replacement table.
///
/// Sorted so that every pass over it happens in the same order, which keeps
/// rewrite output byte-identical between runs.
pub type Mapping = BTreeMap<String, String>;

/// Merge a base mapping with overrides. Keys present in both take the
/// override value; everything else passes through. Missing inputs count as
/// empty.
pub fn resolve(base: Option<&Mapping>, overrides: Option<&Mapping>) -> Mapping {
    let mut merged = base.cloned().unwrap_or_default();
    if let Some(overrides) = overrides {
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// True when `s` names a custom property.
pub fn is_variable_name(s: &str) -> bool {
    s.trim_start().starts_with(VARIABLE_PREFIX)
}

/// Mapping entries split by key kind, borrowed from the mapping.
#[derive(Debug, Default)]
pub struct SplitEntries<'a> {
    /// Keys that are plain text (hex codes, keywords, ...)
    pub literals: Vec<(&'a str, &'a str)>,
    /// Keys that are custom-property names
    pub variables: Vec<(&'a str, &'a str)>,
}

/// Split a mapping into literal-keyed and variable-keyed entries, keeping
/// the mapping's order inside each group.
pub fn split_entries(mapping: &Mapping) -> SplitEntries<'_> {
    let mut split = SplitEntries::default();
    for (key, value) in mapping {
        if key.is_empty() {
            continue;
        }
        if is_variable_name(key) {
            split.variables.push((key.as_str(), value.as_str()));
        } else {
            split.literals.push((key.as_str(), value.as_str()));
        }
    }
    split
}
