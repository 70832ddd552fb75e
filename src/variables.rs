//! Custom-property declaration table with `var()` chain resolution
//!
//! This module provides a registry of declared custom properties that supports:
//! - Recording raw declared values (`--name: value`)
//! - Following whole-value `var(--name)` references to a literal
//! - Cycle detection along the followed path
//! - A bounded number of resolution steps
//!
//! Resolution never fails outright: a cyclic or overly long chain stops at the
//! best value reached so far and reports why through [`ChainResolution::error`].
//!
//! # Example
//!
//! ```
//! use themeshift::variables::VariableRegistry;
//!
//! let mut registry = VariableRegistry::new();
//! registry.define("--bs-blue", "#0d6efd");
//! registry.define("--bs-primary", "var(--bs-blue)");
//! registry.define("--bs-link", "var(--bs-primary)");
//!
//! let resolved = registry.resolve_chain("--bs-link").unwrap();
//! assert_eq!(resolved.value, "#0d6efd");
//! assert!(resolved.error.is_none());
//! ```

use std::collections::BTreeMap;
use std::fmt;

/// Why chain resolution stopped before reaching a literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableError {
    /// The chain came back to a property it already followed
    Circular(Vec<String>),
    /// The chain needs more than [`MAX_RESOLUTION_STEPS`] substitutions
    MaxDepthExceeded(Vec<String>),
}

impl fmt::Display for VariableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableError::Circular(chain) => {
                write!(f, "circular dependency: {}", chain.join(" -> "))
            }
            VariableError::MaxDepthExceeded(chain) => {
                write!(
                    f,
                    "gave up after {} references: {}",
                    MAX_RESOLUTION_STEPS,
                    chain.join(" -> ")
                )
            }
        }
    }
}

impl std::error::Error for VariableError {}

/// Maximum number of `var()` substitutions followed for one property
pub const MAX_RESOLUTION_STEPS: usize = 10;

/// Outcome of following one property's reference chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainResolution {
    /// Literal value, or the `var(...)` text where resolution stopped
    pub value: String,
    /// Set when resolution stopped because of a cycle or the step limit
    pub error: Option<VariableError>,
}

/// Registry for declared custom properties
///
/// Stores raw declared values and follows `var()` chains between them.
#[derive(Debug, Clone, Default)]
pub struct VariableRegistry {
    /// Property name -> raw value (may be a var() reference)
    variables: BTreeMap<String, String>,
}

impl VariableRegistry {
    /// Create a new empty variable registry
    pub fn new() -> Self {
        Self { variables: BTreeMap::new() }
    }

    /// Record a declaration, replacing any earlier value
    pub fn define(&mut self, name: &str, value: &str) {
        self.variables.insert(name.trim().to_string(), value.trim().to_string());
    }

    /// Check if a property is declared
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name.trim())
    }

    /// Get the raw (unresolved) value of a property
    pub fn get_raw(&self, name: &str) -> Option<&str> {
        self.variables.get(name.trim()).map(|s| s.as_str())
    }

    /// Get the number of declared properties
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Follow a property's whole-value `var()` references until a literal,
    /// an undeclared reference, a cycle or the step limit.
    ///
    /// Returns `None` if `name` itself is not declared.
    ///
    /// # Example
    ///
    /// ```
    /// use themeshift::variables::{VariableError, VariableRegistry};
    ///
    /// let mut reg = VariableRegistry::new();
    /// reg.define("--a", "var(--b)");
    /// reg.define("--b", "var(--a)");
    /// reg.define("--c", "var(--elsewhere)");
    ///
    /// let a = reg.resolve_chain("--a").unwrap();
    /// assert_eq!(a.value, "var(--b)");
    /// assert!(matches!(a.error, Some(VariableError::Circular(_))));
    ///
    /// // Undeclared targets are a normal end of the chain
    /// let c = reg.resolve_chain("--c").unwrap();
    /// assert_eq!(c.value, "var(--elsewhere)");
    /// assert!(c.error.is_none());
    /// ```
    pub fn resolve_chain(&self, name: &str) -> Option<ChainResolution> {
        let name = name.trim();
        let mut current = self.variables.get(name)?.clone();
        let mut followed: Vec<String> = Vec::new();

        while let Some(next) = reference_target(&current) {
            let Some(next_value) = self.variables.get(&next) else {
                break;
            };

            if followed.contains(&next) {
                let mut chain = vec![name.to_string()];
                chain.extend(followed);
                chain.push(next);
                return Some(ChainResolution {
                    value: current,
                    error: Some(VariableError::Circular(first_lap(chain))),
                });
            }

            if followed.len() >= MAX_RESOLUTION_STEPS {
                let mut chain = vec![name.to_string()];
                chain.extend(followed);
                return Some(ChainResolution {
                    value: current,
                    error: Some(VariableError::MaxDepthExceeded(chain)),
                });
            }

            current = next_value.clone();
            followed.push(next);
        }

        Some(ChainResolution { value: current, error: None })
    }

    /// Iterate over all declarations in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.variables.iter()
    }

    /// Get all declared names in order
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.variables.keys()
    }
}

/// Cut a followed path just after the first name that repeats, so a cycle
/// is reported once: `--a -> --b -> --a`.
fn first_lap(path: Vec<String>) -> Vec<String> {
    let mut lap = Vec::with_capacity(path.len());
    for name in path {
        let repeated = lap.contains(&name);
        lap.push(name);
        if repeated {
            break;
        }
    }
    lap
}

/// The property a value refers to when the whole value is one `var()` call.
///
/// `var(--a)` and `var(--a, red)` both yield `--a`; `calc(var(--a) * 2)` and
/// plain literals yield `None`.
pub fn reference_target(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let (start, end, name) = find_var_reference(trimmed)?;
    if start != 0 || end != trimmed.len() || name.is_empty() {
        return None;
    }
    Some(name)
}

/// True when the whole value is a single `var()` reference.
pub fn is_reference(value: &str) -> bool {
    reference_target(value).is_some()
}

/// Find the first var() reference in a string
///
/// Returns (start, end, var_name); any fallback after the first comma is skipped
fn find_var_reference(s: &str) -> Option<(usize, usize, String)> {
    let start = s.find("var(")?;

    // Find matching closing paren, handling nested parens
    let rest = &s[start + 4..];
    let mut paren_depth = 1;
    let mut end_offset = 0;
    let mut comma_pos: Option<usize> = None;

    for (i, c) in rest.char_indices() {
        match c {
            '(' => paren_depth += 1,
            ')' => {
                paren_depth -= 1;
                if paren_depth == 0 {
                    end_offset = i;
                    break;
                }
            }
            ',' if paren_depth == 1 && comma_pos.is_none() => {
                comma_pos = Some(i);
            }
            _ => {}
        }
    }

    if paren_depth != 0 {
        return None; // Unmatched parentheses
    }

    let content = &rest[..end_offset];
    let end = start + 4 + end_offset + 1; // +1 for closing paren

    let var_name = match comma_pos {
        Some(comma) => &content[..comma],
        None => content,
    };

    Some((start, end, var_name.trim().to_string()))
}
