//! Custom-property alias extraction
//!
//! Scans a stylesheet for declarations under a name prefix, resolves their
//! `var()` chains to literal values, and derives which properties are aliases
//! of one another:
//!
//! - **explicit**: the declared value is itself a `var(...)` reference and is
//!   kept verbatim
//! - **derived**: several properties resolve to the same literal, so all but
//!   the canonical one (shortest name, then lexical order) alias to it
//!
//! The resolved table is a ready-made default mapping; the alias table is
//! meant to run as a first rewrite pass before a theme mapping.
//!
//! # Example
//!
//! ```
//! use themeshift::alias::extract;
//!
//! let css = ":root{--bs-blue:#0d6efd;--bs-primary:var(--bs-blue);--bs-link:#0d6efd}";
//! let extraction = extract(css, "--bs-");
//!
//! assert_eq!(extraction.resolved["--bs-primary"], "#0d6efd");
//! assert_eq!(extraction.aliases["--bs-primary"], "var(--bs-blue)");
//! assert_eq!(extraction.aliases["--bs-link"], "var(--bs-blue)");
//! assert!(!extraction.aliases.contains_key("--bs-blue"));
//! ```

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::mapping::Mapping;
use crate::variables::{is_reference, VariableError, VariableRegistry};

/// Prefix scanned when none is given
pub const DEFAULT_PREFIX: &str = "--bs-";

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid comment regex"));

/// One scanned declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDeclarationEntry {
    /// Value as written in the stylesheet
    pub original_value: String,
    /// Literal reached by following references, or the `var(...)` text where
    /// resolution stopped
    pub resolved_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_name: Option<String>,
}

/// Options for [`extract_with`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub prefix: String,
    /// Replaces `prefix` to form each entry's `theme_name`
    pub theme_prefix: Option<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self { prefix: DEFAULT_PREFIX.to_string(), theme_prefix: None }
    }
}

/// Everything one extraction produces
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub entries: BTreeMap<String, VariableDeclarationEntry>,
    /// Property -> resolved value, for every scanned property
    pub resolved: Mapping,
    /// Property -> `var(...)` alias
    pub aliases: Mapping,
    pub diagnostics: Vec<Diagnostic>,
}

impl Extraction {
    /// Property -> theme name, for entries that have one
    pub fn theme_mapping(&self) -> Mapping {
        self.entries
            .iter()
            .filter_map(|(name, entry)| Some((name.clone(), entry.theme_name.clone()?)))
            .collect()
    }
}

/// Extract with the given prefix and no theme prefix.
pub fn extract(text: &str, prefix: &str) -> Extraction {
    extract_with(text, &ExtractOptions { prefix: prefix.to_string(), theme_prefix: None })
}

/// Scan, resolve, then derive aliases.
pub fn extract_with(text: &str, options: &ExtractOptions) -> Extraction {
    let mut diagnostics = Vec::new();
    let registry = scan_declarations(text, &options.prefix, &mut diagnostics);

    let mut entries = BTreeMap::new();
    let mut resolved = Mapping::new();
    for (name, original) in registry.iter() {
        let Some(chain) = registry.resolve_chain(name) else {
            continue;
        };
        if let Some(error) = &chain.error {
            diagnostics.push(chain_diagnostic(name, error));
        }
        let theme_name = options
            .theme_prefix
            .as_deref()
            .map(|theme| format!("{}{}", theme, &name[options.prefix.len()..]));

        resolved.insert(name.clone(), chain.value.clone());
        entries.insert(
            name.clone(),
            VariableDeclarationEntry {
                original_value: original.clone(),
                resolved_value: chain.value,
                theme_name,
            },
        );
    }

    let aliases = derive_aliases(&entries);
    Extraction { entries, resolved, aliases, diagnostics }
}

/// Record every `prefix...: value` declaration. The first declaration of a
/// name wins.
fn scan_declarations(text: &str, prefix: &str, diagnostics: &mut Vec<Diagnostic>) -> VariableRegistry {
    let mut registry = VariableRegistry::new();
    if prefix.is_empty() {
        return registry;
    }
    let Ok(declaration) =
        Regex::new(&format!(r"({}[A-Za-z0-9_-]*)\s*:\s*([^;{{}}]*)", regex::escape(prefix)))
    else {
        return registry;
    };

    let text = COMMENT.replace_all(text, "");
    for caps in declaration.captures_iter(&text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let before = text[..whole.start()].chars().next_back();
        if before.is_some_and(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            continue;
        }

        let name = &caps[1];
        let value = caps[2].trim();
        if registry.contains(name) {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::Redeclared,
                name,
                format!("declared again as '{}'; keeping the first value", value),
            ));
            continue;
        }
        registry.define(name, value);
    }
    registry
}

fn chain_diagnostic(name: &str, error: &VariableError) -> Diagnostic {
    let kind = match error {
        VariableError::Circular(_) => DiagnosticKind::CyclicReference,
        VariableError::MaxDepthExceeded(_) => DiagnosticKind::DepthExceeded,
    };
    Diagnostic::new(kind, name, error.to_string())
}

/// Explicit aliases first, then derived ones for properties that share a
/// resolved literal. Derived aliases never replace explicit ones.
pub fn derive_aliases(entries: &BTreeMap<String, VariableDeclarationEntry>) -> Mapping {
    let mut aliases = Mapping::new();
    for (name, entry) in entries {
        if is_reference(&entry.original_value) {
            aliases.insert(name.clone(), entry.original_value.clone());
        }
    }

    let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (name, entry) in entries {
        let value = entry.resolved_value.as_str();
        if value.is_empty() || value.starts_with("var(") {
            continue;
        }
        groups.entry(value).or_default().push(name);
    }

    for members in groups.values().filter(|members| members.len() >= 2) {
        let Some(canonical) = canonical_property(members) else {
            continue;
        };
        for member in members.iter().filter(|member| **member != canonical) {
            aliases
                .entry(member.to_string())
                .or_insert_with(|| format!("var({})", canonical));
        }
    }
    aliases
}

/// Shortest name, ties broken lexically.
pub fn canonical_property<'a>(names: &[&'a str]) -> Option<&'a str> {
    names.iter().copied().min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
}
