//! Mapping-application engine
//!
//! Applies an effective [`Mapping`] to stylesheet text with one of two
//! interchangeable strategies:
//!
//! - [`Strategy::Ast`] parses the stylesheet and rewrites custom-property
//!   declaration values structurally ([`structural`]).
//! - [`Strategy::Regex`] runs three ordered text substitution passes
//!   ([`textual`]).
//!
//! Both return the rewritten text, the set of variables the rewrite
//! introduced, and any diagnostics. Nothing here performs I/O.
//!
//! # Example
//!
//! ```
//! use themeshift::mapping::Mapping;
//! use themeshift::rewrite::{rewrite, Strategy};
//!
//! let mut mapping = Mapping::new();
//! mapping.insert("--bs-primary".to_string(), "--theme-primary".to_string());
//!
//! let out = rewrite(":root{--bs-primary:#0d6efd;}", &mapping, Strategy::Regex);
//! assert!(out.text.contains("--bs-primary: var(--theme-primary);"));
//! assert!(out.target_variables.contains("--theme-primary"));
//! ```

pub mod adapter;
pub mod nodes;
pub mod structural;
pub mod textual;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::mapping::Mapping;

pub use structural::rewrite_structural;
pub use textual::rewrite_textual;

/// Which rewrite algorithm to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Parse and rewrite declaration values structurally
    #[default]
    Ast,
    /// Substitute on the raw text
    Regex,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Ast => "ast",
            Strategy::Regex => "regex",
        }
    }

    /// Parse a user-supplied selector. Unknown selectors fall back to
    /// [`Strategy::Ast`] with a warning diagnostic.
    pub fn from_selector(selector: &str) -> (Strategy, Option<Diagnostic>) {
        match selector.parse() {
            Ok(strategy) => (strategy, None),
            Err(UnknownStrategy(name)) => (
                Strategy::Ast,
                Some(Diagnostic::new(
                    DiagnosticKind::UnknownStrategy,
                    name,
                    "unknown strategy (expected 'ast' or 'regex'); using 'ast'",
                )),
            ),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selector that is neither `ast` nor `regex`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy '{0}'")]
pub struct UnknownStrategy(pub String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ast" => Ok(Strategy::Ast),
            "regex" => Ok(Strategy::Regex),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

/// Result of one rewrite call
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteOutput {
    pub text: String,
    /// Variables the rewrite wrote into `text` as `var(...)`
    pub target_variables: BTreeSet<String>,
    pub diagnostics: Vec<Diagnostic>,
    /// Strategy whose output `text` is (differs from the requested one
    /// after a structural fallback)
    pub strategy: Strategy,
}

impl RewriteOutput {
    pub fn empty(strategy: Strategy) -> Self {
        Self {
            text: String::new(),
            target_variables: BTreeSet::new(),
            diagnostics: Vec::new(),
            strategy,
        }
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_warning)
    }
}

/// Rewrite stylesheet text with the given strategy.
///
/// Empty or whitespace-only input returns an empty result without running
/// either strategy.
pub fn rewrite(text: &str, mapping: &Mapping, strategy: Strategy) -> RewriteOutput {
    if text.trim().is_empty() {
        return RewriteOutput::empty(strategy);
    }
    match strategy {
        Strategy::Ast => rewrite_structural(text, mapping),
        Strategy::Regex => rewrite_textual(text, mapping),
    }
}

/// Rewrite with a strategy named by the user (`"ast"` or `"regex"`).
pub fn rewrite_with_selector(text: &str, mapping: &Mapping, selector: &str) -> RewriteOutput {
    let (strategy, warning) = Strategy::from_selector(selector);
    let mut output = rewrite(text, mapping, strategy);
    if let Some(warning) = warning {
        output.diagnostics.insert(0, warning);
    }
    output
}

/// Apply several mappings one after another, e.g. an alias mapping followed
/// by a theme mapping.
///
/// Targets of all passes are merged, keeping only those still present in the
/// final text. Diagnostics are concatenated in pass order.
pub fn rewrite_passes(text: &str, passes: &[Mapping], strategy: Strategy) -> RewriteOutput {
    let mut output = RewriteOutput {
        text: text.to_string(),
        target_variables: BTreeSet::new(),
        diagnostics: Vec::new(),
        strategy,
    };

    for mapping in passes {
        let pass = rewrite(&output.text, mapping, strategy);
        output.text = pass.text;
        output.target_variables.extend(pass.target_variables);
        output.diagnostics.extend(pass.diagnostics);
        output.strategy = pass.strategy;
    }

    let text = &output.text;
    output.target_variables.retain(|name| text.contains(&format!("var({})", name)));
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_mapping(entries: &[(&str, &str)]) -> Mapping {
        entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("ast".parse::<Strategy>().unwrap(), Strategy::Ast);
        assert_eq!(" REGEX ".parse::<Strategy>().unwrap(), Strategy::Regex);
        assert_eq!(
            "postcss".parse::<Strategy>().unwrap_err(),
            UnknownStrategy("postcss".to_string())
        );
        assert_eq!(Strategy::default(), Strategy::Ast);
        assert_eq!(Strategy::Regex.to_string(), "regex");
    }

    #[test]
    fn test_unknown_selector_warns_and_uses_ast() {
        let mapping = make_mapping(&[("--bs-a", "--t-a")]);
        let out = rewrite_with_selector(":root{--bs-a:1}", &mapping, "fancy");

        assert_eq!(out.strategy, Strategy::Ast);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::UnknownStrategy);
        assert_eq!(out.diagnostics[0].subject, "fancy");
        assert!(out.text.contains("--bs-a: var(--t-a)"), "{}", out.text);
    }

    #[test]
    fn test_blank_input_short_circuits() {
        let mapping = make_mapping(&[("--bs-a", "--t-a")]);
        for strategy in [Strategy::Ast, Strategy::Regex] {
            for input in ["", "   \n\t"] {
                let out = rewrite(input, &mapping, strategy);
                assert_eq!(out, RewriteOutput::empty(strategy));
            }
        }
    }

    #[test]
    fn test_passes_chain_aliases_then_theme() {
        let aliases = make_mapping(&[("--bs-link-color", "var(--bs-primary)")]);
        let theme = make_mapping(&[("--bs-primary", "--theme-primary")]);
        let css = ":root{--bs-link-color:#0d6efd;}a{color:var(--bs-link-color)}";

        let out = rewrite_passes(css, &[aliases, theme], Strategy::Regex);
        assert_eq!(
            out.text,
            ":root{--bs-link-color: var(--theme-primary);}a{color:var(--theme-primary)}"
        );
        let targets: Vec<_> = out.target_variables.iter().map(String::as_str).collect();
        assert_eq!(targets, vec!["--theme-primary"]);
    }
}
