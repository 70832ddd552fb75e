//! Structural ("ast") rewrite strategy
//!
//! Parses the stylesheet and replaces the value of every custom-property
//! declaration whose name is a mapping key with nodes synthesized from the
//! mapped replacement. Ordinary declarations are left alone, and literal
//! mapping keys are not applied by this strategy.
//!
//! Any parse or print failure hands the original text to the textual
//! strategy instead; the caller always gets a result.

use std::collections::BTreeSet;

use super::adapter::{DeclarationKind, LightningAdapter, Replacement, StylesheetAdapter};
use super::nodes::synthesize;
use super::textual::rewrite_textual;
use super::{RewriteOutput, Strategy};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::mapping::{split_entries, Mapping};

/// Rewrite with the lightningcss adapter.
pub fn rewrite_structural(text: &str, mapping: &Mapping) -> RewriteOutput {
    rewrite_structural_with(&LightningAdapter, text, mapping)
}

/// Rewrite with any [`StylesheetAdapter`].
pub fn rewrite_structural_with<A>(adapter: &A, text: &str, mapping: &Mapping) -> RewriteOutput
where
    A: StylesheetAdapter + ?Sized,
{
    let transformed = adapter.rewrite_declarations(text, &|decl| plan_replacement(decl, mapping));

    match transformed {
        Ok(transformed) => {
            let target_variables: BTreeSet<String> =
                transformed.applied.into_iter().filter_map(|r| r.target).collect();

            let mut diagnostics = Vec::new();
            let literal_keys = split_entries(mapping).literals;
            if !literal_keys.is_empty() {
                let keys: Vec<&str> = literal_keys.iter().map(|(key, _)| *key).collect();
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::LiteralKeysSkipped,
                    "",
                    format!(
                        "{} literal key(s) not applied by the ast strategy (use --strategy regex): {}",
                        keys.len(),
                        keys.join(", ")
                    ),
                ));
            }

            RewriteOutput {
                text: transformed.css,
                target_variables,
                diagnostics,
                strategy: Strategy::Ast,
            }
        }
        Err(e) => {
            let mut output = rewrite_textual(text, mapping);
            output.diagnostics.insert(
                0,
                Diagnostic::new(
                    DiagnosticKind::StructuralFallback,
                    "",
                    format!("structural rewrite failed ({}); used the regex strategy instead", e),
                ),
            );
            output
        }
    }
}

/// What to write into one declaration, if anything.
pub fn plan_replacement(decl: &DeclarationKind<'_>, mapping: &Mapping) -> Option<Replacement> {
    match decl {
        DeclarationKind::CustomProperty { name } => {
            let replacement = mapping.get(*name)?;
            let synthesized = synthesize(replacement);
            Some(Replacement {
                property: name.to_string(),
                nodes: synthesized.nodes,
                target: synthesized.target,
            })
        }
        DeclarationKind::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::adapter::{Planner, StructuralError, Transformed};
    use crate::rewrite::nodes::ValueNode;

    fn make_mapping(entries: &[(&str, &str)]) -> Mapping {
        entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    struct FailingAdapter;

    impl StylesheetAdapter for FailingAdapter {
        fn rewrite_declarations(&self, _css: &str, _plan: &Planner<'_>) -> Result<Transformed, StructuralError> {
            Err(StructuralError::Parse("unexpected token".to_string()))
        }
    }

    #[test]
    fn test_plan_skips_unmapped_and_ordinary() {
        let mapping = make_mapping(&[("--bs-primary", "--theme-primary")]);

        assert!(plan_replacement(&DeclarationKind::Other, &mapping).is_none());
        assert!(plan_replacement(&DeclarationKind::CustomProperty { name: "--bs-other" }, &mapping)
            .is_none());

        let planned =
            plan_replacement(&DeclarationKind::CustomProperty { name: "--bs-primary" }, &mapping)
                .unwrap();
        assert_eq!(planned.property, "--bs-primary");
        assert_eq!(planned.nodes, vec![ValueNode::Var("--theme-primary".to_string())]);
        assert_eq!(planned.target.as_deref(), Some("--theme-primary"));
    }

    #[test]
    fn test_variable_replacement() {
        let mapping = make_mapping(&[("--bs-primary", "--theme-primary")]);
        let out = rewrite_structural(":root{--bs-primary:#0d6efd;--bs-other:1px}", &mapping);

        assert_eq!(out.strategy, Strategy::Ast);
        assert_eq!(out.text, ":root{--bs-primary: var(--theme-primary);--bs-other:1px}");
        assert_eq!(out.target_variables.into_iter().collect::<Vec<_>>(), vec!["--theme-primary"]);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_number_list_replacement() {
        let mapping = make_mapping(&[("--bs-test", "10, 20, 30")]);
        let out = rewrite_structural(":root{--bs-test:7;}", &mapping);

        assert_eq!(out.text, ":root{--bs-test: 10, 20, 30;}");
        assert!(out.target_variables.is_empty());
    }

    #[test]
    fn test_ordinary_properties_untouched() {
        let mapping = make_mapping(&[("#0d6efd", "--theme-primary"), ("color", "--nope")]);
        let out = rewrite_structural(".x{background-color:#0d6efd}", &mapping);

        assert!(!out.text.contains("var("), "{}", out.text);
        assert!(out.target_variables.is_empty());
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::LiteralKeysSkipped);
    }

    #[test]
    fn test_failure_falls_back_to_textual() {
        let mapping = make_mapping(&[("--bs-primary", "--theme-primary")]);
        let out = rewrite_structural_with(&FailingAdapter, ":root{--bs-primary:#0d6efd;}", &mapping);

        assert_eq!(out.strategy, Strategy::Regex);
        assert_eq!(out.text, ":root{--bs-primary: var(--theme-primary);}");
        assert!(out.target_variables.contains("--theme-primary"));
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::StructuralFallback);
        assert!(out.diagnostics[0].message.contains("unexpected token"));
    }
}
