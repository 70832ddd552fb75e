//! Integration tests for the mapping-application engine
//!
//! Runs both strategies over realistic stylesheets and checks the contract
//! every result must honour: target variables appear in the output as
//! `var(...)`, blank input short-circuits, repeated runs are stable.

use themeshift::diagnostics::DiagnosticKind;
use themeshift::mapping::{resolve, Mapping};
use themeshift::rewrite::{rewrite, rewrite_passes, rewrite_with_selector, RewriteOutput, Strategy};

const STRATEGIES: [Strategy; 2] = [Strategy::Ast, Strategy::Regex];

fn make_mapping(entries: &[(&str, &str)]) -> Mapping {
    entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn bootstrap_like() -> &'static str {
    r#"
:root {
  --bs-blue: #0d6efd;
  --bs-primary: #0d6efd;
  --bs-primary-rgb: 13, 110, 253;
  --bs-body-font-family: system-ui, -apple-system, "Segoe UI", sans-serif;
  --bs-border-radius: 0.375rem;
  --bs-link-color: var(--bs-primary);
}

@media (prefers-color-scheme: dark) {
  :root {
    --bs-primary: #6ea8fe;
  }
}

.btn-primary {
  color: #fff;
  background-color: var(--bs-primary);
  border-radius: var(--bs-border-radius);
}
"#
}

fn theme_mapping() -> Mapping {
    make_mapping(&[
        ("--bs-primary", "--theme-primary"),
        ("--bs-primary-rgb", "10, 20, 30"),
        ("--bs-border-radius", "4px"),
        ("--bs-body-font-family", "Inter, sans-serif"),
        ("#fff", "--theme-on-primary"),
    ])
}

fn assert_targets_present(out: &RewriteOutput) {
    for name in &out.target_variables {
        assert!(
            out.text.contains(&format!("var({})", name)),
            "target {} missing from output:\n{}",
            name,
            out.text
        );
    }
}

// ========== Scenarios ==========

#[test]
fn test_declaration_rewritten_to_variable_regex() {
    let mapping = make_mapping(&[("--bs-primary", "--theme-primary")]);
    let out = rewrite(":root{--bs-primary:#0d6efd;}", &mapping, Strategy::Regex);

    assert!(out.text.contains("--bs-primary: var(--theme-primary);"), "{}", out.text);
    assert!(out.target_variables.contains("--theme-primary"));
}

#[test]
fn test_number_list_written_as_tokens_ast() {
    let mapping = make_mapping(&[("--bs-test", "10, 20, 30")]);
    let out = rewrite(":root{--bs-test:7;}", &mapping, Strategy::Ast);

    assert_eq!(out.strategy, Strategy::Ast);
    assert_eq!(out.text, ":root{--bs-test: 10, 20, 30;}");
    assert!(out.target_variables.is_empty());
}

#[test]
fn test_ast_leaves_unmapped_text_byte_identical() {
    let mapping = make_mapping(&[("--bs-primary", "--theme-primary")]);
    let css = "/*! banner */\n/* keep */.a{color:#ff0000;margin:0px 0px 0px 0px}\
               :root{--bs-primary:#0d6efd;--bs-danger:#ff0000;--bs-gap:0.50rem}";
    let out = rewrite(css, &mapping, Strategy::Ast);

    assert_eq!(out.strategy, Strategy::Ast);
    assert_eq!(
        out.text,
        "/*! banner */\n/* keep */.a{color:#ff0000;margin:0px 0px 0px 0px}\
         :root{--bs-primary: var(--theme-primary);--bs-danger:#ff0000;--bs-gap:0.50rem}"
    );
    assert!(out.diagnostics.is_empty());
}

#[test]
fn test_ast_replacement_lands_in_its_own_declaration() {
    let mapping = make_mapping(&[("--bs-font", "Georgia, \"Times New Roman\", serif")]);
    let css = ".q::before{content:\"__themeshift_raw_0__\"}:root{--bs-font:system-ui}";
    let out = rewrite(css, &mapping, Strategy::Ast);

    assert_eq!(
        out.text,
        ".q::before{content:\"__themeshift_raw_0__\"}:root{--bs-font: Georgia, \"Times New Roman\", serif}"
    );
}

#[test]
fn test_ast_wide_integer_keeps_every_digit() {
    let mapping = make_mapping(&[("--bs-z", "16777217")]);
    let out = rewrite(":root{--bs-z:1}", &mapping, Strategy::Ast);
    assert_eq!(out.text, ":root{--bs-z: 16777217}");
}

#[test]
fn test_literal_rewritten_to_variable_regex() {
    let mapping = make_mapping(&[("#0d6efd", "--theme-primary")]);
    let out = rewrite(".x{background-color:#0d6efd;}", &mapping, Strategy::Regex);

    assert_eq!(out.text, ".x{background-color:var(--theme-primary);}");
    assert!(out.target_variables.contains("--theme-primary"));
}

#[test]
fn test_empty_input_either_strategy() {
    let mapping = theme_mapping();
    for strategy in STRATEGIES {
        let out = rewrite("", &mapping, strategy);
        assert_eq!(out.text, "");
        assert!(out.target_variables.is_empty());
    }
}

// ========== Realistic stylesheet ==========

#[test]
fn test_ast_rewrites_custom_properties_everywhere() {
    let out = rewrite(bootstrap_like(), &theme_mapping(), Strategy::Ast);

    assert_eq!(out.strategy, Strategy::Ast);
    assert_eq!(out.text.matches("--bs-primary: var(--theme-primary)").count(), 2, "{}", out.text);
    assert!(out.text.contains("--bs-primary-rgb: 10, 20, 30"), "{}", out.text);
    assert!(out.text.contains("--bs-border-radius: 4px"), "{}", out.text);
    assert!(out.text.contains("--bs-body-font-family: Inter, sans-serif"), "{}", out.text);
    // Usages and literals are left to the textual strategy
    assert!(out.text.contains("var(--bs-primary)"), "{}", out.text);
    assert!(out.diagnostics.iter().any(|d| d.kind == DiagnosticKind::LiteralKeysSkipped));
    assert_targets_present(&out);
}

#[test]
fn test_regex_rewrites_declarations_usages_and_literals() {
    let out = rewrite(bootstrap_like(), &theme_mapping(), Strategy::Regex);

    assert!(out.text.contains("--bs-primary: var(--theme-primary);"), "{}", out.text);
    assert!(out.text.contains("background-color: var(--theme-primary);"), "{}", out.text);
    assert!(out.text.contains("border-radius: 4px;"), "{}", out.text);
    assert!(out.text.contains("color: var(--theme-on-primary);"), "{}", out.text);
    assert!(out.text.contains("--bs-primary-rgb: 10, 20, 30;"), "{}", out.text);
    // Unmapped declarations keep their value
    assert!(out.text.contains("--bs-blue: #0d6efd;"), "{}", out.text);

    let targets: Vec<_> = out.target_variables.iter().map(String::as_str).collect();
    assert_eq!(targets, vec!["--theme-on-primary", "--theme-primary"]);
    assert_targets_present(&out);
}

#[test]
fn test_targets_always_present_in_output() {
    let inputs = [
        bootstrap_like(),
        ".a{color:#fff}",
        ":root{--bs-primary:red}.b{--bs-primary:blue !important}",
        "@supports (display:grid){.c{--bs-border-radius:1px}}",
        "not even css {{{",
    ];
    let mappings = [
        theme_mapping(),
        make_mapping(&[("#fff", "--theme-surface"), ("--bs-primary", "#fff")]),
        make_mapping(&[("--bs-primary", "var(--theme-brand)")]),
        Mapping::new(),
    ];

    for strategy in STRATEGIES {
        for input in inputs {
            for mapping in &mappings {
                let out = rewrite(input, mapping, strategy);
                assert_targets_present(&out);
            }
        }
    }
}

#[test]
fn test_rewrite_is_idempotent_when_no_key_is_a_produced_value() {
    let mapping = make_mapping(&[
        ("--bs-primary", "--theme-primary"),
        ("--bs-border-radius", "4px"),
        ("#fff", "--theme-on-primary"),
    ]);

    for strategy in STRATEGIES {
        let once = rewrite(bootstrap_like(), &mapping, strategy);
        let twice = rewrite(&once.text, &mapping, strategy);
        assert_eq!(twice.text, once.text, "strategy {}", strategy);
    }
}

#[test]
fn test_output_is_deterministic() {
    for strategy in STRATEGIES {
        let first = rewrite(bootstrap_like(), &theme_mapping(), strategy);
        let second = rewrite(bootstrap_like(), &theme_mapping(), strategy);
        assert_eq!(first, second);
    }
}

// ========== Selectors, passes, merged mappings ==========

#[test]
fn test_selector_round_trip() {
    let mapping = theme_mapping();
    let regex = rewrite_with_selector(bootstrap_like(), &mapping, "regex");
    assert_eq!(regex.strategy, Strategy::Regex);
    assert!(regex.diagnostics.is_empty());

    let fallback = rewrite_with_selector(bootstrap_like(), &mapping, "lightning");
    assert_eq!(fallback.strategy, Strategy::Ast);
    assert_eq!(fallback.diagnostics[0].kind, DiagnosticKind::UnknownStrategy);
    assert!(fallback.has_warnings());
}

#[test]
fn test_alias_pass_then_theme_pass() {
    let aliases = make_mapping(&[("--bs-link-color", "var(--bs-primary)")]);
    let theme = make_mapping(&[("--bs-primary", "--theme-primary")]);
    let css = ":root{--bs-primary:#0d6efd;--bs-link-color:#0d6efd}a{color:var(--bs-link-color)}";

    let out = rewrite_passes(css, &[aliases, theme], Strategy::Regex);
    assert_eq!(
        out.text,
        ":root{--bs-primary: var(--theme-primary);--bs-link-color: var(--theme-primary)}a{color:var(--theme-primary)}"
    );
    assert_eq!(out.target_variables.len(), 1);
}

#[test]
fn test_overrides_decide_replacement() {
    let base = make_mapping(&[("--bs-primary", "#0d6efd"), ("--bs-gap", "1rem")]);
    let overrides = make_mapping(&[("--bs-primary", "--theme-primary")]);
    let mapping = resolve(Some(&base), Some(&overrides));

    let out = rewrite(":root{--bs-primary:blue;--bs-gap:2px}", &mapping, Strategy::Regex);
    assert_eq!(out.text, ":root{--bs-primary: var(--theme-primary);--bs-gap: 1rem}");
}
