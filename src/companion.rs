//! Companion stylesheet for migrated output
//!
//! The companion declares every variable a migration introduced, with an
//! empty value, so a theme author has one file to fill in. Migrated outputs
//! import it.

use std::collections::BTreeSet;

/// `:root` block declaring each target variable with an empty value.
///
/// # Example
///
/// ```
/// use std::collections::BTreeSet;
/// use themeshift::companion::placeholder_stylesheet;
///
/// let targets: BTreeSet<String> =
///     ["--theme-surface", "--theme-primary"].iter().map(|s| s.to_string()).collect();
/// assert_eq!(
///     placeholder_stylesheet(&targets),
///     ":root {\n  --theme-primary: ;\n  --theme-surface: ;\n}\n"
/// );
/// ```
pub fn placeholder_stylesheet(targets: &BTreeSet<String>) -> String {
    let mut css = String::from(":root {\n");
    for name in targets {
        css.push_str("  ");
        css.push_str(name);
        css.push_str(": ;\n");
    }
    css.push_str("}\n");
    css
}

/// Prepend `@import "name";` unless the stylesheet already has it.
pub fn with_import(css: &str, companion_name: &str) -> String {
    let statement = import_statement(companion_name);
    if css.lines().any(|line| line.trim() == statement) {
        return css.to_string();
    }
    format!("{}\n{}", statement, css)
}

fn import_statement(companion_name: &str) -> String {
    format!("@import \"{}\";", companion_name)
}
