//! Textual ("regex") rewrite strategy
//!
//! Three passes over the raw stylesheet text, always in this order:
//!
//! 1. literal values (`#0d6efd` -> `var(--theme-primary)`)
//! 2. `var()` usages (`var(--bs-primary)` -> `var(--theme-primary)`)
//! 3. custom-property declaration values (`--bs-primary: ...;`)
//!
//! Literals go first so a hex code that appears both inline in a rule and
//! as the value of a mapped declaration is handled by each applicable rule.
//! Every pass takes the text and the target set and hands both back.

use regex::{NoExpand, Regex};
use std::collections::BTreeSet;

use super::{RewriteOutput, Strategy};
use crate::mapping::{is_variable_name, split_entries, Mapping};
use crate::variables::reference_target;

type PassResult = (String, BTreeSet<String>);

/// Rewrite `text` with all three passes.
///
/// # Example
///
/// ```
/// use themeshift::mapping::Mapping;
/// use themeshift::rewrite::textual::rewrite_textual;
///
/// let mut mapping = Mapping::new();
/// mapping.insert("#0d6efd".to_string(), "--theme-primary".to_string());
///
/// let out = rewrite_textual(".x{background-color:#0d6efd;}", &mapping);
/// assert_eq!(out.text, ".x{background-color:var(--theme-primary);}");
/// assert!(out.target_variables.contains("--theme-primary"));
/// ```
pub fn rewrite_textual(text: &str, mapping: &Mapping) -> RewriteOutput {
    let entries = split_entries(mapping);

    let (text, targets) = substitute_literals(text.to_string(), &entries.literals, BTreeSet::new());
    let (text, targets) = substitute_usages(text, &entries.variables, targets);
    let (text, mut targets) = substitute_declarations(text, &entries.variables, targets);

    // A later pass may have overwritten a value an earlier pass introduced
    targets.retain(|name| text.contains(&var_call(name)));

    RewriteOutput {
        text,
        target_variables: targets,
        diagnostics: Vec::new(),
        strategy: Strategy::Regex,
    }
}

/// Pass 1: replace literal keys that are not glued to letters or digits.
pub fn substitute_literals(
    text: String,
    literals: &[(&str, &str)],
    mut targets: BTreeSet<String>,
) -> PassResult {
    let mut text = text;
    for (key, value) in literals {
        let Ok(pattern) = Regex::new(&regex::escape(key)) else {
            continue;
        };
        let replacement = replacement_text(value);
        let (rewritten, count) = replace_bounded(&text, &pattern, &replacement);
        if count > 0 {
            text = rewritten;
            record_target(value, &mut targets);
        }
    }
    (text, targets)
}

/// Pass 2: replace `var(key)` usages, ignoring case and inner whitespace.
pub fn substitute_usages(
    text: String,
    variables: &[(&str, &str)],
    mut targets: BTreeSet<String>,
) -> PassResult {
    let mut text = text;
    for (key, value) in variables {
        let Ok(pattern) = Regex::new(&format!(r"(?i)var\(\s*{}\s*\)", regex::escape(key))) else {
            continue;
        };
        if !pattern.is_match(&text) {
            continue;
        }
        let replacement = replacement_text(value);
        text = pattern.replace_all(&text, NoExpand(&replacement)).into_owned();
        record_target(value, &mut targets);
    }
    (text, targets)
}

/// Pass 3: rewrite the value of `key: value;` / `key: value}` declarations,
/// keeping the terminator and any `!important`.
pub fn substitute_declarations(
    text: String,
    variables: &[(&str, &str)],
    mut targets: BTreeSet<String>,
) -> PassResult {
    let mut text = text;
    for (key, value) in variables {
        let Ok(pattern) =
            Regex::new(&format!(r"{}\s*:\s*([^;{{}}]*?)\s*([;}}])", regex::escape(key)))
        else {
            continue;
        };
        let replacement = replacement_text(value);

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut pos = 0;
        let mut count = 0;
        while let Some(caps) = pattern.captures_at(&text, pos) {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            if !is_name_boundary(text[..whole.start].chars().next_back()) {
                pos = whole.start + next_char_len(&text[whole.start..]);
                continue;
            }
            let (_, important) = split_important(&caps[1]);
            out.push_str(&text[last..whole.start]);
            out.push_str(key);
            out.push_str(": ");
            out.push_str(&replacement);
            out.push_str(important);
            out.push_str(&caps[2]);
            last = whole.end;
            pos = whole.end;
            count += 1;
        }
        if count > 0 {
            out.push_str(&text[last..]);
            text = out;
            record_target(value, &mut targets);
        }
    }
    (text, targets)
}

/// `var(value)` when the mapped value is a variable name, else the value.
fn replacement_text(value: &str) -> String {
    if is_variable_name(value) {
        var_call(value.trim())
    } else {
        value.to_string()
    }
}

/// A bare variable name or a whole-value `var()` both introduce a target.
fn record_target(value: &str, targets: &mut BTreeSet<String>) {
    if is_variable_name(value) {
        targets.insert(value.trim().to_string());
    } else if let Some(name) = reference_target(value) {
        targets.insert(name);
    }
}

fn var_call(name: &str) -> String {
    format!("var({})", name)
}

/// Replace matches of `pattern` that have no ASCII letter or digit directly
/// before or after them. Returns the new text and the number of replacements.
fn replace_bounded(text: &str, pattern: &Regex, replacement: &str) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut pos = 0;
    let mut count = 0;

    while let Some(m) = pattern.find_at(text, pos) {
        if m.start() == m.end() {
            break;
        }
        let before = text[..m.start()].chars().next_back();
        let after = text[m.end()..].chars().next();
        if is_literal_boundary(before) && is_literal_boundary(after) {
            out.push_str(&text[last..m.start()]);
            out.push_str(replacement);
            last = m.end();
            pos = m.end();
            count += 1;
        } else {
            // An overlapping match may still start inside this one
            pos = m.start() + next_char_len(&text[m.start()..]);
        }
    }

    out.push_str(&text[last..]);
    (out, count)
}

fn is_literal_boundary(c: Option<char>) -> bool {
    !c.is_some_and(|c| c.is_ascii_alphanumeric())
}

fn is_name_boundary(c: Option<char>) -> bool {
    !c.is_some_and(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn next_char_len(s: &str) -> usize {
    s.chars().next().map_or(1, char::len_utf8)
}

/// Split `value !important` into the value and the ` !important` suffix.
fn split_important(value: &str) -> (&str, &'static str) {
    let trimmed = value.trim_end();
    if let Some(bang) = trimmed.rfind('!') {
        let flag = trimmed[bang + 1..].trim();
        if flag.eq_ignore_ascii_case("important") {
            return (trimmed[..bang].trim_end(), " !important");
        }
    }
    (trimmed, "")
}
