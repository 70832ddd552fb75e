//! Classification of mapping-target strings
//!
//! A replacement in a mapping file is just text. Before the structural
//! rewriter can build value nodes for it, the text is sorted into one of a
//! closed set of shapes:
//!
//! - `--theme-primary` / `var(--theme-primary)` -> variable reference
//! - `1.5rem`, `200ms`, `1fr` -> dimension
//! - `7`, `-0.25` -> plain number
//! - `10, 20, 30` -> number list
//! - `#0d6efd` -> hex colour
//! - `rgba(0, 0, 0, 0.5)` -> rgba colour
//! - `none`, `currentColor`, ... -> keyword
//! - anything else (font stacks, `calc()`, gradients) -> opaque text
//!
//! # Example
//!
//! ```
//! use themeshift::classify::{classify, ClassifiedValue};
//!
//! assert_eq!(
//!     classify("var(--theme-primary)"),
//!     ClassifiedValue::VariableReference("--theme-primary".to_string())
//! );
//! assert_eq!(
//!     classify("1.5REM"),
//!     ClassifiedValue::Dimension { value: 1.5, unit: "rem".to_string() }
//! );
//! assert_eq!(classify("10, 20, 30"), ClassifiedValue::NumberList(vec![10.0, 20.0, 30.0]));
//! ```

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::mapping::VARIABLE_PREFIX;

/// Units accepted after a number: length, angle, time, resolution, frequency
/// and flex units.
pub const DIMENSION_UNITS: &[&str] = &[
    // absolute and font-relative lengths
    "px", "cm", "mm", "q", "in", "pt", "pc", "em", "rem", "ex", "rex", "ch", "rch", "cap",
    "rcap", "ic", "ric", "lh", "rlh",
    // viewport lengths
    "vw", "vh", "vi", "vb", "vmin", "vmax", "svw", "svh", "lvw", "lvh", "dvw", "dvh",
    // container lengths
    "cqw", "cqh", "cqi", "cqb", "cqmin", "cqmax",
    // angles
    "deg", "grad", "rad", "turn",
    // time
    "s", "ms",
    // resolution
    "dpi", "dpcm", "dppx", "x",
    // frequency
    "hz", "khz",
    // flex
    "fr",
];

/// CSS-wide and common keywords recognised as identifiers.
pub const KEYWORDS: &[&str] = &[
    "none",
    "inherit",
    "initial",
    "unset",
    "revert",
    "auto",
    "solid",
    "transparent",
    "currentColor",
];

const NUMBER: &str = r"[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?";

static VAR_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^var\(\s*(--[A-Za-z0-9_-]+)\s*\)$").expect("valid var() regex")
});

static BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{NUMBER}$")).expect("valid number regex"));

static DIMENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^({NUMBER})([A-Za-z]+)$")).expect("valid dimension regex")
});

static RGBA_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:rgba)\(\s*([^,()]*),([^,()]*),([^,()]*),([^,()]*)\)$")
        .expect("valid rgba() regex")
});

/// The shape of a replacement string.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedValue {
    /// A custom property to reference through `var()`
    VariableReference(String),
    /// Number with a unit, unit lowercased
    Dimension { value: f64, unit: String },
    PlainNumber(f64),
    /// Comma-separated numbers, e.g. an RGB triplet
    NumberList(Vec<f64>),
    /// Hex colour digits without the leading `#`
    HexColor(String),
    RgbaColor { r: u8, g: u8, b: u8, a: f64 },
    Keyword(String),
    /// Anything else, kept verbatim
    Opaque(String),
}

impl ClassifiedValue {
    /// Short name used by `tshift classify` and in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ClassifiedValue::VariableReference(_) => "variable",
            ClassifiedValue::Dimension { .. } => "dimension",
            ClassifiedValue::PlainNumber(_) => "number",
            ClassifiedValue::NumberList(_) => "number-list",
            ClassifiedValue::HexColor(_) => "hex-color",
            ClassifiedValue::RgbaColor { .. } => "rgba-color",
            ClassifiedValue::Keyword(_) => "keyword",
            ClassifiedValue::Opaque(_) => "opaque",
        }
    }
}

impl fmt::Display for ClassifiedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifiedValue::VariableReference(name) => write!(f, "variable({})", name),
            ClassifiedValue::Dimension { value, unit } => write!(f, "dimension({}{})", value, unit),
            ClassifiedValue::PlainNumber(value) => write!(f, "number({})", value),
            ClassifiedValue::NumberList(values) => {
                let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "number-list({})", items.join(", "))
            }
            ClassifiedValue::HexColor(code) => write!(f, "hex-color(#{})", code),
            ClassifiedValue::RgbaColor { r, g, b, a } => {
                write!(f, "rgba-color({}, {}, {}, {})", r, g, b, a)
            }
            ClassifiedValue::Keyword(name) => write!(f, "keyword({})", name),
            ClassifiedValue::Opaque(raw) => write!(f, "opaque({})", raw),
        }
    }
}

/// Classify a replacement string. First matching rule wins; the order
/// matters because `1e3px`, `10, 20` and `#fff` would all partially match
/// later rules.
pub fn classify(target: &str) -> ClassifiedValue {
    let s = target.trim();

    if s.starts_with(VARIABLE_PREFIX) {
        return ClassifiedValue::VariableReference(s.to_string());
    }

    if s.starts_with("var(") {
        return match VAR_FUNCTION.captures(s) {
            Some(caps) => ClassifiedValue::VariableReference(caps[1].to_string()),
            None => ClassifiedValue::Opaque(s.to_string()),
        };
    }

    if let Some(caps) = DIMENSION.captures(s) {
        let unit = caps[2].to_ascii_lowercase();
        if DIMENSION_UNITS.contains(&unit.as_str()) {
            if let Ok(value) = caps[1].parse::<f64>() {
                return ClassifiedValue::Dimension { value, unit };
            }
        }
    }

    if BARE_NUMBER.is_match(s) {
        if let Ok(value) = s.parse::<f64>() {
            return ClassifiedValue::PlainNumber(value);
        }
    }

    if let Some(code) = s.strip_prefix('#') {
        return ClassifiedValue::HexColor(code.to_string());
    }

    if s.get(..5).is_some_and(|head| head.eq_ignore_ascii_case("rgba(")) {
        return parse_rgba(s).unwrap_or_else(|| ClassifiedValue::Opaque(s.to_string()));
    }

    if s.contains(',') {
        if let Some(values) = parse_number_list(s) {
            return ClassifiedValue::NumberList(values);
        }
    }

    if let Some(keyword) = KEYWORDS.iter().find(|k| k.eq_ignore_ascii_case(s)) {
        return ClassifiedValue::Keyword(keyword.to_string());
    }

    ClassifiedValue::Opaque(s.to_string())
}

fn parse_rgba(s: &str) -> Option<ClassifiedValue> {
    let caps = RGBA_FUNCTION.captures(s)?;
    let r = caps[1].trim().parse::<u8>().ok()?;
    let g = caps[2].trim().parse::<u8>().ok()?;
    let b = caps[3].trim().parse::<u8>().ok()?;
    let alpha = caps[4].trim();
    if !BARE_NUMBER.is_match(alpha) {
        return None;
    }
    let a = alpha.parse::<f64>().ok()?;
    if !(0.0..=1.0).contains(&a) {
        return None;
    }
    Some(ClassifiedValue::RgbaColor { r, g, b, a })
}

fn parse_number_list(s: &str) -> Option<Vec<f64>> {
    s.split(',')
        .map(|segment| {
            let segment = segment.trim();
            if BARE_NUMBER.is_match(segment) {
                segment.parse::<f64>().ok()
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_prefix() {
        assert_eq!(
            classify("--theme-primary"),
            ClassifiedValue::VariableReference("--theme-primary".to_string())
        );
        assert_eq!(
            classify("  --theme-primary  "),
            ClassifiedValue::VariableReference("--theme-primary".to_string())
        );
    }

    #[test]
    fn test_var_function() {
        assert_eq!(
            classify("var( --theme-surface )"),
            ClassifiedValue::VariableReference("--theme-surface".to_string())
        );
        // Fallbacks and garbage are kept as text
        assert_eq!(
            classify("var(--a, red)"),
            ClassifiedValue::Opaque("var(--a, red)".to_string())
        );
        assert_eq!(classify("var(oops"), ClassifiedValue::Opaque("var(oops".to_string()));
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(
            classify("1rem"),
            ClassifiedValue::Dimension { value: 1.0, unit: "rem".to_string() }
        );
        assert_eq!(
            classify("-0.5PX"),
            ClassifiedValue::Dimension { value: -0.5, unit: "px".to_string() }
        );
        assert_eq!(
            classify("250ms"),
            ClassifiedValue::Dimension { value: 250.0, unit: "ms".to_string() }
        );
        assert_eq!(
            classify("1fr"),
            ClassifiedValue::Dimension { value: 1.0, unit: "fr".to_string() }
        );
        assert_eq!(
            classify(".75turn"),
            ClassifiedValue::Dimension { value: 0.75, unit: "turn".to_string() }
        );
    }

    #[test]
    fn test_unknown_unit_is_opaque() {
        assert_eq!(classify("12furlongs"), ClassifiedValue::Opaque("12furlongs".to_string()));
        assert_eq!(classify("50%"), ClassifiedValue::Opaque("50%".to_string()));
    }

    #[test]
    fn test_plain_numbers() {
        assert_eq!(classify("7"), ClassifiedValue::PlainNumber(7.0));
        assert_eq!(classify("+1.25"), ClassifiedValue::PlainNumber(1.25));
        assert_eq!(classify("-.5"), ClassifiedValue::PlainNumber(-0.5));
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(classify("#0d6efd"), ClassifiedValue::HexColor("0d6efd".to_string()));
        // Not validated here; the structural rewriter decides what to do with it
        assert_eq!(classify("#nothex"), ClassifiedValue::HexColor("nothex".to_string()));
    }

    #[test]
    fn test_rgba() {
        assert_eq!(
            classify("rgba(13, 110, 253, 0.25)"),
            ClassifiedValue::RgbaColor { r: 13, g: 110, b: 253, a: 0.25 }
        );
        assert_eq!(
            classify("RGBA(0,0,0,1)"),
            ClassifiedValue::RgbaColor { r: 0, g: 0, b: 0, a: 1.0 }
        );
    }

    #[test]
    fn test_rgba_partial_failure_is_opaque() {
        assert_eq!(
            classify("rgba(300, 0, 0, 0.5)"),
            ClassifiedValue::Opaque("rgba(300, 0, 0, 0.5)".to_string())
        );
        assert_eq!(
            classify("rgba(var(--r), 0, 0, 0.5)"),
            ClassifiedValue::Opaque("rgba(var(--r), 0, 0, 0.5)".to_string())
        );
        assert_eq!(
            classify("rgba(0, 0, 0, 2)"),
            ClassifiedValue::Opaque("rgba(0, 0, 0, 2)".to_string())
        );
    }

    #[test]
    fn test_number_list() {
        assert_eq!(classify("10, 20, 30"), ClassifiedValue::NumberList(vec![10.0, 20.0, 30.0]));
        assert_eq!(classify("13,110,253"), ClassifiedValue::NumberList(vec![13.0, 110.0, 253.0]));
    }

    #[test]
    fn test_mixed_list_is_opaque() {
        assert_eq!(
            classify("Helvetica, Arial, sans-serif"),
            ClassifiedValue::Opaque("Helvetica, Arial, sans-serif".to_string())
        );
        assert_eq!(classify("1, 2px"), ClassifiedValue::Opaque("1, 2px".to_string()));
    }

    #[test]
    fn test_keywords() {
        assert_eq!(classify("none"), ClassifiedValue::Keyword("none".to_string()));
        assert_eq!(classify("CURRENTCOLOR"), ClassifiedValue::Keyword("currentColor".to_string()));
        assert_eq!(classify("Transparent"), ClassifiedValue::Keyword("transparent".to_string()));
    }

    #[test]
    fn test_opaque_fallback() {
        for raw in ["calc(100% - 1rem)", "linear-gradient(red, blue)", "url(a.png)", "bold"] {
            assert_eq!(classify(raw), ClassifiedValue::Opaque(raw.to_string()), "{}", raw);
        }
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(classify("--x").kind_name(), "variable");
        assert_eq!(classify("1px").kind_name(), "dimension");
        assert_eq!(classify("1, 2").kind_name(), "number-list");
        assert_eq!(classify("auto").kind_name(), "keyword");
    }
}
