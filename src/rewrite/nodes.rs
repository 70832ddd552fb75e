//! Value nodes synthesized for structural replacements
//!
//! A small closed representation of the value shapes the structural rewriter
//! writes into a custom-property declaration. It knows nothing about the CSS
//! parser; [`super::adapter`] lowers it into parser tokens.

use crate::classify::{classify, ClassifiedValue};
use crate::mapping::is_variable_name;

/// One piece of a synthesized declaration value
#[derive(Debug, Clone, PartialEq)]
pub enum ValueNode {
    /// `var(<name>)`
    Var(String),
    Dimension { value: f32, unit: String },
    Number(f32),
    /// Separator between list items, printed as `, `
    Comma,
    /// Hex digits without the `#`
    HexColor(String),
    RgbaColor { r: u8, g: u8, b: u8, a: f64 },
    Ident(String),
    /// Text emitted exactly as written
    Raw(String),
}

/// Nodes that replace a declaration value, plus the variable they introduce.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesized {
    pub nodes: Vec<ValueNode>,
    /// Set when the value is a `var()` reference
    pub target: Option<String>,
}

/// Turn a mapping replacement into value nodes.
///
/// # Example
///
/// ```
/// use themeshift::rewrite::nodes::{synthesize, ValueNode};
///
/// let s = synthesize("--theme-primary");
/// assert_eq!(s.nodes, vec![ValueNode::Var("--theme-primary".to_string())]);
/// assert_eq!(s.target.as_deref(), Some("--theme-primary"));
///
/// let s = synthesize("1, 2");
/// assert_eq!(s.nodes, vec![ValueNode::Number(1.0), ValueNode::Comma, ValueNode::Number(2.0)]);
/// assert!(s.target.is_none());
/// ```
pub fn synthesize(replacement: &str) -> Synthesized {
    if is_variable_name(replacement) {
        let name = replacement.trim().to_string();
        return Synthesized { nodes: vec![ValueNode::Var(name.clone())], target: Some(name) };
    }
    from_classified(classify(replacement))
}

/// Nodes for an already classified value.
pub fn from_classified(value: ClassifiedValue) -> Synthesized {
    let nodes = match value {
        ClassifiedValue::VariableReference(name) => {
            return Synthesized { nodes: vec![ValueNode::Var(name.clone())], target: Some(name) };
        }
        ClassifiedValue::Dimension { value, unit } if !prints_exactly(value) => {
            vec![ValueNode::Raw(format!("{}{}", value, unit))]
        }
        ClassifiedValue::Dimension { value, unit } => {
            vec![ValueNode::Dimension { value: value as f32, unit }]
        }
        ClassifiedValue::PlainNumber(value) if !prints_exactly(value) => {
            vec![ValueNode::Raw(value.to_string())]
        }
        ClassifiedValue::PlainNumber(value) => vec![ValueNode::Number(value as f32)],
        ClassifiedValue::NumberList(values) if !values.iter().all(|v| prints_exactly(*v)) => {
            let items: Vec<String> = values.iter().map(f64::to_string).collect();
            vec![ValueNode::Raw(items.join(", "))]
        }
        ClassifiedValue::NumberList(values) => {
            let mut nodes = Vec::with_capacity(values.len() * 2);
            for (i, value) in values.into_iter().enumerate() {
                if i > 0 {
                    nodes.push(ValueNode::Comma);
                }
                nodes.push(ValueNode::Number(value as f32));
            }
            nodes
        }
        ClassifiedValue::HexColor(code) => vec![ValueNode::HexColor(code)],
        ClassifiedValue::RgbaColor { r, g, b, a } => vec![ValueNode::RgbaColor { r, g, b, a }],
        ClassifiedValue::Keyword(name) => vec![ValueNode::Ident(name)],
        ClassifiedValue::Opaque(raw) => vec![ValueNode::Raw(raw)],
    };
    Synthesized { nodes, target: None }
}

/// Whether a number survives the serializer unchanged: it is stored as
/// `f32` and printed with at most six significant digits.
fn prints_exactly(value: f64) -> bool {
    let narrowed = (value as f32).to_string();
    if narrowed.parse::<f64>() != Ok(value) {
        return false;
    }
    let digits: String = narrowed.chars().filter(char::is_ascii_digit).collect();
    digits.trim_start_matches('0').trim_end_matches('0').len() <= 6
}

/// Plain-text rendering of nodes, close to what the serializer prints.
pub fn render(nodes: &[ValueNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            ValueNode::Var(name) => {
                out.push_str("var(");
                out.push_str(name);
                out.push(')');
            }
            ValueNode::Dimension { value, unit } => {
                out.push_str(&value.to_string());
                out.push_str(unit);
            }
            ValueNode::Number(value) => out.push_str(&value.to_string()),
            ValueNode::Comma => out.push_str(", "),
            ValueNode::HexColor(code) => {
                out.push('#');
                out.push_str(code);
            }
            ValueNode::RgbaColor { r, g, b, a } => {
                out.push_str(&format!("rgba({}, {}, {}, {})", r, g, b, a));
            }
            ValueNode::Ident(name) | ValueNode::Raw(name) => out.push_str(name),
        }
    }
    out
}
