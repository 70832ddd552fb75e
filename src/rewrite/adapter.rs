//! lightningcss adapter for the structural rewriter
//!
//! Everything that touches the CSS parser lives here. The rest of the
//! rewriter sees declarations only as [`DeclarationKind`] and writes values
//! only as [`ValueNode`]s.
//!
//! The stylesheet is validated by lightningcss, then walked with the
//! cssparser tokenizer to find each declaration's value span. Only planned
//! values are replaced; every other byte of the source is copied through.

use cssparser::{ParseError, Parser, ParserInput, Token as SourceToken};
use lightningcss::properties::custom::{
    CustomProperty, CustomPropertyName, Function, Token, TokenList, TokenOrValue,
};
use lightningcss::properties::Property;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::values::ident::{DashedIdent, Ident};
use thiserror::Error;

use super::nodes::ValueNode;
use crate::color::{hex_color, rgba_color};

/// Failure inside the structural strategy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum StructuralError {
    /// The stylesheet could not be parsed
    #[error("parse error: {0}")]
    Parse(String),
    /// A replacement value could not be printed
    #[error("serialize error: {0}")]
    Serialize(String),
}

/// The declaration shapes the rewriter distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind<'a> {
    /// `--name: ...`
    CustomProperty { name: &'a str },
    /// Any ordinary property
    Other,
}

/// A planned value replacement for one declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    pub property: String,
    pub nodes: Vec<ValueNode>,
    /// Variable introduced by the new value, if any
    pub target: Option<String>,
}

/// Rewritten stylesheet plus every replacement that was applied, in
/// document order
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub css: String,
    pub applied: Vec<Replacement>,
}

/// Decides, for one declaration, whether and how to replace its value
pub type Planner<'p> = dyn Fn(&DeclarationKind<'_>) -> Option<Replacement> + 'p;

/// Parses a stylesheet and writes planned replacements into its source text.
pub trait StylesheetAdapter {
    fn rewrite_declarations(&self, css: &str, plan: &Planner<'_>) -> Result<Transformed, StructuralError>;
}

/// The lightningcss-backed adapter
#[derive(Debug, Clone, Copy, Default)]
pub struct LightningAdapter;

impl StylesheetAdapter for LightningAdapter {
    fn rewrite_declarations(&self, css: &str, plan: &Planner<'_>) -> Result<Transformed, StructuralError> {
        StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| StructuralError::Parse(e.to_string()))?;

        let mut planned = Vec::new();
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        walk_block(&mut parser, plan, &mut planned)
            .map_err(|e| StructuralError::Parse(format!("{:?}", e.kind)))?;

        splice(css, planned)
    }
}

/// Byte range of a declaration value in the source: from just after the
/// colon to the end of the last value token, before any `!important`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ValueSpan {
    start: usize,
    end: usize,
}

type Planned = Vec<(ValueSpan, Replacement)>;

type WalkResult<'i> = Result<(), ParseError<'i, ()>>;

/// Walk one rule list or declaration block, recursing into nested blocks.
fn walk_block<'i, 't>(parser: &mut Parser<'i, 't>, plan: &Planner<'_>, planned: &mut Planned) -> WalkResult<'i> {
    while let Some(token) = next_token(parser) {
        match token {
            SourceToken::WhiteSpace(_) | SourceToken::Comment(_) | SourceToken::Semicolon => {}
            SourceToken::Ident(name) => match next_significant(parser) {
                Some(SourceToken::Colon) => declaration(parser, &name, plan, planned)?,
                Some(other) => skip_statement(parser, other, plan, planned)?,
                None => break,
            },
            other => skip_statement(parser, other, plan, planned)?,
        }
    }
    Ok(())
}

/// Scan the value after `name:`. An ordinary name followed by a `{}` block
/// turns out to be a rule (`a:hover {...}`) and is walked as one.
fn declaration<'i, 't>(
    parser: &mut Parser<'i, 't>,
    name: &str,
    plan: &Planner<'_>,
    planned: &mut Planned,
) -> WalkResult<'i> {
    let custom = name.starts_with("--");
    let start = parser.position().byte_index();
    let mut end = start;
    let mut bang = false;

    while let Some(token) = next_token(parser) {
        match token {
            SourceToken::Semicolon => break,
            SourceToken::WhiteSpace(_) | SourceToken::Comment(_) => {}
            SourceToken::CurlyBracketBlock if !custom => {
                return parser.parse_nested_block(|nested| walk_block(nested, plan, planned));
            }
            SourceToken::Delim('!') => bang = true,
            SourceToken::Ident(ref word) if bang && word.eq_ignore_ascii_case("important") => {}
            other => {
                if opens_block(&other) {
                    parser.parse_nested_block(exhaust)?;
                }
                bang = false;
                end = parser.position().byte_index();
            }
        }
    }

    let kind = if custom { DeclarationKind::CustomProperty { name } } else { DeclarationKind::Other };
    if let Some(replacement) = plan(&kind) {
        planned.push((ValueSpan { start, end }, replacement));
    }
    Ok(())
}

/// Consume the rest of a statement that is not a declaration.
fn skip_statement<'i, 't>(
    parser: &mut Parser<'i, 't>,
    first: SourceToken<'i>,
    plan: &Planner<'_>,
    planned: &mut Planned,
) -> WalkResult<'i> {
    let mut token = Some(first);
    while let Some(current) = token {
        match current {
            SourceToken::Semicolon => break,
            SourceToken::CurlyBracketBlock => {
                return parser.parse_nested_block(|nested| walk_block(nested, plan, planned));
            }
            _ => {}
        }
        token = next_token(parser);
    }
    Ok(())
}

fn exhaust<'i, 't>(parser: &mut Parser<'i, 't>) -> WalkResult<'i> {
    while parser.next_including_whitespace_and_comments().is_ok() {}
    Ok(())
}

fn next_token<'i, 't>(parser: &mut Parser<'i, 't>) -> Option<SourceToken<'i>> {
    parser.next_including_whitespace_and_comments().ok().cloned()
}

fn next_significant<'i, 't>(parser: &mut Parser<'i, 't>) -> Option<SourceToken<'i>> {
    loop {
        match next_token(parser)? {
            SourceToken::WhiteSpace(_) | SourceToken::Comment(_) => {}
            token => return Some(token),
        }
    }
}

fn opens_block(token: &SourceToken<'_>) -> bool {
    matches!(
        token,
        SourceToken::Function(_)
            | SourceToken::ParenthesisBlock
            | SourceToken::SquareBracketBlock
            | SourceToken::CurlyBracketBlock
    )
}

/// Copy the source through, writing each planned value after its colon.
fn splice(css: &str, planned: Planned) -> Result<Transformed, StructuralError> {
    let mut out = String::with_capacity(css.len());
    let mut applied = Vec::with_capacity(planned.len());
    let mut cursor = 0;

    for (span, replacement) in planned {
        out.push_str(&css[cursor..span.start]);
        out.push(' ');
        out.push_str(&print_value(&replacement.property, &replacement.nodes)?);
        cursor = span.end;
        applied.push(replacement);
    }
    out.push_str(&css[cursor..]);

    Ok(Transformed { css: out, applied })
}

/// A node lowered for printing
enum Lowered<'i> {
    Token(TokenOrValue<'i>),
    /// Written as is
    Text(String),
}

/// Print replacement nodes. Tokens go through the lightningcss printer one at
/// a time; separators and raw text are written directly.
fn print_value(property: &str, nodes: &[ValueNode]) -> Result<String, StructuralError> {
    let mut out = String::new();
    for node in nodes {
        match lower_node(node) {
            Lowered::Text(text) => out.push_str(&text),
            Lowered::Token(token) => out.push_str(&print_token(property, token)?),
        }
    }
    Ok(out)
}

fn print_token(property: &str, token: TokenOrValue<'_>) -> Result<String, StructuralError> {
    let declaration = Property::Custom(CustomProperty {
        name: CustomPropertyName::Custom(DashedIdent(property.to_string().into())),
        value: TokenList(vec![token]),
    });
    declaration
        .value_to_css_string(PrinterOptions::default())
        .map_err(|e| StructuralError::Serialize(e.to_string()))
}

fn lower_node<'i>(node: &ValueNode) -> Lowered<'i> {
    match node {
        ValueNode::Var(name) => Lowered::Token(TokenOrValue::Function(Function {
            name: Ident("var".into()),
            arguments: TokenList(vec![TokenOrValue::DashedIdent(DashedIdent(name.clone().into()))]),
        })),
        ValueNode::Dimension { value, unit } => Lowered::Token(TokenOrValue::Token(Token::Dimension {
            has_sign: value.is_sign_negative(),
            value: *value,
            int_value: int_value(*value),
            unit: unit.clone().into(),
        })),
        ValueNode::Number(value) => Lowered::Token(TokenOrValue::Token(Token::Number {
            has_sign: value.is_sign_negative(),
            value: *value,
            int_value: int_value(*value),
        })),
        ValueNode::Comma => Lowered::Text(", ".to_string()),
        ValueNode::HexColor(code) => match hex_color(code) {
            Ok(color) => Lowered::Token(TokenOrValue::Color(color)),
            Err(_) => Lowered::Text(format!("#{}", code)),
        },
        ValueNode::RgbaColor { r, g, b, a } => match rgba_color(*r, *g, *b, *a) {
            Ok(color) => Lowered::Token(TokenOrValue::Color(color)),
            Err(_) => Lowered::Text(format!("rgba({}, {}, {}, {})", r, g, b, a)),
        },
        ValueNode::Ident(name) => Lowered::Token(TokenOrValue::Token(Token::Ident(name.clone().into()))),
        ValueNode::Raw(text) => Lowered::Text(text.clone()),
    }
}

fn int_value(value: f32) -> Option<i32> {
    if value.fract() == 0.0 && value.abs() <= i32::MAX as f32 {
        Some(value as i32)
    } else {
        None
    }
}
