//! Colour values for synthesized declarations
//!
//! The structural rewriter emits real colour nodes for hex and `rgba()`
//! replacements. Hex digits are checked here first so that obviously broken
//! input (`#nothex`) never reaches the CSS parser; everything else is handed
//! to lightningcss.

use lightningcss::traits::Parse;
use lightningcss::values::color::CssColor;
use thiserror::Error;

/// Error type for colour parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Invalid length (must be 3, 4, 6, or 8 hex chars after #)
    #[error("invalid color length {0}, expected 3, 4, 6, or 8")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
    /// Alpha outside 0..=1
    #[error("alpha {0} is outside 0..1")]
    InvalidAlpha(String),
    /// CSS parsing error from lightningcss
    #[error("CSS parse error: {0}")]
    CssParse(String),
}

/// Build a colour node from hex digits (without the `#`).
///
/// # Examples
///
/// ```
/// use themeshift::color::{hex_color, ColorError};
///
/// assert!(hex_color("0d6efd").is_ok());
/// assert!(hex_color("fff").is_ok());
/// assert_eq!(hex_color("0d6ef").unwrap_err(), ColorError::InvalidLength(5));
/// assert_eq!(hex_color("zzz").unwrap_err(), ColorError::InvalidHex('z'));
/// ```
pub fn hex_color(digits: &str) -> Result<CssColor, ColorError> {
    if digits.is_empty() {
        return Err(ColorError::Empty);
    }

    // Validate all characters are hex
    if let Some(c) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidHex(c));
    }

    match digits.len() {
        3 | 4 | 6 | 8 => parse_css_color(&format!("#{}", digits)),
        len => Err(ColorError::InvalidLength(len)),
    }
}

/// Build a colour node from `rgba()` components.
pub fn rgba_color(r: u8, g: u8, b: u8, a: f64) -> Result<CssColor, ColorError> {
    if !(0.0..=1.0).contains(&a) {
        return Err(ColorError::InvalidAlpha(a.to_string()));
    }
    parse_css_color(&format!("rgba({}, {}, {}, {})", r, g, b, a))
}

/// Parse any CSS colour with lightningcss
fn parse_css_color(s: &str) -> Result<CssColor, ColorError> {
    CssColor::parse_string(s).map_err(|e| ColorError::CssParse(format!("{:?}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_lengths() {
        for digits in ["fff", "ffff", "0d6efd", "0d6efd80"] {
            assert!(hex_color(digits).is_ok(), "{}", digits);
        }
        assert_eq!(hex_color("ff").unwrap_err(), ColorError::InvalidLength(2));
        assert_eq!(hex_color("").unwrap_err(), ColorError::Empty);
    }

    #[test]
    fn test_hex_invalid_char() {
        assert_eq!(hex_color("12345g").unwrap_err(), ColorError::InvalidHex('g'));
    }

    #[test]
    fn test_rgba() {
        assert!(rgba_color(13, 110, 253, 0.5).is_ok());
        assert!(rgba_color(0, 0, 0, 1.0).is_ok());
        assert!(matches!(rgba_color(0, 0, 0, 1.5), Err(ColorError::InvalidAlpha(_))));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(ColorError::InvalidLength(5).to_string(), "invalid color length 5, expected 3, 4, 6, or 8");
        assert_eq!(ColorError::InvalidHex('x').to_string(), "invalid hex character 'x'");
    }
}
