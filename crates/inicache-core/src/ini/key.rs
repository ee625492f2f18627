//! Combined keys and printf-style key templates.
//!
//! A *combined key* is `"<section>.<key>"`: the first dot-delimited segment
//! names the INI section and the rest (which may contain further dots) is the
//! key inside that section.  A key without a dot has no section and is never
//! written to disk.
//!
//! [`format_key`] builds combined keys from a template such as
//! `"server.item%d.name"` so callers can address indexed entries without
//! concatenating strings by hand.  The supported subset of printf syntax is:
//!
//! ```text
//! %[flags][width][.precision][length]conversion
//!
//! flags       -  0  +  space  #      (# is accepted and ignored)
//! length      h  l  L  q  j  z  t    (accepted and ignored)
//! conversion  d i u x X o f F s c %
//! ```
//!
//! Arguments are type-checked against their conversion; a mismatch is an
//! error instead of undefined behaviour.

use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

use crate::text::split;

/// Errors produced by [`format_key`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyFormatError {
    /// The template contains a conversion character that is not supported.
    #[error("unsupported conversion '%{conversion}' at byte {position}")]
    UnsupportedConversion { conversion: char, position: usize },

    /// The template ends in the middle of a conversion specification.
    #[error("incomplete conversion at byte {position}")]
    IncompleteConversion { position: usize },

    /// There are more conversions than arguments.
    #[error("missing argument {index} for template")]
    MissingArgument { index: usize },

    /// The argument type does not fit the conversion.
    #[error("argument {index} does not match conversion '%{conversion}'")]
    ArgumentMismatch { index: usize, conversion: char },

    /// There are more arguments than conversions.
    #[error("{unused} argument(s) not used by template")]
    UnusedArguments { unused: usize },

    /// A width or precision exceeds [`MAX_FIELD_WIDTH`].
    #[error("width or precision of conversion at byte {position} exceeds {max}", max = MAX_FIELD_WIDTH)]
    WidthOutOfRange { position: usize },
}

/// Largest width or precision accepted by [`format_key`].
pub const MAX_FIELD_WIDTH: usize = 1024;

/// A single argument substituted into a key template.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyArg {
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Char(char),
}

impl From<i32> for KeyArg {
    fn from(v: i32) -> Self {
        KeyArg::Int(i64::from(v))
    }
}

impl From<i64> for KeyArg {
    fn from(v: i64) -> Self {
        KeyArg::Int(v)
    }
}

impl From<u32> for KeyArg {
    fn from(v: u32) -> Self {
        KeyArg::UInt(u64::from(v))
    }
}

impl From<u64> for KeyArg {
    fn from(v: u64) -> Self {
        KeyArg::UInt(v)
    }
}

impl From<usize> for KeyArg {
    fn from(v: usize) -> Self {
        KeyArg::UInt(v as u64)
    }
}

impl From<f32> for KeyArg {
    fn from(v: f32) -> Self {
        KeyArg::Float(f64::from(v))
    }
}

impl From<f64> for KeyArg {
    fn from(v: f64) -> Self {
        KeyArg::Float(v)
    }
}

impl From<&str> for KeyArg {
    fn from(v: &str) -> Self {
        KeyArg::Str(v.to_string())
    }
}

impl From<String> for KeyArg {
    fn from(v: String) -> Self {
        KeyArg::Str(v)
    }
}

impl From<char> for KeyArg {
    fn from(v: char) -> Self {
        KeyArg::Char(v)
    }
}

// ── Combined keys ─────────────────────────────────────────────────────────────

/// Splits a combined key into its section name and the key within that
/// section.
///
/// Empty dot-delimited segments are dropped, so `"net..port"` splits into
/// `("net", "port")`.  Returns `None` when fewer than two segments remain.
///
/// # Examples
///
/// ```rust
/// use inicache_core::split_combined_key;
///
/// assert_eq!(
///     split_combined_key("server.tls.cert"),
///     Some(("server", "tls.cert".to_string()))
/// );
/// assert_eq!(split_combined_key("orphan"), None);
/// ```
pub fn split_combined_key(combined: &str) -> Option<(&str, String)> {
    let segments = split(combined, ".");
    match segments.split_first() {
        Some((section, rest)) if !rest.is_empty() => Some((section, rest.join("."))),
        _ => None,
    }
}

/// Returns `true` when `key` has both a section and a key part.
pub fn is_combined_key(key: &str) -> bool {
    split_combined_key(key).is_some()
}

/// Joins a section name and a key into a combined key.
pub fn combine_key(section: &str, key: &str) -> String {
    format!("{section}.{key}")
}

// ── Template formatting ───────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Spec {
    left_align: bool,
    zero_pad: bool,
    plus_sign: bool,
    space_sign: bool,
    width: usize,
    precision: Option<usize>,
    conversion: char,
}

/// Formats a key template with printf-style positional substitution.
///
/// # Errors
///
/// Returns [`KeyFormatError`] when the template is malformed or the
/// arguments do not match its conversions in number or type.  A width or
/// precision above [`MAX_FIELD_WIDTH`] is rejected rather than allocated.
///
/// # Examples
///
/// ```rust
/// use inicache_core::{format_key, KeyArg};
///
/// let key = format_key("section.item%d.field", &[KeyArg::from(3)]).unwrap();
/// assert_eq!(key, "section.item3.field");
///
/// let key = format_key("%s.port%03u", &["net".into(), 7u32.into()]).unwrap();
/// assert_eq!(key, "net.port007");
/// ```
pub fn format_key(template: &str, args: &[KeyArg]) -> Result<String, KeyFormatError> {
    let mut out = String::with_capacity(template.len() + 8);
    let mut chars = template.char_indices().peekable();
    let mut next_arg = 0;

    while let Some((position, c)) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let spec = parse_spec(&mut chars, position)?;
        if spec.conversion == '%' {
            out.push('%');
            continue;
        }
        let arg = args
            .get(next_arg)
            .ok_or(KeyFormatError::MissingArgument { index: next_arg })?;
        out.push_str(&render(&spec, next_arg, arg)?);
        next_arg += 1;
    }

    if next_arg < args.len() {
        return Err(KeyFormatError::UnusedArguments {
            unused: args.len() - next_arg,
        });
    }
    Ok(out)
}

fn parse_spec(
    chars: &mut Peekable<CharIndices<'_>>,
    position: usize,
) -> Result<Spec, KeyFormatError> {
    let mut spec = Spec::default();

    while let Some(&(_, c)) = chars.peek() {
        match c {
            '-' => spec.left_align = true,
            '0' => spec.zero_pad = true,
            '+' => spec.plus_sign = true,
            ' ' => spec.space_sign = true,
            '#' => {}
            _ => break,
        }
        chars.next();
    }

    let out_of_range = KeyFormatError::WidthOutOfRange { position };
    spec.width = read_number(chars).ok_or(out_of_range.clone())?;

    if matches!(chars.peek(), Some(&(_, '.'))) {
        chars.next();
        spec.precision = Some(read_number(chars).ok_or(out_of_range)?);
    }

    while matches!(
        chars.peek(),
        Some(&(_, 'h' | 'l' | 'L' | 'q' | 'j' | 'z' | 't'))
    ) {
        chars.next();
    }

    match chars.next() {
        Some((_, c @ ('d' | 'i' | 'u' | 'x' | 'X' | 'o' | 'f' | 'F' | 's' | 'c' | '%'))) => {
            spec.conversion = c;
            Ok(spec)
        }
        Some((_, conversion)) => Err(KeyFormatError::UnsupportedConversion {
            conversion,
            position,
        }),
        None => Err(KeyFormatError::IncompleteConversion { position }),
    }
}

/// Reads a run of decimal digits.  Returns `None` if the value exceeds
/// [`MAX_FIELD_WIDTH`]; the digits are consumed either way.
fn read_number(chars: &mut Peekable<CharIndices<'_>>) -> Option<usize> {
    let mut n = 0usize;
    while let Some(&(_, c)) = chars.peek() {
        let Some(digit) = c.to_digit(10) else { break };
        n = n.saturating_mul(10).saturating_add(digit as usize);
        chars.next();
    }
    (n <= MAX_FIELD_WIDTH).then_some(n)
}

fn render(spec: &Spec, index: usize, arg: &KeyArg) -> Result<String, KeyFormatError> {
    let mismatch = || KeyFormatError::ArgumentMismatch {
        index,
        conversion: spec.conversion,
    };

    match spec.conversion {
        'd' | 'i' => {
            let n: i128 = match arg {
                KeyArg::Int(v) => i128::from(*v),
                KeyArg::UInt(v) => i128::from(*v),
                _ => return Err(mismatch()),
            };
            let digits = min_digits(n.unsigned_abs().to_string(), spec.precision);
            Ok(pad_numeric(spec, n < 0, digits))
        }
        'u' | 'x' | 'X' | 'o' => {
            let n: u64 = match arg {
                KeyArg::UInt(v) => *v,
                KeyArg::Int(v) => u64::try_from(*v).map_err(|_| mismatch())?,
                _ => return Err(mismatch()),
            };
            let digits = match spec.conversion {
                'u' => n.to_string(),
                'x' => format!("{n:x}"),
                'X' => format!("{n:X}"),
                _ => format!("{n:o}"),
            };
            Ok(pad_numeric(spec, false, min_digits(digits, spec.precision)))
        }
        'f' | 'F' => {
            let KeyArg::Float(v) = arg else {
                return Err(mismatch());
            };
            let digits = format!("{:.*}", spec.precision.unwrap_or(6), v.abs());
            Ok(pad_numeric(spec, v.is_sign_negative() && !v.is_nan(), digits))
        }
        's' => {
            let KeyArg::Str(s) = arg else {
                return Err(mismatch());
            };
            let text: String = match spec.precision {
                Some(max) => s.chars().take(max).collect(),
                None => s.clone(),
            };
            Ok(pad_text(spec, text))
        }
        'c' => {
            let KeyArg::Char(c) = arg else {
                return Err(mismatch());
            };
            Ok(pad_text(spec, c.to_string()))
        }
        _ => Err(mismatch()),
    }
}

fn min_digits(digits: String, precision: Option<usize>) -> String {
    match precision {
        Some(p) if digits.len() < p => format!("{}{digits}", "0".repeat(p - digits.len())),
        _ => digits,
    }
}

fn pad_numeric(spec: &Spec, negative: bool, digits: String) -> String {
    let sign = if negative {
        "-"
    } else if spec.plus_sign {
        "+"
    } else if spec.space_sign {
        " "
    } else {
        ""
    };
    let len = sign.len() + digits.len();
    if len >= spec.width {
        return format!("{sign}{digits}");
    }
    let fill = spec.width - len;
    if spec.left_align {
        format!("{sign}{digits}{}", " ".repeat(fill))
    } else if spec.zero_pad {
        format!("{sign}{}{digits}", "0".repeat(fill))
    } else {
        format!("{}{sign}{digits}", " ".repeat(fill))
    }
}

fn pad_text(spec: &Spec, text: String) -> String {
    let len = text.chars().count();
    if len >= spec.width {
        return text;
    }
    let fill = " ".repeat(spec.width - len);
    if spec.left_align {
        format!("{text}{fill}")
    } else {
        format!("{fill}{text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Combined keys ─────────────────────────────────────────────────────────

    #[test]
    fn test_split_combined_key_simple() {
        assert_eq!(
            split_combined_key("section.key"),
            Some(("section", "key".to_string()))
        );
    }

    #[test]
    fn test_split_combined_key_keeps_nested_dots_in_key() {
        assert_eq!(
            split_combined_key("a.b.c.d"),
            Some(("a", "b.c.d".to_string()))
        );
    }

    #[test]
    fn test_split_combined_key_without_dot_is_none() {
        assert_eq!(split_combined_key("key1"), None);
        assert_eq!(split_combined_key("key1."), None);
        assert_eq!(split_combined_key(""), None);
    }

    #[test]
    fn test_is_combined_key() {
        assert!(is_combined_key("net.port"));
        assert!(!is_combined_key("port"));
    }

    #[test]
    fn test_combine_key() {
        assert_eq!(combine_key("net", "port"), "net.port");
    }

    // ── format_key ────────────────────────────────────────────────────────────

    #[test]
    fn test_format_key_indexed_field() {
        // Arrange
        let args = [KeyArg::from(3)];

        // Act
        let key = format_key("section.item%d.field", &args).unwrap();

        // Assert
        assert_eq!(key, "section.item3.field");
    }

    #[test]
    fn test_format_key_without_conversions_is_identity() {
        assert_eq!(format_key("a.b", &[]).unwrap(), "a.b");
    }

    #[test]
    fn test_format_key_multiple_arguments() {
        let key = format_key(
            "%s.%s%d",
            &["clients".into(), "host".into(), KeyArg::from(12)],
        )
        .unwrap();
        assert_eq!(key, "clients.host12");
    }

    #[test]
    fn test_format_key_width_and_padding() {
        assert_eq!(format_key("x.%03d", &[7.into()]).unwrap(), "x.007");
        assert_eq!(format_key("x.%3d|", &[7.into()]).unwrap(), "x.  7|");
        assert_eq!(format_key("x.%-3d|", &[7.into()]).unwrap(), "x.7  |");
        assert_eq!(format_key("x.%05d", &[(-42).into()]).unwrap(), "x.-0042");
        assert_eq!(format_key("x.%+d", &[5.into()]).unwrap(), "x.+5");
    }

    #[test]
    fn test_format_key_integer_precision_sets_min_digits() {
        assert_eq!(format_key("x.%.4d", &[12.into()]).unwrap(), "x.0012");
    }

    #[test]
    fn test_format_key_hex_and_octal() {
        assert_eq!(format_key("x.%x", &[255u32.into()]).unwrap(), "x.ff");
        assert_eq!(format_key("x.%X", &[255u32.into()]).unwrap(), "x.FF");
        assert_eq!(format_key("x.%o", &[8.into()]).unwrap(), "x.10");
    }

    #[test]
    fn test_format_key_float_uses_c_default_precision() {
        assert_eq!(format_key("x.%f", &[1.5.into()]).unwrap(), "x.1.500000");
        assert_eq!(format_key("x.%.2f", &[(-1.0).into()]).unwrap(), "x.-1.00");
    }

    #[test]
    fn test_format_key_string_precision_truncates() {
        assert_eq!(format_key("x.%.3s", &["abcdef".into()]).unwrap(), "x.abc");
        assert_eq!(format_key("x.%5s", &["ab".into()]).unwrap(), "x.   ab");
    }

    #[test]
    fn test_format_key_char_and_literal_percent() {
        assert_eq!(format_key("x.%c%%", &['k'.into()]).unwrap(), "x.k%");
    }

    #[test]
    fn test_format_key_length_modifiers_are_ignored() {
        assert_eq!(format_key("x.%ld", &[9i64.into()]).unwrap(), "x.9");
        assert_eq!(format_key("x.%zu", &[9usize.into()]).unwrap(), "x.9");
    }

    #[test]
    fn test_format_key_missing_argument() {
        assert_eq!(
            format_key("a.%d.%d", &[1.into()]),
            Err(KeyFormatError::MissingArgument { index: 1 })
        );
    }

    #[test]
    fn test_format_key_unused_arguments() {
        assert_eq!(
            format_key("a.b", &[1.into(), 2.into()]),
            Err(KeyFormatError::UnusedArguments { unused: 2 })
        );
    }

    #[test]
    fn test_format_key_type_mismatch() {
        assert_eq!(
            format_key("a.%d", &["one".into()]),
            Err(KeyFormatError::ArgumentMismatch {
                index: 0,
                conversion: 'd'
            })
        );
        assert!(format_key("a.%u", &[(-1).into()]).is_err());
        assert!(format_key("a.%s", &[1.into()]).is_err());
    }

    #[test]
    fn test_format_key_unsupported_conversion() {
        assert_eq!(
            format_key("a.%p", &[1.into()]),
            Err(KeyFormatError::UnsupportedConversion {
                conversion: 'p',
                position: 2
            })
        );
    }

    #[test]
    fn test_format_key_trailing_percent_is_incomplete() {
        assert_eq!(
            format_key("a.b%", &[]),
            Err(KeyFormatError::IncompleteConversion { position: 3 })
        );
    }

    #[test]
    fn test_format_key_huge_precision_is_rejected() {
        assert_eq!(
            format_key("a.%.70000f", &[KeyArg::from(1.0_f64)]),
            Err(KeyFormatError::WidthOutOfRange { position: 2 })
        );
    }

    #[test]
    fn test_format_key_overflowing_width_is_rejected() {
        assert_eq!(
            format_key("a.%99999999999999999999d", &[KeyArg::from(1)]),
            Err(KeyFormatError::WidthOutOfRange { position: 2 })
        );
    }

    #[test]
    fn test_format_key_width_at_limit_is_accepted() {
        // Arrange
        let template = format!("a.%{MAX_FIELD_WIDTH}d");

        // Act
        let key = format_key(&template, &[KeyArg::from(7)]).unwrap();

        // Assert
        assert_eq!(key.len(), 2 + MAX_FIELD_WIDTH);
        assert!(key.ends_with("7"));
    }
}
