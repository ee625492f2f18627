//! Typed conversion between stored INI text and in-memory values.
//!
//! Only five value types are supported: `String`, `i32`, `f32`, `f64` and
//! `bool`.  The restriction is enforced at compile time: reads go through the
//! sealed [`FromIni`] trait and writes go through the closed [`Value`] enum,
//! neither of which can be extended outside this crate.
//!
//! # Encoding rules
//!
//! | Type     | Stored text                          |
//! |----------|--------------------------------------|
//! | `String` | the string itself                    |
//! | `i32`    | decimal, e.g. `-42`                  |
//! | `f32`    | shortest round-trip decimal, `1.1`   |
//! | `f64`    | shortest round-trip decimal, `2.25`  |
//! | `bool`   | `true` / `false`                     |
//!
//! # Decoding rules
//!
//! An empty stored string always decodes to the caller's default.  Numeric
//! text that fails to parse is an error, never silently replaced by the
//! default.  Booleans are `true` for exactly `"1"` or `"true"` and `false`
//! for anything else.

use std::fmt;
use std::num::{ParseFloatError, ParseIntError};
use std::str::FromStr;

use thiserror::Error;

/// Errors produced when stored text cannot be converted to the requested type.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValueError {
    /// The text is not a valid 32-bit signed integer.
    #[error("invalid integer value {raw:?}: {source}")]
    InvalidInt {
        raw: String,
        #[source]
        source: ParseIntError,
    },

    /// The text is not a valid floating-point number.
    #[error("invalid floating-point value {raw:?}: {source}")]
    InvalidFloat {
        raw: String,
        #[source]
        source: ParseFloatError,
    },

    /// The type name is not one of the supported value kinds.
    #[error("unknown value type {0:?} (expected string, int, float, double or bool)")]
    UnknownKind(String),
}

/// The kind of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Int,
    Float,
    Double,
    Bool,
}

impl ValueKind {
    /// Lower-case name used on the command line and in log messages.
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Double => "double",
            ValueKind::Bool => "bool",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ValueKind::String),
            "int" => Ok(ValueKind::Int),
            "float" => Ok(ValueKind::Float),
            "double" => Ok(ValueKind::Double),
            "bool" => Ok(ValueKind::Bool),
            other => Err(ValueError::UnknownKind(other.to_string())),
        }
    }
}

/// A value of one of the supported types, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i32),
    Float(f32),
    Double(f64),
    Bool(bool),
}

impl Value {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::Bool(_) => ValueKind::Bool,
        }
    }

    /// Returns the canonical text stored on disk for this value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use inicache_core::Value;
    ///
    /// assert_eq!(Value::from(1.1_f32).encode(), "1.1");
    /// assert_eq!(Value::from(true).encode(), "true");
    /// assert_eq!(Value::from("eth0").encode(), "eth0");
    /// ```
    pub fn encode(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Double(v) => v.to_string(),
            Value::Bool(v) => v.to_string(),
        }
    }

    /// Parses `raw` as a value of the given kind.
    ///
    /// Unlike [`decode_value`] there is no default to fall back on, so an
    /// empty string is only accepted for [`ValueKind::String`] and
    /// [`ValueKind::Bool`].
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] when `raw` is not valid numeric text.
    pub fn parse(kind: ValueKind, raw: &str) -> Result<Self, ValueError> {
        match kind {
            ValueKind::String => Ok(Value::String(raw.to_string())),
            ValueKind::Int => i32::from_ini(raw).map(Value::Int),
            ValueKind::Float => f32::from_ini(raw).map(Value::Float),
            ValueKind::Double => f64::from_ini(raw).map(Value::Double),
            ValueKind::Bool => bool::from_ini(raw).map(Value::Bool),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::String(v.clone())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for String {}
    impl Sealed for i32 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
    impl Sealed for bool {}
}

/// Types that can be read back from stored INI text.
///
/// This trait is sealed: it is implemented for `String`, `i32`, `f32`, `f64`
/// and `bool` only.
pub trait FromIni: sealed::Sealed + Sized {
    /// The [`ValueKind`] this type decodes to.
    const KIND: ValueKind;

    /// Converts non-empty stored text to `Self`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] when the text is not valid for this type.
    fn from_ini(raw: &str) -> Result<Self, ValueError>;
}

impl FromIni for String {
    const KIND: ValueKind = ValueKind::String;

    fn from_ini(raw: &str) -> Result<Self, ValueError> {
        Ok(raw.to_string())
    }
}

impl FromIni for i32 {
    const KIND: ValueKind = ValueKind::Int;

    fn from_ini(raw: &str) -> Result<Self, ValueError> {
        raw.parse().map_err(|source| ValueError::InvalidInt {
            raw: raw.to_string(),
            source,
        })
    }
}

impl FromIni for f32 {
    const KIND: ValueKind = ValueKind::Float;

    fn from_ini(raw: &str) -> Result<Self, ValueError> {
        raw.parse().map_err(|source| ValueError::InvalidFloat {
            raw: raw.to_string(),
            source,
        })
    }
}

impl FromIni for f64 {
    const KIND: ValueKind = ValueKind::Double;

    fn from_ini(raw: &str) -> Result<Self, ValueError> {
        raw.parse().map_err(|source| ValueError::InvalidFloat {
            raw: raw.to_string(),
            source,
        })
    }
}

impl FromIni for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn from_ini(raw: &str) -> Result<Self, ValueError> {
        Ok(raw == "1" || raw == "true")
    }
}

/// Decodes stored text into `T`, returning `default` when `raw` is empty.
///
/// # Errors
///
/// Returns [`ValueError`] when `raw` is non-empty and not valid for `T`.
///
/// # Examples
///
/// ```rust
/// use inicache_core::decode_value;
///
/// assert_eq!(decode_value("", 7).unwrap(), 7);
/// assert_eq!(decode_value("-1", 0).unwrap(), -1);
/// assert!(decode_value("seven", 0).is_err());
/// ```
pub fn decode_value<T: FromIni>(raw: &str, default: T) -> Result<T, ValueError> {
    if raw.is_empty() {
        return Ok(default);
    }
    T::from_ini(raw)
}
