//! # inicache-core
//!
//! INI text codec and typed value conversion used by the `inicache`
//! configuration store.
//!
//! This crate has no filesystem access and no shared state.  Everything in
//! it is a pure function over strings, which keeps the store crate's
//! locking and staleness logic separate from the text format.
//!
//! # Overview
//!
//! - **`ini`** – Parses INI text into a flat, ordered table of combined
//!   keys (`"section.key"`) and serializes such a table back to INI text.
//!   Also builds combined keys from printf-style templates.
//!
//! - **`value`** – Converts between the stored text and the five supported
//!   value types: `String`, `i32`, `f32`, `f64` and `bool`.
//!
//! - **`text`** – Small string helpers (`trim`, `split`) used by the codec.

pub mod ini;
pub mod text;
pub mod value;

pub use ini::codec::{parse_ini, parse_ini_with_diagnostics, serialize_ini, Diagnostic, IniTable};
pub use ini::key::{
    format_key, is_combined_key, split_combined_key, KeyArg, KeyFormatError, MAX_FIELD_WIDTH,
};
pub use value::{decode_value, FromIni, Value, ValueError, ValueKind};
