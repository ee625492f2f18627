//! INI text codec and combined-key helpers.

pub mod codec;
pub mod key;

pub use codec::{parse_ini, parse_ini_with_diagnostics, serialize_ini, Diagnostic, IniTable};
pub use key::{combine_key, format_key, is_combined_key, split_combined_key, KeyArg, KeyFormatError, MAX_FIELD_WIDTH};
