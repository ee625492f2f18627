//! INI text codec.
//!
//! Text format:
//! ```text
//! ; comment            # comment
//! [section1]
//! key1=value1
//! key2=value2
//!
//! [section2]
//! key1=value3
//! ```
//!
//! Parsing flattens the file into an [`IniTable`] keyed by combined keys
//! (`"section1.key1"`).  Serialization does the reverse, emitting one
//! `[section]` header per distinct section.
//!
//! # Parsing rules
//!
//! - Every line is trimmed; blank lines are skipped.
//! - A line whose first character is `;` or `#` is a comment.  Comments are
//!   only recognised at the start of a line: `key=value #note` stores the value
//!   `value #note`.
//! - `[name]` starts a section; the text up to the first `]` is trimmed and
//!   becomes the section name.  Repeating a section merges its keys.
//! - `key=value` splits on the first `=`; both sides are trimmed.
//! - Malformed lines are skipped and reported as a [`Diagnostic`]; parsing
//!   never fails as a whole.
//! - A repeated key overwrites the earlier value.
//!
//! There is no quoting, escaping, or multi-line value support.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use tracing::{debug, warn};

use crate::ini::key::{combine_key, split_combined_key};
use crate::text::trim;

/// Flat table of combined keys to raw string values, ordered by key.
pub type IniTable = BTreeMap<String, String>;

/// A recoverable problem found while parsing.
///
/// Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A line starts with `[` but has no closing `]`.
    UnmatchedBracket { line: usize },
    /// A key line appears before any section header.
    KeyOutsideSection { line: usize },
    /// A non-section line has no `=`.
    MissingEquals { line: usize },
    /// A key line starts with `=`, so the key is empty.
    EmptyKey { line: usize },
    /// A section header repeats an earlier section name.
    DuplicateSection { line: usize, section: String },
    /// A combined key was already defined; the new value wins.
    DuplicateKey { line: usize, key: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnmatchedBracket { line } => write!(f, "line {line}: unmatched '['"),
            Diagnostic::KeyOutsideSection { line } => {
                write!(f, "line {line}: key outside of any section")
            }
            Diagnostic::MissingEquals { line } => write!(f, "line {line}: unmatched '='"),
            Diagnostic::EmptyKey { line } => write!(f, "line {line}: empty key"),
            Diagnostic::DuplicateSection { line, section } => {
                write!(f, "line {line}: duplicated section name {section}")
            }
            Diagnostic::DuplicateKey { line, key } => {
                write!(f, "line {line}: duplicated key name {key}")
            }
        }
    }
}

/// Parses INI text into a table, logging every [`Diagnostic`] as a warning.
///
/// # Examples
///
/// ```rust
/// use inicache_core::parse_ini;
///
/// let table = parse_ini("[net]\nport = 8080\n");
/// assert_eq!(table.get("net.port").map(String::as_str), Some("8080"));
/// ```
pub fn parse_ini(text: &str) -> IniTable {
    let (table, diagnostics) = parse_ini_with_diagnostics(text);
    for diagnostic in &diagnostics {
        warn!("ini parse: {diagnostic}");
    }
    table
}

/// Parses INI text into a table and returns the diagnostics instead of
/// logging them.
pub fn parse_ini_with_diagnostics(text: &str) -> (IniTable, Vec<Diagnostic>) {
    let mut table = IniTable::new();
    let mut diagnostics = Vec::new();
    let mut seen_sections: HashSet<String> = HashSet::new();
    let mut section = String::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = trim(raw_line);
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let Some(end) = rest.find(']') else {
                diagnostics.push(Diagnostic::UnmatchedBracket { line: line_no });
                continue;
            };
            section = trim(&rest[..end]).to_string();
            if !seen_sections.insert(section.clone()) {
                diagnostics.push(Diagnostic::DuplicateSection {
                    line: line_no,
                    section: section.clone(),
                });
            }
            continue;
        }

        if section.is_empty() {
            diagnostics.push(Diagnostic::KeyOutsideSection { line: line_no });
            continue;
        }
        let Some(eq_pos) = line.find('=') else {
            diagnostics.push(Diagnostic::MissingEquals { line: line_no });
            continue;
        };
        if eq_pos == 0 {
            diagnostics.push(Diagnostic::EmptyKey { line: line_no });
            continue;
        }

        let key = trim(&line[..eq_pos]);
        let value = trim(&line[eq_pos + 1..]);
        let combined = combine_key(&section, key);
        if table.contains_key(&combined) {
            diagnostics.push(Diagnostic::DuplicateKey {
                line: line_no,
                key: combined.clone(),
            });
        }
        table.insert(combined, value.to_string());
    }

    (table, diagnostics)
}

/// Serializes a table to INI text.
///
/// Entries with an empty value and entries whose key has no section are
/// skipped.  Sections appear in sorted order, separated by one blank line.
///
/// # Examples
///
/// ```rust
/// use inicache_core::{serialize_ini, IniTable};
///
/// let mut table = IniTable::new();
/// table.insert("b.key".into(), "2".into());
/// table.insert("a.key".into(), "1".into());
/// assert_eq!(serialize_ini(&table), "[a]\nkey=1\n\n[b]\nkey=2\n");
/// ```
pub fn serialize_ini(table: &IniTable) -> String {
    let mut sections: BTreeMap<&str, Vec<(String, &str)>> = BTreeMap::new();
    for (combined, value) in table {
        if value.is_empty() {
            continue;
        }
        match split_combined_key(combined) {
            Some((section, key)) => sections
                .entry(section)
                .or_default()
                .push((key, value.as_str())),
            None => debug!("skipping key without section: {combined:?}"),
        }
    }

    let mut out = String::new();
    for (index, (section, entries)) in sections.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        out.push('[');
        out.push_str(section);
        out.push_str("]\n");
        for (key, value) in entries {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
    }
    out
}
