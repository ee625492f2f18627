//! Integration tests for the inicache-core codec.
//!
//! These tests drive realistic INI documents through the public API:
//! parse, typed decode, re-encode, and serialize.

use inicache_core::{
    decode_value, format_key, parse_ini, parse_ini_with_diagnostics, serialize_ini, Diagnostic,
    IniTable, KeyArg, Value,
};

const SAMPLE: &str = "\
; service configuration
# generated by hand

[server]
host = 0.0.0.0
port = 8080
tls.cert = /etc/ssl/server.pem
verbose = true

[clients]
item0.name = alpha
item1.name = beta
item2.name = gamma # not a comment

[limits]
ratio = 0.75
";

#[test]
fn test_sample_document_parses_without_diagnostics() {
    let (table, diagnostics) = parse_ini_with_diagnostics(SAMPLE);

    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
    assert_eq!(table.len(), 8);
    assert_eq!(table["server.tls.cert"], "/etc/ssl/server.pem");
    assert_eq!(table["clients.item2.name"], "gamma # not a comment");
}

#[test]
fn test_typed_values_decode_from_sample() {
    let table = parse_ini(SAMPLE);

    let port: i32 = decode_value(&table["server.port"], 0).expect("port is numeric");
    let verbose: bool = decode_value(&table["server.verbose"], false).unwrap();
    let ratio: f64 = decode_value(&table["limits.ratio"], 0.0).unwrap();

    assert_eq!(port, 8080);
    assert!(verbose);
    assert_eq!(ratio, 0.75);
}

#[test]
fn test_formatted_keys_address_indexed_entries() {
    let table = parse_ini(SAMPLE);

    let names: Vec<&str> = (0..3)
        .map(|i| {
            let key = format_key("clients.item%d.name", &[KeyArg::from(i)]).unwrap();
            table.get(&key).map(String::as_str).unwrap_or("")
        })
        .collect();

    assert_eq!(names, vec!["alpha", "beta", "gamma # not a comment"]);
}

#[test]
fn test_serialize_then_parse_preserves_table() {
    // Arrange
    let original = parse_ini(SAMPLE);

    // Act
    let text = serialize_ini(&original);
    let (reparsed, diagnostics) = parse_ini_with_diagnostics(&text);

    // Assert
    assert!(diagnostics.is_empty());
    assert_eq!(reparsed, original);
    assert!(!text.contains(';'), "comments are not preserved");
    assert!(text.starts_with("[clients]\n"), "no leading blank line");
}

#[test]
fn test_updated_values_are_written_in_canonical_form() {
    let mut table = parse_ini(SAMPLE);

    table.insert("server.port".into(), Value::from(9090).encode());
    table.insert("limits.ratio".into(), Value::from(0.5_f32).encode());
    table.insert("server.verbose".into(), Value::from(false).encode());
    let reparsed = parse_ini(&serialize_ini(&table));

    assert_eq!(reparsed["server.port"], "9090");
    assert_eq!(reparsed["limits.ratio"], "0.5");
    assert_eq!(reparsed["server.verbose"], "false");
}

#[test]
fn test_messy_document_recovers_every_valid_line() {
    // Arrange
    let text = "\
orphan = 1
[a]
k1 = v1
not a pair
= no key
[unterminated
k2 = v2
[a]
k1 = override
";

    // Act
    let (table, diagnostics) = parse_ini_with_diagnostics(text);

    // Assert
    let mut expected = IniTable::new();
    expected.insert("a.k1".into(), "override".into());
    expected.insert("a.k2".into(), "v2".into());
    assert_eq!(table, expected);
    assert_eq!(
        diagnostics,
        vec![
            Diagnostic::KeyOutsideSection { line: 1 },
            Diagnostic::MissingEquals { line: 4 },
            Diagnostic::EmptyKey { line: 5 },
            Diagnostic::UnmatchedBracket { line: 6 },
            Diagnostic::DuplicateSection {
                line: 8,
                section: "a".into()
            },
            Diagnostic::DuplicateKey {
                line: 9,
                key: "a.k1".into()
            },
        ]
    );
}
