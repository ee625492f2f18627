//! String helpers shared by the INI codec.

/// Removes leading and trailing whitespace from `s`.
///
/// Whitespace is anything Unicode classifies as white space, so full-width
/// spaces and tabs are stripped along with ASCII spaces.  Interior
/// whitespace is preserved.
pub fn trim(s: &str) -> &str {
    s.trim_matches(char::is_whitespace)
}

/// Splits `s` on every character contained in `delimiters`.
///
/// Empty pieces (from leading, trailing or repeated delimiters) are dropped
/// and the remaining pieces are returned untrimmed.
///
/// # Examples
///
/// ```rust
/// use inicache_core::text::split;
///
/// assert_eq!(split("net..port.", "."), vec!["net", "port"]);
/// assert_eq!(split("a, b", ","), vec!["a", " b"]);
/// ```
pub fn split<'a>(s: &'a str, delimiters: &str) -> Vec<&'a str> {
    s.split(|c: char| delimiters.contains(c))
        .filter(|piece| !piece.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── trim ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_trim_strips_both_ends() {
        assert_eq!(trim("  test  "), "test");
        assert_eq!(trim("  test"), "test");
        assert_eq!(trim("test  "), "test");
        assert_eq!(trim("test"), "test");
    }

    #[test]
    fn test_trim_whitespace_only_yields_empty() {
        assert_eq!(trim("   "), "");
        assert_eq!(trim(""), "");
        assert_eq!(trim("\t\r\n"), "");
    }

    #[test]
    fn test_trim_keeps_interior_whitespace() {
        assert_eq!(trim("  te st "), "te st");
        assert_eq!(trim("  im  a  test  "), "im  a  test");
    }

    #[test]
    fn test_trim_handles_multibyte_text() {
        assert_eq!(trim("  你好  "), "你好");
        // U+3000 IDEOGRAPHIC SPACE is whitespace too
        assert_eq!(trim("\u{3000}值\u{3000}"), "值");
    }

    // ── split ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_split_on_single_delimiter() {
        // Arrange / Act
        let parts = split("key;value;value", ";");

        // Assert
        assert_eq!(parts, vec!["key", "value", "value"]);
    }

    #[test]
    fn test_split_does_not_trim_pieces() {
        let parts = split("test, test, test", ",");
        assert_eq!(parts, vec!["test", " test", " test"]);
    }

    #[test]
    fn test_split_without_delimiter_returns_whole_string() {
        assert_eq!(split("test", " "), vec!["test"]);
        assert_eq!(split("test", ","), vec!["test"]);
    }

    #[test]
    fn test_split_drops_empty_pieces() {
        assert_eq!(split("test ", " "), vec!["test"]);
        assert_eq!(split("test ", ","), vec!["test "]);
        assert_eq!(split("..a...b..", "."), vec!["a", "b"]);
    }

    #[test]
    fn test_split_on_any_of_several_delimiters() {
        assert_eq!(split("a.b;c", ".;"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_empty_input_yields_nothing() {
        assert!(split("", ".").is_empty());
    }
}
