//! The `<!-- ID: TOKEN -->` marker that heads every tracked markdown file.
//!
//! Only the first line of a file is ever inspected; markers further down
//! are ordinary content.

use crate::error::{IdsError, Result};
use regex::Regex;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<!-- ID: ([a-zA-Z0-9]+) -->$").unwrap());

/// Extract the identifier from a marker line, if the line is exactly a marker
pub fn extract_identifier(line: &str) -> Option<String> {
    MARKER_RE
        .captures(line.trim())
        .map(|caps| caps[1].to_string())
}

/// Render the marker line for `id` (without trailing newline)
pub fn marker_line(id: &str) -> String {
    format!("<!-- ID: {} -->", id)
}

/// Read the first line of a file. Non-UTF-8 bytes are replaced, never fatal.
pub fn read_first_line(path: &Path) -> Result<String> {
    let file = fs::File::open(path).map_err(|e| IdsError::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    reader
        .read_until(b'\n', &mut buf)
        .map_err(|e| IdsError::io(path, e))?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Read a file's marker identifier, if its first line carries one
pub fn read_identifier(path: &Path) -> Result<Option<String>> {
    Ok(extract_identifier(&read_first_line(path)?))
}

/// Insert the marker for `id` above the existing content, keeping the rest byte-for-byte
pub fn prepend_marker(path: &Path, id: &str) -> Result<()> {
    let original = fs::read(path).map_err(|e| IdsError::io(path, e))?;
    let header = marker_line(id);

    let mut content = Vec::with_capacity(header.len() + 1 + original.len());
    content.extend_from_slice(header.as_bytes());
    content.push(b'\n');
    content.extend_from_slice(&original);

    fs::write(path, content).map_err(|e| IdsError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_extract_identifier() {
        assert_eq!(extract_identifier("<!-- ID: abc123 -->"), Some("abc123".to_string()));
        assert_eq!(extract_identifier("<!-- ID: abc123 -->\n"), Some("abc123".to_string()));
        assert_eq!(extract_identifier("<!-- ID: abc123 -->\r\n"), Some("abc123".to_string()));
        assert_eq!(extract_identifier("<!-- ID: X -->"), Some("X".to_string()));
    }

    #[test]
    fn test_extract_identifier_rejects_malformed() {
        assert_eq!(extract_identifier("# Heading"), None);
        assert_eq!(extract_identifier("<!-- ID: -->"), None);
        assert_eq!(extract_identifier("<!-- ID: abc-123 -->"), None);
        assert_eq!(extract_identifier("<!--ID: abc123-->"), None);
        assert_eq!(extract_identifier("text <!-- ID: abc123 -->"), None);
        assert_eq!(extract_identifier("<!-- ID: abc123 --> trailing"), None);
        assert_eq!(extract_identifier(""), None);
    }

    #[test]
    fn test_marker_line_round_trips() {
        let line = marker_line("Zq81xY");
        assert_eq!(line, "<!-- ID: Zq81xY -->");
        assert_eq!(extract_identifier(&line), Some("Zq81xY".to_string()));
    }

    #[test]
    fn test_read_identifier_ignores_later_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page.md");
        fs::write(&path, "# Title\n<!-- ID: abc123 -->\n").unwrap();
        assert_eq!(read_identifier(&path).unwrap(), None);

        fs::write(&path, "<!-- ID: abc123 -->\n# Title\n").unwrap();
        assert_eq!(read_identifier(&path).unwrap(), Some("abc123".to_string()));
    }

    #[test]
    fn test_read_first_line_empty_and_binary() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty.md");
        fs::write(&empty, "").unwrap();
        assert_eq!(read_first_line(&empty).unwrap(), "");

        let binary = dir.path().join("binary.md");
        fs::write(&binary, [0xff, 0xfe, b'\n', b'x']).unwrap();
        assert_eq!(read_identifier(&binary).unwrap(), None);
    }

    #[test]
    fn test_prepend_marker_preserves_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page.md");
        let original: &[u8] = b"# Title\r\n\r\nBody \xe2\x9c\x93 no trailing newline";
        fs::write(&path, original).unwrap();

        prepend_marker(&path, "abc123").unwrap();

        let written = fs::read(&path).unwrap();
        let header = b"<!-- ID: abc123 -->\n";
        assert_eq!(&written[..header.len()], header);
        assert_eq!(&written[header.len()..], original);
    }

    #[test]
    fn test_prepend_marker_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.md");
        fs::write(&path, "").unwrap();

        prepend_marker(&path, "abc123").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<!-- ID: abc123 -->\n");
    }

    #[test]
    fn test_prepend_marker_missing_file() {
        let dir = tempdir().unwrap();
        let err = prepend_marker(&dir.path().join("gone.md"), "abc123").unwrap_err();
        assert!(matches!(err, IdsError::Io { .. }));
    }
}
