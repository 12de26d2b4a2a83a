use super::patterns::{capture, Patterns};

/// Trimmed contents of the first `"""..."""` block, or an empty string.
pub(crate) fn extract_docstring(patterns: &Patterns, code: &str) -> String {
    capture(&patterns.docstring, code)
        .map(|doc| doc.trim().to_string())
        .unwrap_or_default()
}

/// First non-blank line of a docstring, used as a fallback display name.
pub(crate) fn docstring_title(docstring: &str) -> Option<&str> {
    docstring
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
}
