//! String sanitization helpers for option payloads and capture symbols.

/// Trim path separators and surrounding whitespace from an option value.
pub fn trim_url_path_part(s: &str) -> String {
    s.trim_matches(|c| matches!(c, '/' | '\\' | ' ' | '\t'))
        .to_string()
}

/// Decode a captured symbol region to text, trimming surrounding whitespace.
///
/// Quotes and any interior punctuation are kept verbatim; callers that want a
/// literal argument such as `"x"` get it back with the quotes.
pub fn trim_captured_symbol(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_matches(|c| c == ' ' || c == '\t')
        .to_string()
}

/// Normalize a dotted field name: trim each segment, drop empty segments.
pub fn cleanup_field_name(field_name: &str) -> String {
    let cleaned: Vec<&str> = field_name
        .split('.')
        .map(str::trim)
        .filter(|seg| !seg.is_empty())
        .collect();
    let result = cleaned.join(".");
    if result.len() != field_name.len() {
        return result;
    }
    field_name.to_string()
}

/// Lossy byte-to-text conversion for diagnostics.
pub(crate) fn lossy_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
