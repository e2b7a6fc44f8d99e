/// Digits with sign characters, for signed integers.
const INT_PATTERN: &[u8] = b"0-9+\\-";

/// Bare digits, for unsigned integers.
const UINT_PATTERN: &[u8] = b"0-9";

/// Digits, signs, decimal point, and exponent markers.
const FLOAT_PATTERN: &[u8] = b"0-9+\\-\\.eE";

/// All printables except the path separator.
const TEXT_PATTERN: &[u8] = b"^/";

/// Default byte-class pattern for a capture target type.
///
/// Used when a capture carries no explicit pattern: the target type (resolved
/// field kind, setter argument type, or handler parameter type) selects a
/// pattern from this table. Types outside the table cannot be guessed.
pub fn default_pattern_for(type_name: &str) -> Option<&'static [u8]> {
    match type_name {
        "bool" => Some(b"truefalseTRUEFALSE01"),
        "int32" | "int64" => Some(INT_PATTERN),
        "uint32" | "uint64" => Some(UINT_PATTERN),
        "float32" | "float64" => Some(FLOAT_PATTERN),
        "string" | "bytes" => Some(TEXT_PATTERN),
        _ => None,
    }
}
