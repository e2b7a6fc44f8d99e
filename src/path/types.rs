use std::cmp::Ordering;
use std::fmt;

use crate::pattern::ByteClass;
use crate::sanitize::lossy_text;
use crate::schema::FieldRef;

/// Where a capture delivers its matched bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureDest {
    /// Bind to a (possibly dotted) field of the method's input message.
    /// `resolved` is filled in during registration.
    Field {
        dotted_name: String,
        resolved: Option<FieldRef>,
    },
    /// Pass through a setter function; the first argument type drives value
    /// conversion, the remaining arguments are forwarded verbatim.
    Setter {
        func_name: String,
        arg0_type: String,
        extra_args: Vec<String>,
    },
    /// Surface as an extra handler-function parameter.
    HandlerParam { name: String, type_name: String },
}

/// One parsed part of an annotated URL path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartKind {
    /// Literal bytes, escape sequences already applied.
    Fixed { bytes: Vec<u8> },
    /// A `{...}` capture.
    Capture {
        name: Option<String>,
        pattern: ByteClass,
        dest: CaptureDest,
    },
}

/// A part plus the raw (pre-decode) slice it came from, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPart {
    pub raw: Vec<u8>,
    pub kind: PartKind,
}

impl PathPart {
    /// The canonical rendering used to build registry keys.
    pub fn canonical_text(&self) -> String {
        match &self.kind {
            PartKind::Fixed { bytes } => lossy_text(bytes),
            PartKind::Capture { pattern, .. } => {
                format!("{{{{capture: {}}}}}", pattern.canonical_text())
            }
        }
    }

    /// Project this part onto its routing shape, dropping capture names and
    /// destination bindings.
    pub fn bare(&self) -> BarePart {
        match &self.kind {
            PartKind::Fixed { bytes } => BarePart::Fixed(bytes.clone()),
            PartKind::Capture { pattern, .. } => BarePart::Capture(*pattern),
        }
    }
}

/// A parsed URL path: the raw input (leading `/` runs stripped) plus parts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlPath {
    pub raw_path: Vec<u8>,
    pub parts: Vec<PathPart>,
}

impl UrlPath {
    /// Concatenated canonical text of all parts; the registry key.
    ///
    /// Two captures with identical patterns collapse into the same key
    /// regardless of their field or setter bindings.
    pub fn canonical_path(&self) -> String {
        self.parts.iter().map(PathPart::canonical_text).collect()
    }

    /// Project the part list onto its routing shape.
    pub fn bare_path(&self) -> BarePath {
        BarePath {
            parts: self.parts.iter().map(PathPart::bare).collect(),
        }
    }

    /// The raw input as text, for diagnostics.
    pub fn raw_text(&self) -> String {
        lossy_text(&self.raw_path)
    }
}

/// Routing projection of a path part: just the shape that matters to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BarePart {
    Fixed(Vec<u8>),
    Capture(ByteClass),
}

impl BarePart {
    pub fn canonical_text(&self) -> String {
        match self {
            BarePart::Fixed(bytes) => lossy_text(bytes),
            BarePart::Capture(pattern) => {
                format!("{{{{capture: {}}}}}", pattern.canonical_text())
            }
        }
    }
}

impl fmt::Display for BarePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_text())
    }
}

/// Routing projection of a whole path; the radix-tree insertion key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BarePath {
    pub parts: Vec<BarePart>,
}

impl BarePath {
    pub fn canonical_path(&self) -> String {
        self.parts.iter().map(BarePart::canonical_text).collect()
    }
}

impl PartialOrd for BarePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Element-wise ordering for sorted endpoint emission.
///
/// Fixed parts sort before Capture parts. Within Fixed, bytes compare
/// byte-wise with a prefix rule: when one side is a byte-prefix of the other,
/// the shorter sorts first. Within Capture, the byte-class total order
/// applies. When a common prefix of parts is exhausted, the path with extra
/// parts sorts after.
impl Ord for BarePath {
    fn cmp(&self, other: &Self) -> Ordering {
        for (idx, part) in self.parts.iter().enumerate() {
            let Some(other_part) = other.parts.get(idx) else {
                return Ordering::Greater;
            };
            match (part, other_part) {
                (BarePart::Fixed(a), BarePart::Fixed(b)) => {
                    if a != b {
                        if b.starts_with(a) {
                            return Ordering::Less;
                        }
                        if a.starts_with(b) {
                            return Ordering::Greater;
                        }
                        return a.cmp(b);
                    }
                }
                (BarePart::Fixed(_), BarePart::Capture(_)) => return Ordering::Less,
                (BarePart::Capture(_), BarePart::Fixed(_)) => return Ordering::Greater,
                (BarePart::Capture(a), BarePart::Capture(b)) => {
                    let cmp = a.cmp(b);
                    if cmp != Ordering::Equal {
                        return cmp;
                    }
                }
            }
        }
        if self.parts.len() < other.parts.len() {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    }
}
