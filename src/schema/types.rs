use std::fmt;
use std::sync::Arc;

/// Scalar taxonomy for capture destinations.
///
/// Mirrors the field kinds a protobuf-style schema can report. The planner
/// only needs enough precision to pick a default byte-class pattern and to
/// tell message-kind fields (which can be traversed) from everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Str,
    Bytes,
    /// Enum type with its qualified name.
    Enum(String),
    /// Message type with its qualified name.
    Message(String),
    /// Repeated field with its element kind.
    List(Box<ScalarKind>),
    /// Map field with key and value kinds.
    Map(Box<ScalarKind>, Box<ScalarKind>),
}

impl ScalarKind {
    /// The type-name key used by the default pattern table, when one exists.
    ///
    /// Enum, message, list, and map kinds have no defaultable pattern and
    /// return `None`.
    pub fn pattern_key(&self) -> Option<&'static str> {
        match self {
            ScalarKind::Bool => Some("bool"),
            ScalarKind::I32 => Some("int32"),
            ScalarKind::U32 => Some("uint32"),
            ScalarKind::I64 => Some("int64"),
            ScalarKind::U64 => Some("uint64"),
            ScalarKind::F32 => Some("float32"),
            ScalarKind::F64 => Some("float64"),
            ScalarKind::Str => Some("string"),
            ScalarKind::Bytes => Some("bytes"),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::Enum(name) => write!(f, "{name}"),
            ScalarKind::Message(name) => write!(f, "{name}"),
            ScalarKind::List(inner) => write!(f, "list<{inner}>"),
            ScalarKind::Map(k, v) => write!(f, "map<{k}, {v}>"),
            other => f.write_str(other.pattern_key().unwrap_or("?")),
        }
    }
}

/// What a descriptor provider reports for a single field.
#[derive(Clone)]
pub struct FieldInfo {
    /// Target-language identifier for the field accessor.
    pub ident: String,
    /// Field type.
    pub kind: ScalarKind,
    /// Whether the field tracks explicit presence (renders as an optional).
    pub has_presence: bool,
    /// Nested message schema, set when `kind` is a message.
    pub message: Option<Arc<dyn MessageSchema>>,
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("ident", &self.ident)
            .field("kind", &self.kind)
            .field("has_presence", &self.has_presence)
            .field("message", &self.message.as_ref().map(|m| m.full_name()))
            .finish()
    }
}

/// Descriptor-provider contract for one message type.
///
/// Implemented by the code-generation driver over whatever descriptor model it
/// uses; the planner only ever looks fields up by their declared name.
pub trait MessageSchema: Send + Sync {
    /// Fully qualified message name, used in error messages only.
    fn full_name(&self) -> String;

    /// Look up a field by its declared (proto) name.
    fn find_field(&self, name: &str) -> Option<FieldInfo>;
}

/// A capture destination resolved against an input message.
///
/// `ident_path` is the chain of target-language accessor identifiers from the
/// input message down to the resolved field, one entry per dotted segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub ident_path: Vec<String>,
    pub kind: ScalarKind,
    /// True when assignment must go through an optional wrapper.
    pub presence_optional: bool,
}
