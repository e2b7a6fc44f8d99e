use std::sync::Arc;

use thiserror::Error;

use super::types::{FieldRef, MessageSchema, ScalarKind};

/// Failure to bind a dotted capture path against an input message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("cannot resolve {path}: {prefix} not found in message {message}")]
    PrefixNotFound {
        path: String,
        prefix: String,
        message: String,
    },
    #[error("cannot resolve {path}: {prefix} is not message")]
    NotMessage { path: String, prefix: String },
    #[error("cannot resolve {path}: not found in message {message}")]
    NotFound { path: String, message: String },
    #[error("cannot resolve {path}: method has no input message")]
    NoInputMessage { path: String },
}

/// Resolve a dotted field path (`a.b.c`) against an input message schema.
///
/// Every prefix segment must name a message-kind field of the message reached
/// so far; the terminal segment may be any kind. The returned [`FieldRef`]
/// records the accessor identifier chain, the terminal field kind, and its
/// presence-optionality.
pub fn resolve_field_path(
    root: &Arc<dyn MessageSchema>,
    dotted_name: &str,
) -> Result<FieldRef, ResolveError> {
    let segments: Vec<&str> = dotted_name.split('.').collect();
    let mut ident_path = Vec::with_capacity(segments.len());
    let mut current: Arc<dyn MessageSchema> = Arc::clone(root);

    for idx in 0..segments.len() - 1 {
        let field = current.find_field(segments[idx]).ok_or_else(|| {
            ResolveError::PrefixNotFound {
                path: dotted_name.to_string(),
                prefix: segments[..=idx].join("."),
                message: current.full_name(),
            }
        })?;
        let next = match (&field.kind, field.message) {
            (ScalarKind::Message(_), Some(nested)) => nested,
            _ => {
                return Err(ResolveError::NotMessage {
                    path: dotted_name.to_string(),
                    prefix: segments[..=idx].join("."),
                })
            }
        };
        ident_path.push(field.ident);
        current = next;
    }

    let terminal = segments[segments.len() - 1];
    let field = current
        .find_field(terminal)
        .ok_or_else(|| ResolveError::NotFound {
            path: dotted_name.to_string(),
            message: current.full_name(),
        })?;
    ident_path.push(field.ident);
    Ok(FieldRef {
        ident_path,
        kind: field.kind,
        presence_optional: field.has_presence,
    })
}
