//! # Schema Module
//!
//! The narrow descriptor-provider contract the routing planner consumes.
//!
//! The planner never depends on a concrete descriptor library. Instead the
//! code-generation driver hands it input messages as [`MessageSchema`] trait
//! objects, and the planner reads fields through [`MessageSchema::find_field`]
//! only. This keeps the core decoupled and makes it straightforward to test
//! with a synthetic schema.
//!
//! ## Key Types
//!
//! - [`MessageSchema`] - provider contract for one message type
//! - [`FieldInfo`] - what a provider reports for one field
//! - [`ScalarKind`] - the field type taxonomy used for capture bindings
//! - [`FieldRef`] - a capture destination resolved against an input message

mod patterns;
mod resolver;
mod types;

pub use patterns::default_pattern_for;
pub use resolver::{resolve_field_path, ResolveError};
pub use types::{FieldInfo, FieldRef, MessageSchema, ScalarKind};
