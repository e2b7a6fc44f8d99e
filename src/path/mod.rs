//! # Path Module
//!
//! URL-path parsing and normalization for endpoint annotations.
//!
//! An annotated path mixes literal segments with `{...}` captures:
//!
//! ```text
//! /path/to/endpoint/entity/id-{proto_field}
//! /path/to/endpoint/entity/id-{^/, proto_field}
//! /path/to/endpoint/entity/{arg_id: 0-9, setWidget(int32, hnd.makeOpt(1))}
//! /path/to/endpoint/entity/id-{param_1 int32}/{param_2 string}/options
//! ```
//!
//! The general capture anatomy is
//!
//! ```text
//! { [capture_name :] [pattern ,] target }
//! ```
//!
//! where `target` is a dotted message-field name, a `func(type, extra, ...)`
//! setter call, or a `name type` handler-parameter pair. `\` escapes the next
//! byte both in fixed segments (for literal braces) and inside captures (for
//! literal `:` and `}`).
//!
//! [`UrlPath::parse`] runs a two-state streaming parser over the raw bytes and
//! yields the ordered part list. Two projections feed the rest of the
//! pipeline: [`UrlPath::canonical_path`] (the registry key, captures rendered
//! as their byte-class hex) and [`UrlPath::bare_path`] (the routing key with
//! capture names and destinations stripped).

mod parser;
mod types;

pub use parser::{CapturePartError, PathParseError};
pub use types::{BarePart, BarePath, CaptureDest, PartKind, PathPart, UrlPath};
