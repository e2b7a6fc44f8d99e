//! # routegen
//!
//! Core of a code-generation plugin that turns service/method declarations
//! (with per-method routing annotations) into an HTTP endpoint routing plan.
//!
//! The pipeline reads service descriptors and routing options from a
//! compiler-driven request and emits:
//!
//! - a normalized set of endpoint paths keyed by HTTP method, with capture
//!   bindings resolved against input-message fields, and
//! - a radix-style prefix tree suitable for dispatch-table generation.
//!
//! This is a compile-time planner: no runtime request dispatch happens here.

pub mod cli;

pub mod endpoint;
pub mod naming;
pub mod path;
pub mod pattern;
pub mod router;
pub mod sanitize;
pub mod schema;

pub use endpoint::{
    EndpointMethod, EndpointPath, EndpointPlanner, EndpointService, MethodBinding, MethodDecl,
    MethodOptions, PathRegistry, RegistrationError, ServiceDecl, ServiceOptions,
};
pub use naming::NamingConvention;
pub use path::{
    BarePart, BarePath, CaptureDest, CapturePartError, PartKind, PathParseError, PathPart, UrlPath,
};
pub use pattern::ByteClass;
pub use router::{RadixNode, RouteTreeError};
pub use schema::{FieldInfo, FieldRef, MessageSchema, ResolveError, ScalarKind};
