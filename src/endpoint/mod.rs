//! # Endpoint Module
//!
//! Translation of service/method declarations into the endpoint-path plan.
//!
//! The code-generation driver feeds [`ServiceDecl`]/[`MethodDecl`] rows (with
//! their routing option payloads) to an [`EndpointPlanner`]. The planner
//! derives default URL paths via the configured naming convention, expands
//! the per-verb option language, and registers one endpoint path per
//! configured verb in a [`PathRegistry`]. The registry keys rows by canonical
//! path, accumulates every semantic error instead of panicking, and exposes
//! sorted views for deterministic code emission.
//!
//! ## Data Flow
//!
//! ```text
//! ServiceDecl/MethodDecl ── defaults + option expansion ──> path strings
//!     path strings ── UrlPath::parse ──> parts with unresolved captures
//!     captures ── schema::resolve_field_path ──> bound FieldRefs
//!     paths ── PathRegistry ──> EndpointPath rows keyed by canonical path
//!     rows ── router::RadixNode ──> dispatch prefix tree
//! ```

mod options;
mod planner;
mod registry;
mod service;
#[cfg(test)]
mod tests;

pub use options::{MethodOptions, ServiceOptions};
pub use planner::EndpointPlanner;
pub use registry::{EndpointPath, MethodBinding, PathRegistry, RegistrationError};
pub use service::{EndpointMethod, EndpointService, MethodDecl, ServiceDecl};
