use serde::{Deserialize, Serialize};

use crate::sanitize::trim_url_path_part;

/// Per-service routing option payload, as supplied by the driver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceOptions {
    /// Override for the service URL path.
    pub path: String,
    /// Prefix of the URL path that downstream dispatchers must match exactly.
    pub strict_prefix_match: String,
    /// Method-like endpoint rows attached to the service without an RPC
    /// method behind them.
    pub extra_endpoints: Vec<MethodOptions>,
}

impl ServiceOptions {
    /// Sanitize option values in place before merging.
    pub fn normalize_values(&mut self) {
        self.path = trim_url_path_part(&self.path);
        self.strict_prefix_match = trim_url_path_part(&self.strict_prefix_match);
        for extra in &mut self.extra_endpoints {
            extra.normalize_values();
        }
    }
}

/// Per-method routing option payload.
///
/// The five verb strings use a small expansion language: empty disables the
/// verb, `*` expands to the method's default path part, and `=get` / `=post` /
/// `=put` / `=delete` / `=patch` alias whichever of those is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodOptions {
    /// Override for the route identifier suffix.
    pub ident: String,
    pub get: String,
    pub post: String,
    pub put: String,
    pub delete: String,
    pub patch: String,
    /// Handler identifier enabling HEAD registration on the GET URL.
    pub head_handler_fn: String,
    /// Handler identifier enabling OPTIONS registration on every exported URL.
    pub options_handler_fn: String,
}

impl MethodOptions {
    /// Sanitize option values in place before merging.
    pub fn normalize_values(&mut self) {
        self.ident = self.ident.trim().to_string();
    }
}
