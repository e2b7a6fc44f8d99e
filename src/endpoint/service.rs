use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::Method;

use crate::naming::NamingConvention;
use crate::schema::{resolve_field_path, FieldRef, MessageSchema, ResolveError};

use super::options::{MethodOptions, ServiceOptions};
use super::registry::PathRegistry;

/// One service as declared by the code-generation driver.
pub struct ServiceDecl {
    /// Source file the service was declared in.
    pub proto_file: String,
    /// Import path of the generated code package.
    pub import_path: String,
    /// Service identifier.
    pub ident: String,
    /// Identifier of the enclosing declaration (package or file), if any.
    pub parent_ident: Option<String>,
    pub options: ServiceOptions,
    pub methods: Vec<MethodDecl>,
}

/// One RPC method as declared by the code-generation driver.
pub struct MethodDecl {
    pub ident: String,
    /// Input message schema, read through the descriptor-provider contract.
    pub input: Arc<dyn MessageSchema>,
    pub options: MethodOptions,
}

/// A service with merged options and derived routing defaults.
#[derive(Debug)]
pub struct EndpointService {
    pub proto_file: String,
    pub import_path: String,
    /// Middle segment of route identifiers, shared by all methods.
    pub route_ident_middle: String,
    /// URL-path prefix for all endpoints of this service.
    pub url_path: String,
    /// How many bytes of `url_path` downstream dispatchers must match
    /// exactly; clamped to the path length.
    pub strict_prefix_match_len: usize,
    pub methods: Vec<EndpointMethod>,
    pub extra_endpoints: Vec<EndpointMethod>,
    pub options: ServiceOptions,
}

impl EndpointService {
    /// Build a service with its default URL path: the parent identifier and
    /// the service identifier run through the naming convention, joined with
    /// `.`.
    pub fn new(
        proto_file: &str,
        import_path: &str,
        ident: &str,
        parent_ident: Option<&str>,
        naming: &NamingConvention,
    ) -> Self {
        let mut default_parts = Vec::with_capacity(2);
        if let Some(parent) = parent_ident {
            default_parts.push(naming.convert(parent));
        }
        default_parts.push(naming.convert(ident));
        Self {
            proto_file: proto_file.to_string(),
            import_path: import_path.to_string(),
            route_ident_middle: ident.to_string(),
            url_path: default_parts.join("."),
            strict_prefix_match_len: 0,
            methods: Vec::new(),
            extra_endpoints: Vec::new(),
            options: ServiceOptions::default(),
        }
    }

    /// Merge an option payload: URL-path override, strict-prefix length, and
    /// extra endpoint rows.
    pub fn set_options(&mut self, options: ServiceOptions) {
        self.options = options;
        self.options.normalize_values();
        self.merge_url_path_option();
        self.merge_strict_prefix_match_len_option();
        self.merge_extra_endpoints_options();
    }

    fn merge_url_path_option(&mut self) {
        if self.options.path.is_empty() {
            return;
        }
        self.url_path = self.options.path.clone();
    }

    fn merge_strict_prefix_match_len_option(&mut self) {
        if self.options.strict_prefix_match.is_empty() {
            return;
        }
        let strict_len = self.options.strict_prefix_match.len();
        self.strict_prefix_match_len = strict_len.min(self.url_path.len());
    }

    fn merge_extra_endpoints_options(&mut self) {
        for extra_opts in self.options.extra_endpoints.clone() {
            let extra = EndpointMethod::from_options(extra_opts, &self.route_ident_middle);
            self.extra_endpoints.push(extra);
        }
    }
}

/// A method (or extra endpoint) with merged options and expanded per-verb
/// URL-path parts.
pub struct EndpointMethod {
    pub route_ident_suffix: String,
    pub route_ident_middle: String,
    /// `route_ident_middle + route_ident_suffix`.
    pub route_ident_tail: String,
    /// Path part used when a verb option is `*`.
    pub default_url_path_part: String,

    pub get_url_path_part: String,
    pub post_url_path_part: String,
    pub put_url_path_part: String,
    pub delete_url_path_part: String,
    pub patch_url_path_part: String,

    pub is_extra_endpoint: bool,
    pub options: MethodOptions,

    /// Input message schema; extra endpoints have none.
    pub input: Option<Arc<dyn MessageSchema>>,

    field_ref_cache: HashMap<String, FieldRef>,
}

impl fmt::Debug for EndpointMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointMethod")
            .field("route_ident_tail", &self.route_ident_tail)
            .field("default_url_path_part", &self.default_url_path_part)
            .field("get", &self.get_url_path_part)
            .field("post", &self.post_url_path_part)
            .field("put", &self.put_url_path_part)
            .field("delete", &self.delete_url_path_part)
            .field("patch", &self.patch_url_path_part)
            .field("is_extra_endpoint", &self.is_extra_endpoint)
            .field("input", &self.input.as_ref().map(|m| m.full_name()))
            .finish()
    }
}

impl EndpointMethod {
    /// Build a method row with its default path part derived from the method
    /// identifier via the naming convention.
    pub fn new(
        ident: &str,
        input: Arc<dyn MessageSchema>,
        naming: &NamingConvention,
        route_ident_middle: &str,
    ) -> Self {
        Self {
            route_ident_suffix: ident.to_string(),
            route_ident_middle: route_ident_middle.to_string(),
            route_ident_tail: format!("{route_ident_middle}{ident}"),
            default_url_path_part: naming.convert(ident),
            get_url_path_part: String::new(),
            post_url_path_part: String::new(),
            put_url_path_part: String::new(),
            delete_url_path_part: String::new(),
            patch_url_path_part: String::new(),
            is_extra_endpoint: false,
            options: MethodOptions::default(),
            input: Some(input),
            field_ref_cache: HashMap::new(),
        }
    }

    /// Build an extra-endpoint row directly from an option payload. Extra
    /// endpoints carry no input message and no default path part.
    pub fn from_options(mut options: MethodOptions, route_ident_middle: &str) -> Self {
        options.normalize_values();
        let mut method = Self {
            route_ident_suffix: String::new(),
            route_ident_middle: route_ident_middle.to_string(),
            route_ident_tail: route_ident_middle.to_string(),
            default_url_path_part: String::new(),
            get_url_path_part: String::new(),
            post_url_path_part: String::new(),
            put_url_path_part: String::new(),
            delete_url_path_part: String::new(),
            patch_url_path_part: String::new(),
            is_extra_endpoint: true,
            options,
            input: None,
            field_ref_cache: HashMap::new(),
        };
        method.merge_options();
        method
    }

    /// Merge an option payload: route-identifier override and verb parts.
    pub fn set_options(&mut self, options: MethodOptions) {
        self.options = options;
        self.options.normalize_values();
        self.merge_options();
    }

    fn merge_options(&mut self) {
        self.merge_route_ident_suffix_option();
        self.merge_url_path_parts_options();
    }

    fn merge_route_ident_suffix_option(&mut self) {
        if self.options.ident.is_empty() {
            return;
        }
        self.route_ident_suffix = self.options.ident.clone();
        self.route_ident_tail = format!("{}{}", self.route_ident_middle, self.route_ident_suffix);
    }

    /// Expand one verb option value. Unresolvable aliases come back unchanged
    /// so the iteration below can try again.
    fn expanded_url_path_part(&self, value: &str) -> String {
        if value.is_empty() {
            return String::new();
        }
        if value == "*" {
            return self.default_url_path_part.clone();
        }
        if !value.starts_with('=') {
            return value.to_string();
        }
        let aliased = match value {
            "=get" => &self.get_url_path_part,
            "=post" => &self.post_url_path_part,
            "=put" => &self.put_url_path_part,
            "=delete" => &self.delete_url_path_part,
            "=patch" => &self.patch_url_path_part,
            _ => return value.to_string(),
        };
        if aliased.is_empty() {
            value.to_string()
        } else {
            aliased.clone()
        }
    }

    fn have_unresolved_url_path_part(&self) -> bool {
        [
            &self.get_url_path_part,
            &self.post_url_path_part,
            &self.put_url_path_part,
            &self.delete_url_path_part,
            &self.patch_url_path_part,
        ]
        .iter()
        .any(|part| part.starts_with('='))
    }

    fn merge_url_path_parts_options(&mut self) {
        self.get_url_path_part = self.expanded_url_path_part(&self.options.get.clone());
        self.post_url_path_part = self.expanded_url_path_part(&self.options.post.clone());
        self.put_url_path_part = self.expanded_url_path_part(&self.options.put.clone());
        self.delete_url_path_part = self.expanded_url_path_part(&self.options.delete.clone());
        self.patch_url_path_part = self.expanded_url_path_part(&self.options.patch.clone());
        // Aliases may chain; bounded passes keep cycles from looping forever.
        for _ in 0..5 {
            if !self.have_unresolved_url_path_part() {
                break;
            }
            self.get_url_path_part =
                self.expanded_url_path_part(&self.get_url_path_part.clone());
            self.post_url_path_part =
                self.expanded_url_path_part(&self.post_url_path_part.clone());
            self.put_url_path_part =
                self.expanded_url_path_part(&self.put_url_path_part.clone());
            self.delete_url_path_part =
                self.expanded_url_path_part(&self.delete_url_path_part.clone());
            self.patch_url_path_part =
                self.expanded_url_path_part(&self.patch_url_path_part.clone());
        }
    }

    /// Resolve a dotted capture field path against the input message, with a
    /// per-method cache.
    pub fn find_input_field_ref(&mut self, dotted_name: &str) -> Result<FieldRef, ResolveError> {
        if let Some(cached) = self.field_ref_cache.get(dotted_name) {
            return Ok(cached.clone());
        }
        let input = self
            .input
            .as_ref()
            .ok_or_else(|| ResolveError::NoInputMessage {
                path: dotted_name.to_string(),
            })?;
        let field_ref = resolve_field_path(input, dotted_name)?;
        self.field_ref_cache
            .insert(dotted_name.to_string(), field_ref.clone());
        Ok(field_ref)
    }

    /// Register this method's configured verbs under the service URL path.
    ///
    /// GET through PATCH are direct. HEAD binds to the GET URL and requires
    /// one; OPTIONS binds to every URL exported above and requires at least
    /// one.
    pub(crate) fn export_endpoint_paths(
        &mut self,
        registry: &mut PathRegistry,
        service_url_path: &str,
        service_ident: Option<&str>,
    ) {
        let mut exported_url_paths: Vec<String> = Vec::new();
        let mut exported_get_url_path: Option<String> = None;
        let verb_parts = [
            (Method::GET, self.get_url_path_part.clone()),
            (Method::POST, self.post_url_path_part.clone()),
            (Method::PUT, self.put_url_path_part.clone()),
            (Method::DELETE, self.delete_url_path_part.clone()),
            (Method::PATCH, self.patch_url_path_part.clone()),
        ];
        for (verb, part) in verb_parts {
            if part.is_empty() {
                continue;
            }
            let method_url_path = format!("{service_url_path}/{part}");
            registry.add(&method_url_path, &verb, self, service_ident);
            if verb == Method::GET {
                exported_get_url_path = Some(method_url_path.clone());
            }
            if !exported_url_paths.contains(&method_url_path) {
                exported_url_paths.push(method_url_path);
            }
        }
        if !self.options.head_handler_fn.is_empty() {
            match &exported_get_url_path {
                Some(get_url_path) => {
                    let get_url_path = get_url_path.clone();
                    registry.add(&get_url_path, &Method::HEAD, self, service_ident);
                }
                None => registry.append_error(
                    "?",
                    &Method::HEAD,
                    &self.route_ident_tail,
                    format!(
                        "HEAD handler defined, but GET URL path is not defined: [{}]",
                        self.options.head_handler_fn
                    ),
                ),
            }
        }
        if !self.options.options_handler_fn.is_empty() {
            if exported_url_paths.is_empty() {
                registry.append_error(
                    "?",
                    &Method::OPTIONS,
                    &self.route_ident_tail,
                    format!(
                        "OPTIONS handler defined, but other methods do not have URL path defined: [{}]",
                        self.options.options_handler_fn
                    ),
                );
            }
            for method_url_path in exported_url_paths.clone() {
                registry.add(&method_url_path, &Method::OPTIONS, self, service_ident);
            }
        }
    }
}
