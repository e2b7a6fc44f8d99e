use std::collections::{BTreeSet, HashMap};
use std::fmt;

use http::Method;
use tracing::debug;

use crate::path::{BarePath, CaptureDest, PartKind, UrlPath};
use crate::sanitize::lossy_text;
use crate::schema::default_pattern_for;

use super::service::EndpointMethod;

/// Fixed emission order for per-verb bindings in diagnostics.
const VERB_ORDER: [(&str, Method); 7] = [
    ("get", Method::GET),
    ("post", Method::POST),
    ("put", Method::PUT),
    ("delete", Method::DELETE),
    ("patch", Method::PATCH),
    ("head", Method::HEAD),
    ("options", Method::OPTIONS),
];

fn is_supported_verb(verb: &Method) -> bool {
    VERB_ORDER.iter().any(|(_, supported)| supported == verb)
}

/// One verb's binding on an endpoint path: the parsed URL path it was
/// registered with and the route identifier of the owning method.
#[derive(Debug, Clone)]
pub struct MethodBinding {
    pub url_path: UrlPath,
    pub route_ident: String,
}

impl fmt::Display for MethodBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]({})", self.url_path.raw_text(), self.route_ident)
    }
}

/// One row of the endpoint plan: a routing shape plus its per-verb bindings.
#[derive(Debug, Clone, Default)]
pub struct EndpointPath {
    pub bare_path: BarePath,
    pub bindings: HashMap<Method, MethodBinding>,
}

impl EndpointPath {
    pub fn binding(&self, verb: &Method) -> Option<&MethodBinding> {
        self.bindings.get(verb)
    }
}

impl fmt::Display for EndpointPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{EndpointPath:{};", self.bare_path.canonical_path())?;
        for (idx, (label, verb)) in VERB_ORDER.iter().enumerate() {
            let sep = if idx == 0 { " " } else { ", " };
            match self.bindings.get(verb) {
                Some(binding) => write!(f, "{sep}{label}={binding}")?,
                None => write!(f, "{sep}{label}=<none>")?,
            }
        }
        write!(f, "}}")
    }
}

/// One accumulated registration failure.
#[derive(Debug, Clone)]
pub struct RegistrationError {
    pub url_path: String,
    pub verb: Method,
    pub route_ident: String,
    pub message: String,
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] ({}): {}",
            self.url_path, self.verb, self.route_ident, self.message
        )
    }
}

/// Endpoint-path collection keyed by canonical path.
///
/// Every mutation goes through [`PathRegistry::add`], which parses the path,
/// resolves capture destinations, guesses default patterns for empty capture
/// classes, and then binds the verb on the matching row. Failures are
/// appended to the error list; the registry itself never panics. The error
/// list is the definitive semantic report for the whole plan.
#[derive(Debug, Default)]
pub struct PathRegistry {
    paths: HashMap<String, EndpointPath>,
    errors: Vec<RegistrationError>,
    traces: Vec<String>,
    service_idents: BTreeSet<String>,
    sorted_keys: Option<Vec<String>>,
}

impl PathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a registration failure.
    pub(crate) fn append_error(
        &mut self,
        url_path: &str,
        verb: &Method,
        route_ident: &str,
        message: String,
    ) {
        self.errors.push(RegistrationError {
            url_path: url_path.to_string(),
            verb: verb.clone(),
            route_ident: route_ident.to_string(),
            message,
        });
    }

    /// Parse `url_path` and bind it to `verb` for `method`.
    ///
    /// A parse failure aborts this registration only. Capture-resolution
    /// failures are recorded per part while the remaining parts are still
    /// attempted, and the path is registered with the unresolved destinations
    /// left empty; only a capture whose pattern cannot be determined at all
    /// aborts the registration, since its canonical key would be degenerate.
    /// Re-binding a (canonical path, verb) pair records a duplicate error and
    /// keeps the first binding.
    pub fn add(
        &mut self,
        url_path: &str,
        verb: &Method,
        method: &mut EndpointMethod,
        service_ident: Option<&str>,
    ) {
        self.traces
            .push(format!("{url_path}\t[{verb}]\t{}", method.route_ident_tail));
        debug!(url_path, verb = %verb, route_ident = %method.route_ident_tail, "register endpoint path");
        if !is_supported_verb(verb) {
            let message = format!("unsupported method: [{verb}]");
            self.append_error(url_path, verb, &method.route_ident_tail, message);
            return;
        }
        let Some(parsed) = self.parse_url_path_with_method(url_path, verb, method) else {
            return;
        };
        let canonical_path = parsed.canonical_path();
        let route_ident = method.route_ident_tail.clone();
        let raw_text = parsed.raw_text();
        let duplicate = {
            let entry = self
                .paths
                .entry(canonical_path)
                .or_insert_with(|| EndpointPath {
                    bare_path: parsed.bare_path(),
                    bindings: HashMap::new(),
                });
            if entry.bindings.contains_key(verb) {
                true
            } else {
                entry.bindings.insert(
                    verb.clone(),
                    MethodBinding {
                        url_path: parsed,
                        route_ident: route_ident.clone(),
                    },
                );
                false
            }
        };
        if duplicate {
            let message = format!("duplicate endpoint path: [{raw_text}]");
            self.append_error(url_path, verb, &route_ident, message);
            return;
        }
        if let Some(ident) = service_ident {
            self.service_idents.insert(ident.to_string());
        }
        self.sorted_keys = None;
    }

    /// Parse and bind captures; `None` means the registration was aborted and
    /// the reason recorded.
    fn parse_url_path_with_method(
        &mut self,
        url_path: &str,
        verb: &Method,
        method: &mut EndpointMethod,
    ) -> Option<UrlPath> {
        let route_ident = method.route_ident_tail.clone();
        let mut parsed = match UrlPath::parse(url_path) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.append_error(
                    url_path,
                    verb,
                    &route_ident,
                    format!("parse URL path failed: {err}"),
                );
                return None;
            }
        };
        let mut abort = false;
        for part in parsed.parts.iter_mut() {
            let raw_part = lossy_text(&part.raw);
            let PartKind::Capture { pattern, dest, .. } = &mut part.kind else {
                continue;
            };
            if let CaptureDest::Field {
                dotted_name,
                resolved,
            } = dest
            {
                match method.find_input_field_ref(dotted_name) {
                    Ok(field_ref) => *resolved = Some(field_ref),
                    Err(err) => self.errors.push(RegistrationError {
                        url_path: url_path.to_string(),
                        verb: verb.clone(),
                        route_ident: route_ident.clone(),
                        message: format!("resolve capture dest field failed: {err}"),
                    }),
                }
            }
            if !pattern.is_empty() {
                continue;
            }
            let target_type = match dest {
                CaptureDest::Field {
                    resolved: Some(field_ref),
                    ..
                } => Some(field_ref.kind.to_string()),
                CaptureDest::Field { resolved: None, .. } => None,
                CaptureDest::Setter { arg0_type, .. } => Some(arg0_type.clone()),
                CaptureDest::HandlerParam { type_name, .. } => Some(type_name.clone()),
            };
            let Some(target_type) = target_type else {
                self.errors.push(RegistrationError {
                    url_path: url_path.to_string(),
                    verb: verb.clone(),
                    route_ident: route_ident.clone(),
                    message: format!("cannot guess capture part type: [{raw_part}]"),
                });
                abort = true;
                continue;
            };
            match default_pattern_for(&target_type) {
                Some(guessed) => {
                    pattern.apply_pattern(guessed);
                }
                None => {
                    self.errors.push(RegistrationError {
                        url_path: url_path.to_string(),
                        verb: verb.clone(),
                        route_ident: route_ident.clone(),
                        message: format!(
                            "empty guess type pattern for type: [{target_type}] in [{raw_part}]"
                        ),
                    });
                    abort = true;
                }
            }
        }
        if abort {
            None
        } else {
            Some(parsed)
        }
    }

    /// All accumulated registration failures; non-empty means the input was
    /// semantically invalid.
    pub fn errors(&self) -> &[RegistrationError] {
        &self.errors
    }

    /// One line per add attempt, for debug dumps.
    pub fn traces(&self) -> &[String] {
        &self.traces
    }

    /// The raw canonical-path map.
    pub fn paths(&self) -> &HashMap<String, EndpointPath> {
        &self.paths
    }

    /// Identifiers of services that contributed at least one endpoint path,
    /// in sorted order.
    pub fn service_idents(&self) -> impl Iterator<Item = &str> {
        self.service_idents.iter().map(String::as_str)
    }

    /// Endpoint paths in bare-path order. The sort is cached and invalidated
    /// on every successful add.
    pub fn sorted_paths(&mut self) -> Vec<&EndpointPath> {
        if self.sorted_keys.is_none() {
            let mut keyed: Vec<(&String, &EndpointPath)> = self.paths.iter().collect();
            keyed.sort_by(|a, b| a.1.bare_path.cmp(&b.1.bare_path));
            let keys = keyed.into_iter().map(|(key, _)| key.clone()).collect();
            self.sorted_keys = Some(keys);
        }
        self.sorted_keys
            .as_ref()
            .expect("cache populated above")
            .iter()
            .filter_map(|key| self.paths.get(key))
            .collect()
    }

    /// Completeness check for downstream emission: every field capture of
    /// every registered binding must have resolved.
    pub fn check_paths(&self) -> Result<(), String> {
        for endpoint_path in self.paths.values() {
            for binding in endpoint_path.bindings.values() {
                for (idx, part) in binding.url_path.parts.iter().enumerate() {
                    if let PartKind::Capture {
                        dest: CaptureDest::Field { resolved: None, .. },
                        ..
                    } = &part.kind
                    {
                        return Err(format!(
                            "unresolved capture dest for [{}]: ({}) [{}]",
                            binding.url_path.raw_text(),
                            idx,
                            lossy_text(&part.raw)
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}
