use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::naming::NamingConvention;
use crate::router::{RadixNode, RouteTreeError};

use super::registry::PathRegistry;
use super::service::{EndpointMethod, EndpointService, ServiceDecl};

/// Top-level translation of service declarations into the endpoint plan.
///
/// The planner owns the merged [`EndpointService`] rows and the
/// [`PathRegistry`] they export into. Typical driver flow:
///
/// ```rust,ignore
/// let mut planner = EndpointPlanner::new(NamingConvention::KebabCase);
/// for decl in service_decls {
///     planner.add_service(decl);
/// }
/// planner.export();
/// let tree = planner.build_route_tree()?;
/// for endpoint_path in planner.registry_mut().sorted_paths() { /* emit */ }
/// ```
#[derive(Debug)]
pub struct EndpointPlanner {
    naming: NamingConvention,
    services: BTreeMap<String, EndpointService>,
    registry: PathRegistry,
}

impl EndpointPlanner {
    pub fn new(naming: NamingConvention) -> Self {
        Self {
            naming,
            services: BTreeMap::new(),
            registry: PathRegistry::new(),
        }
    }

    /// Merge one declared service: derive defaults, apply option payloads,
    /// and build its method rows. Export happens separately so option merging
    /// over all services completes first.
    pub fn add_service(&mut self, decl: ServiceDecl) {
        let mut service = EndpointService::new(
            &decl.proto_file,
            &decl.import_path,
            &decl.ident,
            decl.parent_ident.as_deref(),
            &self.naming,
        );
        service.set_options(decl.options);
        for method_decl in decl.methods {
            let mut method = EndpointMethod::new(
                &method_decl.ident,
                method_decl.input,
                &self.naming,
                &service.route_ident_middle,
            );
            method.set_options(method_decl.options);
            service.methods.push(method);
        }
        self.services.insert(decl.ident, service);
    }

    /// Export every service's configured endpoints into the registry.
    pub fn export(&mut self) {
        let registry = &mut self.registry;
        for (ident, service) in self.services.iter_mut() {
            let service_url_path = service.url_path.clone();
            for method in &mut service.methods {
                method.export_endpoint_paths(registry, &service_url_path, Some(ident));
            }
            for extra in &mut service.extra_endpoints {
                extra.export_endpoint_paths(registry, &service_url_path, Some(ident));
            }
        }
        info!(
            services = self.services.len(),
            paths = self.registry.paths().len(),
            errors = self.registry.errors().len(),
            "endpoint plan exported"
        );
    }

    pub fn registry(&self) -> &PathRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PathRegistry {
        &mut self.registry
    }

    /// Services that contributed at least one endpoint path, sorted by
    /// identifier.
    pub fn sorted_services(&self) -> Vec<&EndpointService> {
        self.registry
            .service_idents()
            .filter_map(|ident| self.services.get(ident))
            .collect()
    }

    /// Build the dispatch prefix tree from the registered endpoint paths in
    /// sorted order.
    pub fn build_route_tree(&mut self) -> Result<RadixNode, RouteTreeError> {
        let snapshots: Vec<Arc<super::EndpointPath>> = self
            .registry
            .sorted_paths()
            .into_iter()
            .map(|endpoint_path| Arc::new(endpoint_path.clone()))
            .collect();
        let mut root = RadixNode::new_root();
        root.import_paths(snapshots)?;
        Ok(root)
    }
}
