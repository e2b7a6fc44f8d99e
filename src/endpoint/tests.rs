use std::collections::HashMap;
use std::sync::Arc;

use http::Method;

use super::*;
use crate::naming::NamingConvention;
use crate::path::{CaptureDest, PartKind};
use crate::pattern::ByteClass;
use crate::schema::{FieldInfo, MessageSchema, ScalarKind};

struct TestMessage {
    name: String,
    fields: HashMap<String, FieldInfo>,
}

impl MessageSchema for TestMessage {
    fn full_name(&self) -> String {
        self.name.clone()
    }
    fn find_field(&self, name: &str) -> Option<FieldInfo> {
        self.fields.get(name).cloned()
    }
}

fn scalar(ident: &str, kind: ScalarKind) -> FieldInfo {
    FieldInfo {
        ident: ident.to_string(),
        kind,
        has_presence: false,
        message: None,
    }
}

fn user_message() -> Arc<dyn MessageSchema> {
    Arc::new(TestMessage {
        name: "pkg.UserRequest".to_string(),
        fields: HashMap::from([
            ("id".to_string(), scalar("Id", ScalarKind::I64)),
            ("name".to_string(), scalar("Name", ScalarKind::Str)),
            (
                "color".to_string(),
                scalar("Color", ScalarKind::Enum("pkg.Color".to_string())),
            ),
        ]),
    })
}

fn test_method(ident: &str) -> EndpointMethod {
    EndpointMethod::new(ident, user_message(), &NamingConvention::Noop, "UserService")
}

#[test]
fn test_service_default_url_path() {
    let service = EndpointService::new(
        "user.proto",
        "example.com/gen/userpb",
        "UserService",
        Some("UserApi"),
        &NamingConvention::KebabCase,
    );
    assert_eq!(service.url_path, "user-api.user-service");
    assert_eq!(service.route_ident_middle, "UserService");
    assert_eq!(service.strict_prefix_match_len, 0);
}

#[test]
fn test_service_default_url_path_without_parent() {
    let service = EndpointService::new(
        "user.proto",
        "example.com/gen/userpb",
        "UserService",
        None,
        &NamingConvention::SnakeCase,
    );
    assert_eq!(service.url_path, "user_service");
}

#[test]
fn test_service_path_override_and_strict_prefix_clamp() {
    let mut service = EndpointService::new(
        "user.proto",
        "example.com/gen/userpb",
        "UserService",
        None,
        &NamingConvention::Noop,
    );
    service.set_options(ServiceOptions {
        path: "/api/users/".to_string(),
        strict_prefix_match: "/api/users/and/then/some/".to_string(),
        ..Default::default()
    });
    assert_eq!(service.url_path, "api/users");
    // Clamped to the URL path length.
    assert_eq!(service.strict_prefix_match_len, "api/users".len());
}

#[test]
fn test_service_extra_endpoints() {
    let mut service = EndpointService::new(
        "user.proto",
        "example.com/gen/userpb",
        "UserService",
        None,
        &NamingConvention::Noop,
    );
    service.set_options(ServiceOptions {
        extra_endpoints: vec![MethodOptions {
            ident: "Health".to_string(),
            get: "health".to_string(),
            ..Default::default()
        }],
        ..Default::default()
    });
    assert_eq!(service.extra_endpoints.len(), 1);
    let extra = &service.extra_endpoints[0];
    assert!(extra.is_extra_endpoint);
    assert_eq!(extra.route_ident_tail, "UserServiceHealth");
    assert_eq!(extra.get_url_path_part, "health");
    assert!(extra.input.is_none());
}

#[test]
fn test_method_defaults_and_ident_override() {
    let mut method = EndpointMethod::new(
        "GetUser",
        user_message(),
        &NamingConvention::KebabCase,
        "UserService",
    );
    assert_eq!(method.route_ident_tail, "UserServiceGetUser");
    assert_eq!(method.default_url_path_part, "get-user");

    method.set_options(MethodOptions {
        ident: "Fetch".to_string(),
        ..Default::default()
    });
    assert_eq!(method.route_ident_suffix, "Fetch");
    assert_eq!(method.route_ident_tail, "UserServiceFetch");
}

#[test]
fn test_verb_expansion_star_and_aliases() {
    let mut method = test_method("create");
    method.set_options(MethodOptions {
        get: "*".to_string(),
        post: "=get".to_string(),
        put: "=post".to_string(),
        ..Default::default()
    });
    assert_eq!(method.get_url_path_part, "create");
    assert_eq!(method.post_url_path_part, "create");
    assert_eq!(method.put_url_path_part, "create");
    assert_eq!(method.delete_url_path_part, "");
}

#[test]
fn test_verb_expansion_forward_alias_needs_iteration() {
    let mut method = test_method("create");
    method.set_options(MethodOptions {
        get: "=post".to_string(),
        post: "*".to_string(),
        ..Default::default()
    });
    assert_eq!(method.get_url_path_part, "create");
    assert_eq!(method.post_url_path_part, "create");
}

#[test]
fn test_verb_expansion_unknown_alias_survives() {
    let mut method = test_method("create");
    method.set_options(MethodOptions {
        get: "=head".to_string(),
        ..Default::default()
    });
    assert_eq!(method.get_url_path_part, "=head");
}

#[test]
fn test_registry_add_literal_path() {
    let mut registry = PathRegistry::new();
    let mut method = test_method("list");
    registry.add("/users/list", &Method::GET, &mut method, Some("UserService"));

    assert!(registry.errors().is_empty());
    assert_eq!(registry.paths().len(), 1);
    let endpoint_path = &registry.paths()["users/list"];
    let binding = endpoint_path.binding(&Method::GET).unwrap();
    assert_eq!(binding.route_ident, "UserServicelist");
    assert_eq!(binding.url_path.raw_text(), "users/list");
    assert_eq!(
        registry.service_idents().collect::<Vec<_>>(),
        vec!["UserService"]
    );
    assert_eq!(registry.traces().len(), 1);
}

#[test]
fn test_registry_field_capture_default_pattern() {
    let mut registry = PathRegistry::new();
    let mut method = test_method("get");
    registry.add("/users/{id}", &Method::GET, &mut method, None);

    assert!(registry.errors().is_empty());
    assert_eq!(registry.paths().len(), 1);
    let endpoint_path = registry.paths().values().next().unwrap();
    let binding = endpoint_path.binding(&Method::GET).unwrap();
    let PartKind::Capture {
        pattern, dest, ..
    } = &binding.url_path.parts[1].kind
    else {
        panic!("expected capture part");
    };
    assert_eq!(*pattern, ByteClass::from_pattern(b"0-9+\\-"));
    let CaptureDest::Field {
        dotted_name,
        resolved: Some(field_ref),
    } = dest
    else {
        panic!("expected resolved field dest");
    };
    assert_eq!(dotted_name, "id");
    assert_eq!(field_ref.kind, ScalarKind::I64);
    assert_eq!(field_ref.ident_path, vec!["Id"]);
    assert!(registry.check_paths().is_ok());
}

#[test]
fn test_registry_string_capture_default_pattern() {
    let mut registry = PathRegistry::new();
    let mut method = test_method("get");
    registry.add("/users/by-name/{name}", &Method::GET, &mut method, None);

    assert!(registry.errors().is_empty());
    let endpoint_path = registry.paths().values().next().unwrap();
    let binding = endpoint_path.binding(&Method::GET).unwrap();
    let PartKind::Capture { pattern, .. } = &binding.url_path.parts[1].kind else {
        panic!("expected capture part");
    };
    assert!(pattern.contains(b'a'));
    assert!(!pattern.contains(b'/'));
}

#[test]
fn test_registry_duplicate_verb_binding() {
    let mut registry = PathRegistry::new();
    let mut list = test_method("list");
    let mut other = test_method("other");
    registry.add("/a/b", &Method::GET, &mut list, None);
    registry.add("/a/b", &Method::GET, &mut other, None);

    assert_eq!(registry.paths().len(), 1);
    assert_eq!(registry.errors().len(), 1);
    assert!(registry.errors()[0]
        .message
        .contains("duplicate endpoint path"));
    // The first binding wins.
    let binding = registry.paths()["a/b"].binding(&Method::GET).unwrap();
    assert_eq!(binding.route_ident, "UserServicelist");
}

#[test]
fn test_registry_same_path_different_verbs() {
    let mut registry = PathRegistry::new();
    let mut method = test_method("item");
    registry.add("/a/b", &Method::GET, &mut method, None);
    registry.add("/a/b", &Method::POST, &mut method, None);

    assert!(registry.errors().is_empty());
    assert_eq!(registry.paths().len(), 1);
    let endpoint_path = &registry.paths()["a/b"];
    assert!(endpoint_path.binding(&Method::GET).is_some());
    assert!(endpoint_path.binding(&Method::POST).is_some());
}

#[test]
fn test_registry_unsupported_verb() {
    let mut registry = PathRegistry::new();
    let mut method = test_method("trace");
    registry.add("/a/b", &Method::TRACE, &mut method, None);

    assert!(registry.paths().is_empty());
    assert_eq!(registry.errors().len(), 1);
    assert!(registry.errors()[0].message.contains("unsupported method"));
}

#[test]
fn test_registry_parse_failure_skips_path() {
    let mut registry = PathRegistry::new();
    let mut method = test_method("get");
    registry.add("/users/{open", &Method::GET, &mut method, None);

    assert!(registry.paths().is_empty());
    assert_eq!(registry.errors().len(), 1);
    assert!(registry.errors()[0]
        .message
        .contains("parse URL path failed"));
}

#[test]
fn test_registry_unresolved_field_with_pattern_still_registers() {
    let mut registry = PathRegistry::new();
    let mut method = test_method("get");
    registry.add("/u/{x: 0-9, missing}", &Method::GET, &mut method, None);

    assert_eq!(registry.errors().len(), 1);
    assert!(registry.errors()[0]
        .message
        .contains("resolve capture dest field failed"));
    // Registered with the destination left unresolved.
    assert_eq!(registry.paths().len(), 1);
    let err = registry.check_paths().unwrap_err();
    assert!(err.contains("unresolved capture dest"));
}

#[test]
fn test_registry_unresolved_field_without_pattern_aborts() {
    let mut registry = PathRegistry::new();
    let mut method = test_method("get");
    registry.add("/u/{missing}", &Method::GET, &mut method, None);

    assert!(registry.paths().is_empty());
    let messages: Vec<&str> = registry
        .errors()
        .iter()
        .map(|err| err.message.as_str())
        .collect();
    assert!(messages
        .iter()
        .any(|m| m.contains("resolve capture dest field failed")));
    assert!(messages
        .iter()
        .any(|m| m.contains("cannot guess capture part type")));
}

#[test]
fn test_registry_enum_field_has_no_guessable_pattern() {
    let mut registry = PathRegistry::new();
    let mut method = test_method("get");
    registry.add("/u/{color}", &Method::GET, &mut method, None);

    assert!(registry.paths().is_empty());
    assert!(registry
        .errors()
        .iter()
        .any(|err| err.message.contains("empty guess type pattern")));
}

#[test]
fn test_registry_setter_capture_pattern_from_arg0() {
    let mut registry = PathRegistry::new();
    let mut method = test_method("set");
    registry.add("/u/{setWidget(uint32)}", &Method::PUT, &mut method, None);

    assert!(registry.errors().is_empty());
    let endpoint_path = registry.paths().values().next().unwrap();
    let binding = endpoint_path.binding(&Method::PUT).unwrap();
    let PartKind::Capture { pattern, .. } = &binding.url_path.parts[1].kind else {
        panic!("expected capture part");
    };
    assert_eq!(*pattern, ByteClass::from_pattern(b"0-9"));
}

#[test]
fn test_export_head_requires_get() {
    let mut registry = PathRegistry::new();
    let mut method = test_method("item");
    method.set_options(MethodOptions {
        post: "*".to_string(),
        head_handler_fn: "hnd.Head".to_string(),
        ..Default::default()
    });
    method.export_endpoint_paths(&mut registry, "svc", None);

    assert_eq!(registry.errors().len(), 1);
    assert_eq!(registry.errors()[0].verb, Method::HEAD);
    assert!(registry.errors()[0].message.contains("GET URL path"));
    // POST itself still registered; no HEAD binding anywhere.
    assert_eq!(registry.paths().len(), 1);
    assert!(registry
        .paths()
        .values()
        .all(|p| p.binding(&Method::HEAD).is_none()));
}

#[test]
fn test_export_head_binds_to_get_url() {
    let mut registry = PathRegistry::new();
    let mut method = test_method("item");
    method.set_options(MethodOptions {
        get: "*".to_string(),
        head_handler_fn: "hnd.Head".to_string(),
        ..Default::default()
    });
    method.export_endpoint_paths(&mut registry, "svc", None);

    assert!(registry.errors().is_empty());
    let endpoint_path = &registry.paths()["svc/item"];
    assert!(endpoint_path.binding(&Method::GET).is_some());
    assert!(endpoint_path.binding(&Method::HEAD).is_some());
}

#[test]
fn test_export_options_requires_some_verb() {
    let mut registry = PathRegistry::new();
    let mut method = test_method("item");
    method.set_options(MethodOptions {
        options_handler_fn: "hnd.Opts".to_string(),
        ..Default::default()
    });
    method.export_endpoint_paths(&mut registry, "svc", None);

    assert_eq!(registry.errors().len(), 1);
    assert_eq!(registry.errors()[0].verb, Method::OPTIONS);
    assert!(registry.paths().is_empty());
}

#[test]
fn test_export_options_binds_to_each_exported_url() {
    let mut registry = PathRegistry::new();
    let mut method = test_method("item");
    method.set_options(MethodOptions {
        get: "*".to_string(),
        delete: "remove".to_string(),
        options_handler_fn: "hnd.Opts".to_string(),
        ..Default::default()
    });
    method.export_endpoint_paths(&mut registry, "svc", None);

    assert!(registry.errors().is_empty());
    assert!(registry.paths()["svc/item"]
        .binding(&Method::OPTIONS)
        .is_some());
    assert!(registry.paths()["svc/remove"]
        .binding(&Method::OPTIONS)
        .is_some());
}

#[test]
fn test_sorted_paths_order() {
    let mut registry = PathRegistry::new();
    let mut method = test_method("m");
    registry.add("/b", &Method::GET, &mut method, None);
    registry.add("/a/c", &Method::GET, &mut method, None);
    registry.add("/a", &Method::GET, &mut method, None);

    let order: Vec<String> = registry
        .sorted_paths()
        .iter()
        .map(|p| p.bare_path.canonical_path())
        .collect();
    assert_eq!(order, vec!["a", "a/c", "b"]);
}

#[test]
fn test_planner_end_to_end_sorted_services() {
    let mut planner = EndpointPlanner::new(NamingConvention::KebabCase);
    planner.add_service(ServiceDecl {
        proto_file: "user.proto".to_string(),
        import_path: "example.com/gen/userpb".to_string(),
        ident: "UserService".to_string(),
        parent_ident: None,
        options: ServiceOptions::default(),
        methods: vec![MethodDecl {
            ident: "List".to_string(),
            input: user_message(),
            options: MethodOptions {
                get: "*".to_string(),
                ..Default::default()
            },
        }],
    });
    planner.add_service(ServiceDecl {
        proto_file: "admin.proto".to_string(),
        import_path: "example.com/gen/adminpb".to_string(),
        ident: "AdminService".to_string(),
        parent_ident: None,
        options: ServiceOptions::default(),
        methods: vec![MethodDecl {
            ident: "Reset".to_string(),
            input: user_message(),
            options: MethodOptions {
                post: "*".to_string(),
                ..Default::default()
            },
        }],
    });
    planner.export();

    assert!(planner.registry().errors().is_empty());
    let idents: Vec<&str> = planner
        .sorted_services()
        .iter()
        .map(|s| s.route_ident_middle.as_str())
        .collect();
    assert_eq!(idents, vec!["AdminService", "UserService"]);

    let tree = planner.build_route_tree().unwrap();
    assert_eq!(tree.children().len(), 2);
}
