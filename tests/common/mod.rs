use std::collections::HashMap;
use std::sync::Arc;

use routegen::{FieldInfo, MessageSchema, ScalarKind};

/// Synthetic message schema for exercising the planner without a real
/// descriptor library.
pub struct TestMessage {
    name: String,
    fields: HashMap<String, FieldInfo>,
}

impl TestMessage {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, proto_name: &str, ident: &str, kind: ScalarKind) -> Self {
        self.fields.insert(
            proto_name.to_string(),
            FieldInfo {
                ident: ident.to_string(),
                kind,
                has_presence: false,
                message: None,
            },
        );
        self
    }

    #[allow(dead_code)]
    pub fn with_optional_field(mut self, proto_name: &str, ident: &str, kind: ScalarKind) -> Self {
        self.fields.insert(
            proto_name.to_string(),
            FieldInfo {
                ident: ident.to_string(),
                kind,
                has_presence: true,
                message: None,
            },
        );
        self
    }

    #[allow(dead_code)]
    pub fn with_message_field(
        mut self,
        proto_name: &str,
        ident: &str,
        nested: Arc<dyn MessageSchema>,
    ) -> Self {
        self.fields.insert(
            proto_name.to_string(),
            FieldInfo {
                ident: ident.to_string(),
                kind: ScalarKind::Message(nested.full_name()),
                has_presence: false,
                message: Some(nested),
            },
        );
        self
    }

    pub fn into_schema(self) -> Arc<dyn MessageSchema> {
        Arc::new(self)
    }
}

impl MessageSchema for TestMessage {
    fn full_name(&self) -> String {
        self.name.clone()
    }
    fn find_field(&self, name: &str) -> Option<FieldInfo> {
        self.fields.get(name).cloned()
    }
}
