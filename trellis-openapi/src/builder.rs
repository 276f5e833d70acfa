//! Fluent builder for assembling documents by hand

use crate::spec::*;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Builder for OpenAPI documents.
///
/// The document generator uses this as its starting point; applications can
/// also use it directly to describe endpoints outside the registry.
#[derive(Debug, Clone)]
pub struct OpenApiBuilder {
    document: OpenApiDocument,
}

impl OpenApiBuilder {
    /// Create a builder for a titled document.
    ///
    /// The document version is fixed at "1.0.0" and the OpenAPI version at
    /// "3.1.0".
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            document: OpenApiDocument {
                openapi: "3.1.0".to_string(),
                info: Info {
                    title: title.into(),
                    version: "1.0.0".to_string(),
                    description: None,
                },
                servers: Vec::new(),
                tags: Vec::new(),
                paths: BTreeMap::new(),
            },
        }
    }

    /// Set the document description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.document.info.description = Some(description.into());
        self
    }

    /// Add a server URL
    pub fn server(mut self, url: impl Into<String>) -> Self {
        self.document.servers.push(Server {
            url: url.into(),
            description: None,
        });
        self
    }

    /// Add a tag
    pub fn tag(mut self, name: impl Into<String>, description: Option<String>) -> Self {
        self.document.tags.push(Tag {
            name: name.into(),
            description,
        });
        self
    }

    /// Add a path item
    pub fn path(mut self, path: impl Into<String>, item: PathItem) -> Self {
        self.document.paths.insert(path.into(), item);
        self
    }

    /// Build the document
    pub fn build(self) -> OpenApiDocument {
        self.document
    }
}

/// Helper functions for creating schema fragments
pub fn string_schema() -> Value {
    json!({ "type": "string" })
}

pub fn integer_schema() -> Value {
    json!({ "type": "integer" })
}

pub fn boolean_schema() -> Value {
    json!({ "type": "boolean" })
}

pub fn object_schema(properties: Value, required: &[&str]) -> Value {
    if required.is_empty() {
        json!({ "type": "object", "properties": properties })
    } else {
        json!({ "type": "object", "properties": properties, "required": required })
    }
}

/// Schema of the error envelope every failure response carries.
pub fn error_envelope_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "success": { "type": "boolean" },
            "error": { "type": "string" },
            "details": {}
        },
        "required": ["success", "error"]
    })
}

/// Schema of the success envelope around a response shape.
pub fn success_envelope_schema(data_schema: Value) -> Value {
    json!({
        "type": "object",
        "properties": {
            "success": { "type": "boolean" },
            "data": data_schema
        },
        "required": ["success", "data"]
    })
}
