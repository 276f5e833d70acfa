//! Documentation generator: folds the metadata registry into an OpenAPI
//! document.
//!
//! This is a pure, synchronous projection of declared intent. It reads the
//! registry directly, never the compiled routing table, and shares the
//! defaulting rules with the route compiler through `trellis_core::defaults`,
//! so the documented behavior and the runtime behavior cannot diverge.

use crate::builder::{error_envelope_schema, success_envelope_schema, OpenApiBuilder};
use crate::spec::{
    MediaType, OpenApiDocument, Operation, Parameter, ParameterLocation, RequestBody,
    ResponseObject, Tag,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::warn;
use trellis_core::defaults::{self, RoutePresence};
use trellis_core::registry::{HandlerMetadata, RouteDeclaration};
use trellis_core::{paths, MetadataRegistry};

/// Builds the API document from the registry.
pub struct DocumentBuilder;

impl DocumentBuilder {
    /// Build the document for every eligible owner and route.
    ///
    /// Applies the same skip rule as the route compiler, independently: an
    /// owner with an empty base path or no routes is left out with a
    /// warning. Repeated builds over an unchanged registry yield
    /// structurally identical documents.
    pub fn build(registry: &MetadataRegistry, title: impl Into<String>) -> OpenApiDocument {
        let mut document = OpenApiBuilder::new(title).build();

        for owner in registry.owners() {
            if owner.base_path.is_empty() {
                warn!(owner = %owner.name, "omitting owner without a base path from documentation");
                continue;
            }
            if owner.routes.is_empty() {
                warn!(owner = %owner.name, "omitting owner with no declared routes from documentation");
                continue;
            }

            document.tags.push(Tag {
                name: owner.name.clone(),
                description: None,
            });

            for decl in &owner.routes {
                let full_path = paths::compose(&owner.base_path, &decl.sub_path);
                let documented_path = paths::to_brace_syntax(&full_path);
                let path_params = paths::placeholders(&full_path);
                let meta = registry.metadata(&owner.name, &decl.handler_id);

                let operation = build_operation(&owner.name, decl, meta, &path_params);
                document
                    .paths
                    .entry(documented_path)
                    .or_default()
                    .set(decl.method, operation);
            }
        }

        document
    }
}

fn build_operation(
    owner_name: &str,
    decl: &RouteDeclaration,
    meta: Option<&HandlerMetadata>,
    path_params: &[String],
) -> Operation {
    let name = humanize(&decl.handler_id);
    let mut operation = Operation {
        summary: Some(name.clone()),
        operation_id: Some(name),
        tags: vec![owner_name.to_string()],
        ..Default::default()
    };

    // Path parameters are a pure syntactic rewrite: always required strings
    for param in path_params {
        operation.parameters.push(Parameter {
            name: param.clone(),
            location: ParameterLocation::Path,
            description: None,
            required: Some(true),
            schema: Some(json!({ "type": "string" })),
        });
    }

    let query_shape = meta.and_then(|m| m.query.as_ref());
    let body_shape = meta.and_then(|m| m.body.as_ref());
    let response_shape = meta.and_then(|m| m.response.as_ref());
    let descriptor = meta.and_then(|m| m.middleware.as_ref());

    if let Some(shape) = query_shape {
        operation
            .parameters
            .extend(query_parameters(&shape.schema()));
    }

    if let Some(header) = descriptor.and_then(|d| d.header.as_ref()) {
        operation.parameters.push(Parameter {
            name: header.name.clone(),
            location: ParameterLocation::Header,
            description: Some(header.description.clone()),
            required: Some(true),
            schema: Some(json!({ "type": "string" })),
        });
    }

    if let Some(shape) = body_shape {
        operation.request_body = Some(RequestBody {
            description: None,
            content: json_content(shape.schema()),
            required: Some(true),
        });
    }

    let presence = RoutePresence {
        has_query_shape: query_shape.is_some(),
        has_body_shape: body_shape.is_some(),
        has_middleware: descriptor.is_some(),
        has_path_params: !path_params.is_empty(),
    };
    for (status, description) in defaults::error_responses(presence) {
        operation.responses.insert(
            status.to_string(),
            ResponseObject {
                description: description.to_string(),
                content: Some(json_content(error_envelope_schema())),
            },
        );
    }

    let success_status = defaults::default_status(decl.method);
    let success_response = match response_shape {
        Some(shape) => ResponseObject {
            description: success_description(success_status).to_string(),
            content: Some(json_content(success_envelope_schema(shape.schema()))),
        },
        None => ResponseObject {
            description: success_description(success_status).to_string(),
            content: None,
        },
    };
    operation
        .responses
        .insert(success_status.to_string(), success_response);

    operation
}

/// Expand an object schema's properties into individual query parameters.
fn query_parameters(schema: &Value) -> Vec<Parameter> {
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|properties| {
            properties
                .iter()
                .map(|(name, field_schema)| Parameter {
                    name: name.clone(),
                    location: ParameterLocation::Query,
                    description: None,
                    required: Some(required.contains(&name.as_str())),
                    schema: Some(field_schema.clone()),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn json_content(schema: Value) -> BTreeMap<String, MediaType> {
    let mut content = BTreeMap::new();
    content.insert(
        "application/json".to_string(),
        MediaType {
            schema: Some(schema),
        },
    );
    content
}

fn success_description(status: u16) -> &'static str {
    match status {
        201 => "Resource created",
        204 => "No content",
        _ => "Successful response",
    }
}

/// Derive the human-readable operation name from a handler identifier.
///
/// Splits on capitalization boundaries, capitalizes the first word, and
/// lowercases the rest: "getUserOrders" becomes "Get user orders".
pub fn humanize(handler_id: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in handler_id.chars() {
        if ch.is_uppercase() && !current.is_empty() {
            words.push(current);
            current = String::new();
        }
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }

    let mut out = String::new();
    for (index, word) in words.iter().enumerate() {
        if index > 0 {
            out.push(' ');
            out.push_str(&word.to_lowercase());
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(&chars.as_str().to_lowercase());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use trellis_core::{HttpMethod, Issue, MetadataPatch, MiddlewareDescriptor, Shape};

    struct FixedShape(Value);

    impl Shape for FixedShape {
        fn validate(&self, value: &Value) -> Result<Value, Vec<Issue>> {
            Ok(value.clone())
        }
        fn validate_strict(&self, value: &Value) -> Result<Value, Vec<Issue>> {
            Ok(value.clone())
        }
        fn schema(&self) -> Value {
            self.0.clone()
        }
    }

    fn noop() -> trellis_core::RouteHandlerFn {
        Arc::new(|_req| Box::pin(async { Ok(json!(null)) }))
    }

    fn body_schema() -> Value {
        json!({
            "type": "object",
            "properties": { "name": { "type": "string" } },
            "required": ["name"]
        })
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("getUserOrders"), "Get user orders");
        assert_eq!(humanize("listUsers"), "List users");
        assert_eq!(humanize("delete"), "Delete");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_path_normalization_and_parameters() {
        let mut registry = MetadataRegistry::new();
        registry.register_owner("orders", "/api").unwrap();
        registry
            .declare_route(
                "orders",
                HttpMethod::GET,
                "/users/:id/orders/:orderId",
                "getUserOrders",
                noop(),
            )
            .unwrap();

        let document = DocumentBuilder::build(&registry, "Orders API");
        let item = document
            .paths
            .get("/api/users/{id}/orders/{orderId}")
            .expect("normalized path present");
        let operation = item.operation(HttpMethod::GET).unwrap();

        let path_params: Vec<(&str, bool)> = operation
            .parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Path)
            .map(|p| (p.name.as_str(), p.required == Some(true)))
            .collect();
        assert_eq!(path_params, vec![("id", true), ("orderId", true)]);
        for parameter in &operation.parameters {
            assert_eq!(parameter.schema.as_ref().unwrap()["type"], json!("string"));
        }
    }

    #[test]
    fn test_delete_route_response_map() {
        let mut registry = MetadataRegistry::new();
        registry.register_owner("items", "/items").unwrap();
        registry
            .declare_route("items", HttpMethod::DELETE, "/:id", "deleteItem", noop())
            .unwrap();

        let document = DocumentBuilder::build(&registry, "Items API");
        let operation = document.paths["/items/{id}"]
            .operation(HttpMethod::DELETE)
            .unwrap();

        let statuses: Vec<&str> = operation.responses.keys().map(String::as_str).collect();
        assert_eq!(statuses, vec!["204", "404", "500"]);
        assert!(operation.responses["204"].content.is_none());
        assert!(operation.request_body.is_none());
    }

    #[test]
    fn test_body_and_middleware_route_response_map() {
        let mut registry = MetadataRegistry::new();
        registry.register_owner("users", "/api/users").unwrap();
        registry
            .declare_route("users", HttpMethod::PUT, "/:id", "updateUser", noop())
            .unwrap();
        registry
            .attach_metadata(
                "users",
                "updateUser",
                MetadataPatch::new()
                    .body(Arc::new(FixedShape(body_schema())))
                    .middleware(
                        MiddlewareDescriptor::new()
                            .require_header("Authorization", "JWT bearer token"),
                    ),
            )
            .unwrap();

        let document = DocumentBuilder::build(&registry, "Users API");
        let operation = document.paths["/api/users/{id}"]
            .operation(HttpMethod::PUT)
            .unwrap();

        let statuses: Vec<&str> = operation.responses.keys().map(String::as_str).collect();
        assert_eq!(statuses, vec!["200", "400", "401", "404", "500"]);

        let header = operation
            .parameters
            .iter()
            .find(|p| p.location == ParameterLocation::Header)
            .expect("documented header parameter");
        assert_eq!(header.name, "Authorization");
        assert_eq!(header.required, Some(true));
        assert_eq!(header.description, Some("JWT bearer token".to_string()));

        let body = operation.request_body.as_ref().unwrap();
        assert_eq!(
            body.content["application/json"].schema.as_ref().unwrap()["required"],
            json!(["name"])
        );
    }

    #[test]
    fn test_query_shape_expands_to_parameters() {
        let mut registry = MetadataRegistry::new();
        registry.register_owner("search", "/search").unwrap();
        registry
            .declare_route("search", HttpMethod::GET, "/", "searchItems", noop())
            .unwrap();
        registry
            .attach_metadata(
                "search",
                "searchItems",
                MetadataPatch::new().query(Arc::new(FixedShape(json!({
                    "type": "object",
                    "properties": {
                        "q": { "type": "string" },
                        "page": { "type": "integer" }
                    },
                    "required": ["q"]
                })))),
            )
            .unwrap();

        let document = DocumentBuilder::build(&registry, "Search API");
        let operation = document.paths["/search"].operation(HttpMethod::GET).unwrap();

        let query: Vec<(&str, bool)> = operation
            .parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Query)
            .map(|p| (p.name.as_str(), p.required == Some(true)))
            .collect();
        assert_eq!(query, vec![("page", false), ("q", true)]);
        // Query shape implies a 400 entry even without a body shape
        assert!(operation.responses.contains_key("400"));
    }

    #[test]
    fn test_response_shape_wrapped_in_success_envelope() {
        let mut registry = MetadataRegistry::new();
        registry.register_owner("users", "/api/users").unwrap();
        registry
            .declare_route("users", HttpMethod::POST, "/", "createUser", noop())
            .unwrap();
        registry
            .attach_metadata(
                "users",
                "createUser",
                MetadataPatch::new().response(Arc::new(FixedShape(body_schema()))),
            )
            .unwrap();

        let document = DocumentBuilder::build(&registry, "Users API");
        let operation = document.paths["/api/users"].operation(HttpMethod::POST).unwrap();

        let created = &operation.responses["201"];
        let schema = created.content.as_ref().unwrap()["application/json"]
            .schema
            .as_ref()
            .unwrap();
        assert_eq!(schema["properties"]["success"]["type"], json!("boolean"));
        assert_eq!(
            schema["properties"]["data"]["properties"]["name"]["type"],
            json!("string")
        );
    }

    #[test]
    fn test_sibling_verbs_merge_into_one_path_entry() {
        let mut registry = MetadataRegistry::new();
        registry.register_owner("users", "/api/users").unwrap();
        registry
            .declare_route("users", HttpMethod::GET, "/", "listUsers", noop())
            .unwrap();
        registry
            .declare_route("users", HttpMethod::POST, "/", "createUser", noop())
            .unwrap();

        let document = DocumentBuilder::build(&registry, "Users API");
        assert_eq!(document.paths.len(), 1);
        let item = &document.paths["/api/users"];
        assert!(item.get.is_some());
        assert!(item.post.is_some());
    }

    #[test]
    fn test_skip_rule_matches_compiler() {
        let mut registry = MetadataRegistry::new();
        registry.register_owner("broken", "").unwrap();
        registry
            .declare_route("broken", HttpMethod::GET, "/x", "brokenHandler", noop())
            .unwrap();
        registry.register_owner("empty", "/empty").unwrap();
        registry.register_owner("users", "/api/users").unwrap();
        registry
            .declare_route("users", HttpMethod::GET, "/", "listUsers", noop())
            .unwrap();

        let document = DocumentBuilder::build(&registry, "API");
        assert_eq!(document.paths.len(), 1);
        assert!(document.paths.contains_key("/api/users"));
        let tag_names: Vec<&str> = document.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tag_names, vec!["users"]);
    }

    #[test]
    fn test_build_is_idempotent() {
        let mut registry = MetadataRegistry::new();
        registry.register_owner("users", "/api/users").unwrap();
        registry
            .declare_route("users", HttpMethod::GET, "/:id", "getUser", noop())
            .unwrap();
        registry
            .attach_metadata(
                "users",
                "getUser",
                MetadataPatch::new().response(Arc::new(FixedShape(body_schema()))),
            )
            .unwrap();

        let first = serde_json::to_string(&DocumentBuilder::build(&registry, "API")).unwrap();
        let second = serde_json::to_string(&DocumentBuilder::build(&registry, "API")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_operation_summary_and_id() {
        let mut registry = MetadataRegistry::new();
        registry.register_owner("users", "/api/users").unwrap();
        registry
            .declare_route("users", HttpMethod::GET, "/:id", "getUserById", noop())
            .unwrap();

        let document = DocumentBuilder::build(&registry, "API");
        let operation = document.paths["/api/users/{id}"]
            .operation(HttpMethod::GET)
            .unwrap();
        assert_eq!(operation.summary, Some("Get user by id".to_string()));
        assert_eq!(operation.operation_id, Some("Get user by id".to_string()));
        assert_eq!(operation.tags, vec!["users".to_string()]);
    }
}
