//! Route compiler: folds the metadata registry into a live routing table.
//!
//! Each compiled handler runs the full dispatch pipeline (inbound
//! validation, attached middleware in declared order, the user handler,
//! outbound validation) and shapes the outcome into one of the two wire
//! envelopes. Compiled handlers are total: no failure, declared or not,
//! escapes to the transport.

use crate::middleware::{self, MiddlewareChain};
use crate::registry::{HandlerMetadata, MetadataRegistry, RouteHandlerFn};
use crate::{defaults, envelope, paths, pipeline, Error, HttpMethod, HttpRequest, HttpResponse};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Type alias for the future a compiled handler returns
pub type CompiledFuture = Pin<Box<dyn Future<Output = HttpResponse> + Send>>;

/// Type alias for compiled (total) handler functions
pub type CompiledHandlerFn = Arc<dyn Fn(HttpRequest) -> CompiledFuture + Send + Sync>;

/// One entry of the compiled routing table.
pub struct CompiledRoute {
    pub method: HttpMethod,
    pub path: String,
    pub handler: CompiledHandlerFn,
}

impl std::fmt::Debug for CompiledRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish()
    }
}

/// Compiles the registry into routes ready for registration with a router.
pub struct RouteCompiler;

impl RouteCompiler {
    /// Compile every eligible declaration, in registration/declaration order.
    ///
    /// An owner with an empty base path or an empty route list is skipped
    /// with a warning; the rest of the registry is unaffected.
    pub fn compile(registry: &MetadataRegistry) -> Vec<CompiledRoute> {
        let mut compiled = Vec::new();
        for owner in registry.owners() {
            if owner.base_path.is_empty() {
                warn!(owner = %owner.name, "skipping owner without a base path");
                continue;
            }
            if owner.routes.is_empty() {
                warn!(owner = %owner.name, "skipping owner with no declared routes");
                continue;
            }
            for decl in &owner.routes {
                let meta = registry
                    .metadata(&owner.name, &decl.handler_id)
                    .cloned()
                    .unwrap_or_default();
                let path = paths::compose(&owner.base_path, &decl.sub_path);
                let handler =
                    wrap_handler(path.clone(), decl.method, decl.handler.clone(), Arc::new(meta));
                compiled.push(CompiledRoute {
                    method: decl.method,
                    path,
                    handler,
                });
            }
        }
        compiled
    }
}

/// Build the total handler for one route.
fn wrap_handler(
    path: String,
    method: HttpMethod,
    handler: RouteHandlerFn,
    meta: Arc<HandlerMetadata>,
) -> CompiledHandlerFn {
    let chain = MiddlewareChain::from_descriptor(meta.middleware.as_ref());
    let success_status = defaults::default_status(method);

    Arc::new(move |req: HttpRequest| {
        let handler = handler.clone();
        let meta = meta.clone();
        let chain = chain.clone();
        let path = path.clone();

        Box::pin(async move {
            let started = Instant::now();
            let client = req.remote_addr.clone().unwrap_or_else(|| "-".to_string());

            let outcome = dispatch_one(req, &chain, handler, meta, success_status).await;
            let response = match outcome {
                Ok(response) => response,
                Err(err) => envelope::error_response(&err),
            };

            info!(
                target: "trellis::access",
                client = %client,
                method = %method.as_str(),
                path = %path,
                status = response.status,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "request dispatched"
            );
            response
        })
    })
}

async fn dispatch_one(
    mut req: HttpRequest,
    chain: &MiddlewareChain,
    handler: RouteHandlerFn,
    meta: Arc<HandlerMetadata>,
    success_status: u16,
) -> Result<HttpResponse, Error> {
    pipeline::validate_inbound(&meta, &mut req)?;

    let inner: middleware::HandlerFn = Arc::new(move |req: HttpRequest| {
        let handler = handler.clone();
        let meta = meta.clone();
        Box::pin(async move {
            let value = handler(req).await?;
            let value = pipeline::validate_outbound(&meta, value)?;
            Ok(if success_status == 204 {
                HttpResponse::no_content()
            } else {
                HttpResponse::new(success_status).with_json_value(&envelope::success(&value))
            })
        })
    });

    chain.apply(req, inner).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MetadataPatch;
    use crate::schema::{Issue, Shape};
    use serde_json::{json, Value};

    fn value_handler(value: Value) -> RouteHandlerFn {
        Arc::new(move |_req| {
            let value = value.clone();
            Box::pin(async move { Ok(value) })
        })
    }

    fn failing_handler(err_fn: fn() -> Error) -> RouteHandlerFn {
        Arc::new(move |_req| Box::pin(async move { Err(err_fn()) }))
    }

    struct RejectEverything;

    impl Shape for RejectEverything {
        fn validate(&self, _value: &Value) -> Result<Value, Vec<Issue>> {
            Err(vec![Issue::new("", "rejected")])
        }
        fn validate_strict(&self, _value: &Value) -> Result<Value, Vec<Issue>> {
            Err(vec![Issue::new("", "rejected")])
        }
        fn schema(&self) -> Value {
            json!({})
        }
    }

    #[test]
    fn test_one_compiled_entry_per_declaration() {
        let mut registry = MetadataRegistry::new();
        registry.register_owner("users", "/api/users").unwrap();
        registry
            .declare_route("users", HttpMethod::GET, "/", "listUsers", value_handler(json!([])))
            .unwrap();
        registry
            .declare_route(
                "users",
                HttpMethod::POST,
                "/",
                "createUser",
                value_handler(json!({})),
            )
            .unwrap();

        let compiled = RouteCompiler::compile(&registry);
        assert_eq!(compiled.len(), 2);
        assert_eq!(compiled[0].path, "/api/users");
        assert_eq!(compiled[0].method, HttpMethod::GET);
        assert_eq!(compiled[1].method, HttpMethod::POST);
    }

    #[test]
    fn test_misconfigured_owner_skipped_without_affecting_others() {
        let mut registry = MetadataRegistry::new();
        registry.register_owner("broken", "").unwrap();
        registry
            .declare_route("broken", HttpMethod::GET, "/x", "handler", value_handler(json!(1)))
            .unwrap();
        registry.register_owner("empty", "/empty").unwrap();
        registry.register_owner("users", "/api/users").unwrap();
        registry
            .declare_route("users", HttpMethod::GET, "/", "listUsers", value_handler(json!([])))
            .unwrap();

        let compiled = RouteCompiler::compile(&registry);
        assert_eq!(compiled.len(), 1);
        assert_eq!(compiled[0].path, "/api/users");
    }

    #[tokio::test]
    async fn test_success_envelope_and_default_status() {
        let mut registry = MetadataRegistry::new();
        registry.register_owner("users", "/api/users").unwrap();
        registry
            .declare_route(
                "users",
                HttpMethod::POST,
                "/",
                "createUser",
                value_handler(json!({"id": 1})),
            )
            .unwrap();

        let compiled = RouteCompiler::compile(&registry);
        let response = (compiled[0].handler)(HttpRequest::new("POST", "/api/users")).await;
        assert_eq!(response.status, 201);
        assert_eq!(
            response.json_body().unwrap(),
            json!({"success": true, "data": {"id": 1}})
        );
    }

    #[tokio::test]
    async fn test_delete_emits_204_with_empty_body() {
        let mut registry = MetadataRegistry::new();
        registry.register_owner("items", "/items").unwrap();
        registry
            .declare_route(
                "items",
                HttpMethod::DELETE,
                "/:id",
                "deleteItem",
                value_handler(json!(null)),
            )
            .unwrap();

        let compiled = RouteCompiler::compile(&registry);
        let response = (compiled[0].handler)(HttpRequest::new("DELETE", "/items/3")).await;
        assert_eq!(response.status, 204);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_declared_failure_uses_its_status() {
        let mut registry = MetadataRegistry::new();
        registry.register_owner("users", "/api/users").unwrap();
        registry
            .declare_route(
                "users",
                HttpMethod::GET,
                "/:id",
                "getUser",
                failing_handler(|| Error::not_found("No such user")),
            )
            .unwrap();

        let compiled = RouteCompiler::compile(&registry);
        let response = (compiled[0].handler)(HttpRequest::new("GET", "/api/users/9")).await;
        assert_eq!(response.status, 404);
        let body = response.json_body().unwrap();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!("No such user"));
    }

    #[tokio::test]
    async fn test_undeclared_failure_is_generic_500() {
        let mut registry = MetadataRegistry::new();
        registry.register_owner("users", "/api/users").unwrap();
        registry
            .declare_route(
                "users",
                HttpMethod::GET,
                "/",
                "listUsers",
                failing_handler(|| Error::Internal("connection pool exhausted".to_string())),
            )
            .unwrap();

        let compiled = RouteCompiler::compile(&registry);
        let response = (compiled[0].handler)(HttpRequest::new("GET", "/api/users")).await;
        assert_eq!(response.status, 500);
        let body = response.json_body().unwrap();
        assert_eq!(body["error"], json!("Internal server error"));
        assert_eq!(body["details"], json!(null));
    }

    #[tokio::test]
    async fn test_response_shape_failure_is_declared_500() {
        let mut registry = MetadataRegistry::new();
        registry.register_owner("users", "/api/users").unwrap();
        registry
            .declare_route(
                "users",
                HttpMethod::GET,
                "/",
                "listUsers",
                value_handler(json!({"unexpected": true})),
            )
            .unwrap();
        registry
            .attach_metadata(
                "users",
                "listUsers",
                MetadataPatch::new().response(Arc::new(RejectEverything)),
            )
            .unwrap();

        let compiled = RouteCompiler::compile(&registry);
        let response = (compiled[0].handler)(HttpRequest::new("GET", "/api/users")).await;
        assert_eq!(response.status, 500);
        let body = response.json_body().unwrap();
        assert_eq!(body["error"], json!("Internal server error"));
        assert_eq!(body["details"]["issues"][0]["message"], json!("rejected"));
    }

    #[tokio::test]
    async fn test_inbound_validation_runs_before_middleware() {
        use crate::middleware::{Middleware, MiddlewareDescriptor, Next};
        use async_trait::async_trait;
        use std::sync::atomic::{AtomicBool, Ordering};

        static MIDDLEWARE_RAN: AtomicBool = AtomicBool::new(false);

        struct Recorder;

        #[async_trait]
        impl Middleware for Recorder {
            async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
                MIDDLEWARE_RAN.store(true, Ordering::SeqCst);
                next(req).await
            }
        }

        let mut registry = MetadataRegistry::new();
        registry.register_owner("users", "/api/users").unwrap();
        registry
            .declare_route(
                "users",
                HttpMethod::POST,
                "/",
                "createUser",
                value_handler(json!({})),
            )
            .unwrap();
        registry
            .attach_metadata(
                "users",
                "createUser",
                MetadataPatch::new()
                    .body(Arc::new(RejectEverything))
                    .middleware(MiddlewareDescriptor::new().step(Recorder)),
            )
            .unwrap();

        let compiled = RouteCompiler::compile(&registry);
        let response = (compiled[0].handler)(
            HttpRequest::new("POST", "/api/users").with_body(b"{}".to_vec()),
        )
        .await;

        assert_eq!(response.status, 400);
        assert!(!MIDDLEWARE_RAN.load(Ordering::SeqCst));
    }
}
