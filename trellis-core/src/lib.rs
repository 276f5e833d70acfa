// Trellis core - metadata registry, route compiler, and validation pipeline
//
// Handlers are registered once with routing, validation, and documentation
// metadata; the registry is then folded independently into a compiled
// routing table (here) and an OpenAPI document (trellis-openapi).

pub mod compiler;
pub mod defaults;
pub mod envelope;
pub mod error;
pub mod http;
pub mod logging;
pub mod method;
pub mod middleware;
pub mod paths;
pub mod pipeline;
pub mod registry;
pub mod routing;
pub mod schema;

pub use compiler::{CompiledHandlerFn, CompiledRoute, RouteCompiler};
pub use error::{Error, RegistrationError};
pub use http::{HttpRequest, HttpResponse};
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use method::HttpMethod;
pub use middleware::{HeaderRequirement, Middleware, MiddlewareChain, MiddlewareDescriptor, Next};
pub use registry::{
    HandlerMetadata, MetadataPatch, MetadataRegistry, OwnerRecord, RouteDeclaration,
    RouteHandlerFn,
};
pub use routing::Router;
pub use schema::{issues_to_details, Issue, Shape};
