// Trellis - a declarative API-registration layer for Rust
//
// Handlers are registered once with routing, validation, and documentation
// metadata; that single source of truth drives both the runtime dispatch
// pipeline and OpenAPI document generation.

// Re-export core functionality
pub use trellis_core::*;

// Re-export optional crates
#[cfg(feature = "validation")]
pub use trellis_validation;

#[cfg(feature = "openapi")]
pub use trellis_openapi;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Error,
        HttpMethod,
        HttpRequest,
        HttpResponse,
        MetadataPatch,
        MetadataRegistry,
        Middleware,
        MiddlewareDescriptor,
        Next,
        RegistrationError,
        RouteCompiler,
        RouteHandlerFn,
        Router,
        Shape,
    };

    #[cfg(feature = "validation")]
    pub use trellis_validation::{FieldKind, ObjectShape};

    #[cfg(feature = "openapi")]
    pub use trellis_openapi::{DocumentBuilder, OpenApiDocument};
}
