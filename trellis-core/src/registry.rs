//! Metadata registry: the single source of truth behind both the compiled
//! routing table and the generated documentation.
//!
//! The registry is populated once during application bootstrap and read
//! many times after; it is build-then-freeze and append-only. Handlers
//! register structured declarations directly; there is no reflective
//! collection step.

use crate::middleware::MiddlewareDescriptor;
use crate::schema::Shape;
use crate::{paths, Error, HttpMethod, HttpRequest, RegistrationError};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for the future a route handler returns
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, Error>> + Send>>;

/// Type alias for async route handler functions.
///
/// Handlers produce a bare JSON value; enveloping and status selection are
/// the compiler's job.
pub type RouteHandlerFn = Arc<dyn Fn(HttpRequest) -> HandlerFuture + Send + Sync>;

/// One verb + sub-path pair bound to a named handler.
#[derive(Clone)]
pub struct RouteDeclaration {
    pub method: HttpMethod,
    pub sub_path: String,
    pub handler_id: String,
    pub handler: RouteHandlerFn,
}

impl std::fmt::Debug for RouteDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDeclaration")
            .field("method", &self.method)
            .field("sub_path", &self.sub_path)
            .field("handler_id", &self.handler_id)
            .finish()
    }
}

/// A named grouping of routes sharing one base path (a "controller").
pub struct OwnerRecord {
    pub name: String,
    pub base_path: String,
    pub routes: Vec<RouteDeclaration>,
}

/// Optional validation and middleware metadata for one handler.
///
/// Presence of each field is meaningful: a declared shape is enforced
/// strictly, an absent one means the channel passes through unvalidated.
#[derive(Clone, Default)]
pub struct HandlerMetadata {
    pub query: Option<Arc<dyn Shape>>,
    pub body: Option<Arc<dyn Shape>>,
    pub response: Option<Arc<dyn Shape>>,
    pub middleware: Option<MiddlewareDescriptor>,
}

/// A partial metadata update. Each `attach_metadata` call may supply a
/// different subset of fields; a later call overwrites an overlapping field.
#[derive(Clone, Default)]
pub struct MetadataPatch {
    query: Option<Arc<dyn Shape>>,
    body: Option<Arc<dyn Shape>>,
    response: Option<Arc<dyn Shape>>,
    middleware: Option<MiddlewareDescriptor>,
}

impl MetadataPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, shape: Arc<dyn Shape>) -> Self {
        self.query = Some(shape);
        self
    }

    pub fn body(mut self, shape: Arc<dyn Shape>) -> Self {
        self.body = Some(shape);
        self
    }

    pub fn response(mut self, shape: Arc<dyn Shape>) -> Self {
        self.response = Some(shape);
        self
    }

    pub fn middleware(mut self, descriptor: MiddlewareDescriptor) -> Self {
        self.middleware = Some(descriptor);
        self
    }
}

/// Process-wide store of owners, route declarations, and handler metadata.
#[derive(Default)]
pub struct MetadataRegistry {
    owners: Vec<OwnerRecord>,
    metadata: HashMap<(String, String), HandlerMetadata>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an owner with its base path, in call order.
    ///
    /// Registering the same owner name twice is a programmer error and is
    /// rejected rather than silently merged.
    pub fn register_owner(
        &mut self,
        name: impl Into<String>,
        base_path: impl Into<String>,
    ) -> Result<(), RegistrationError> {
        let name = name.into();
        if self.owners.iter().any(|o| o.name == name) {
            return Err(RegistrationError::DuplicateOwner(name));
        }
        self.owners.push(OwnerRecord {
            name,
            base_path: base_path.into(),
            routes: Vec::new(),
        });
        Ok(())
    }

    /// Append a route declaration to an owner.
    ///
    /// Placeholder syntax is validated here; everything else about the
    /// sub-path is taken as declared.
    pub fn declare_route(
        &mut self,
        owner: &str,
        method: HttpMethod,
        sub_path: impl Into<String>,
        handler_id: impl Into<String>,
        handler: RouteHandlerFn,
    ) -> Result<(), RegistrationError> {
        let sub_path = sub_path.into();
        paths::validate_placeholders(&sub_path)?;

        let record = self
            .owners
            .iter_mut()
            .find(|o| o.name == owner)
            .ok_or_else(|| RegistrationError::UnknownOwner(owner.to_string()))?;

        record.routes.push(RouteDeclaration {
            method,
            sub_path,
            handler_id: handler_id.into(),
            handler,
        });
        Ok(())
    }

    /// Merge a metadata patch into the record for (owner, handler).
    ///
    /// Later calls with an overlapping field overwrite it (last write wins).
    pub fn attach_metadata(
        &mut self,
        owner: &str,
        handler_id: &str,
        patch: MetadataPatch,
    ) -> Result<(), RegistrationError> {
        if !self.owners.iter().any(|o| o.name == owner) {
            return Err(RegistrationError::UnknownOwner(owner.to_string()));
        }

        let entry = self
            .metadata
            .entry((owner.to_string(), handler_id.to_string()))
            .or_default();
        if let Some(shape) = patch.query {
            entry.query = Some(shape);
        }
        if let Some(shape) = patch.body {
            entry.body = Some(shape);
        }
        if let Some(shape) = patch.response {
            entry.response = Some(shape);
        }
        if let Some(descriptor) = patch.middleware {
            entry.middleware = Some(descriptor);
        }
        Ok(())
    }

    /// Owners in registration order; each owner's routes in declaration order.
    pub fn owners(&self) -> &[OwnerRecord] {
        &self.owners
    }

    /// Metadata attached to (owner, handler), if any.
    pub fn metadata(&self, owner: &str, handler_id: &str) -> Option<&HandlerMetadata> {
        self.metadata
            .get(&(owner.to_string(), handler_id.to_string()))
    }

    /// Drop everything. Test isolation only; production registries are
    /// build-then-freeze.
    pub fn reset(&mut self) {
        self.owners.clear();
        self.metadata.clear();
    }
}
