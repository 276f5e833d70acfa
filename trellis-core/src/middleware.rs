// Middleware composition for compiled routes

use crate::{Error, HttpRequest, HttpResponse};
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::trace;

/// Type alias for the next handler in the middleware chain
pub type Next = Box<
    dyn FnOnce(HttpRequest) -> Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>
        + Send,
>;

/// Type alias for the innermost handler a chain wraps
pub type HandlerFn = Arc<
    dyn Fn(HttpRequest) -> Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>
        + Send
        + Sync,
>;

/// A middleware step attached to a handler.
///
/// A step may short-circuit by returning a declared failure (or its own
/// response) instead of calling `next`; the user handler then never runs.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error>;
}

/// Header requirement a middleware descriptor advertises for documentation.
///
/// Purely descriptive: the documentation generator turns it into a required
/// header parameter; enforcing it is the step's job.
#[derive(Clone, Debug)]
pub struct HeaderRequirement {
    pub name: String,
    pub description: String,
}

/// Middleware attached to a single handler via the metadata registry.
#[derive(Clone, Default)]
pub struct MiddlewareDescriptor {
    pub steps: Vec<Arc<dyn Middleware>>,
    pub header: Option<HeaderRequirement>,
}

impl MiddlewareDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step; steps run in the order they were added.
    pub fn step<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.steps.push(Arc::new(middleware));
        self
    }

    /// Declare a required header for documentation purposes.
    pub fn require_header(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.header = Some(HeaderRequirement {
            name: name.into(),
            description: description.into(),
        });
        self
    }
}

/// Middleware chain executor
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    steps: Arc<Vec<Arc<dyn Middleware>>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_descriptor(descriptor: Option<&MiddlewareDescriptor>) -> Self {
        Self {
            steps: Arc::new(
                descriptor
                    .map(|d| d.steps.clone())
                    .unwrap_or_default(),
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Execute the chain around a handler.
    pub async fn apply(&self, req: HttpRequest, handler: HandlerFn) -> Result<HttpResponse, Error> {
        self.execute_from(0, req, handler).await
    }

    fn execute_from(
        &self,
        index: usize,
        req: HttpRequest,
        handler: HandlerFn,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>> {
        if index >= self.steps.len() {
            trace!("middleware chain complete, calling handler");
            handler(req)
        } else {
            let step = self.steps[index].clone();
            let chain = self.clone();
            let handler_clone = handler.clone();

            trace!(step_index = index, "executing middleware step");
            Box::pin(async move {
                step.handle(
                    req,
                    Box::new(move |req| chain.execute_from(index + 1, req, handler_clone)),
                )
                .await
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Tagger(&'static str);

    #[async_trait]
    impl Middleware for Tagger {
        async fn handle(&self, mut req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
            let trail = req.headers.entry("X-Trail".to_string()).or_default();
            trail.push_str(self.0);
            next(req).await
        }
    }

    struct Rejector;

    #[async_trait]
    impl Middleware for Rejector {
        async fn handle(&self, _req: HttpRequest, _next: Next) -> Result<HttpResponse, Error> {
            Err(Error::unauthorized("Missing token"))
        }
    }

    fn echo_trail_handler(calls: Arc<AtomicUsize>) -> HandlerFn {
        Arc::new(move |req: HttpRequest| {
            let calls = calls.clone();
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let trail = req.headers.get("X-Trail").cloned().unwrap_or_default();
                Ok(HttpResponse::ok().with_body(trail.into_bytes()))
            })
        })
    }

    #[tokio::test]
    async fn test_steps_run_in_declared_order() {
        let descriptor = MiddlewareDescriptor::new().step(Tagger("a")).step(Tagger("b"));
        let chain = MiddlewareChain::from_descriptor(Some(&descriptor));
        let calls = Arc::new(AtomicUsize::new(0));

        let response = chain
            .apply(
                HttpRequest::new("GET", "/x"),
                echo_trail_handler(calls.clone()),
            )
            .await
            .unwrap();

        assert_eq!(response.body, b"ab".to_vec());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_short_circuit_skips_handler() {
        let descriptor = MiddlewareDescriptor::new().step(Rejector).step(Tagger("x"));
        let chain = MiddlewareChain::from_descriptor(Some(&descriptor));
        let calls = Arc::new(AtomicUsize::new(0));

        let result = chain
            .apply(
                HttpRequest::new("GET", "/x"),
                echo_trail_handler(calls.clone()),
            )
            .await;

        assert!(matches!(result, Err(Error::Unauthorized { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_chain_calls_handler_directly() {
        let chain = MiddlewareChain::from_descriptor(None);
        let calls = Arc::new(AtomicUsize::new(0));

        let response = chain
            .apply(
                HttpRequest::new("GET", "/x"),
                echo_trail_handler(calls.clone()),
            )
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_descriptor_header_requirement() {
        let descriptor = MiddlewareDescriptor::new()
            .require_header("Authorization", "JWT bearer token");
        let header = descriptor.header.unwrap();
        assert_eq!(header.name, "Authorization");
        assert_eq!(header.description, "JWT bearer token");
    }
}
