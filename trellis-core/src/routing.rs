// Router primitive compiled routes are registered into

use crate::compiler::CompiledRoute;
use crate::{envelope, Error, HttpRequest, HttpResponse};
use std::collections::HashMap;

/// Minimal router holding the compiled routing table.
///
/// Dispatch is total: an unmatched request produces the declared NotFound
/// envelope rather than an error. Listening on a socket is the surrounding
/// transport's job, not this type's.
#[derive(Default)]
pub struct Router {
    routes: Vec<CompiledRoute>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_compiled(routes: Vec<CompiledRoute>) -> Self {
        Self { routes }
    }

    /// Register one compiled route.
    pub fn register(&mut self, route: CompiledRoute) {
        self.routes.push(route);
    }

    pub fn routes(&self) -> &[CompiledRoute] {
        &self.routes
    }

    /// Dispatch a request to the first matching route.
    pub async fn dispatch(&self, mut request: HttpRequest) -> HttpResponse {
        let full_path = request.path.clone();
        let (path, query_string) = full_path
            .split_once('?')
            .map(|(p, q)| (p, Some(q)))
            .unwrap_or((full_path.as_str(), None));

        if let Some(query) = query_string {
            request.query_params = parse_query_string(query);
            request.path = path.to_string();
        }

        for route in &self.routes {
            if route.method.as_str() != request.method {
                continue;
            }
            if let Some(params) = match_path(&route.path, path) {
                request.path_params = params;
                return (route.handler)(request).await;
            }
        }

        envelope::error_response(&Error::not_found(format!("{} {}", request.method, path)))
    }
}

/// Match a route path pattern against a request path.
/// Returns Some(params) if matched, None otherwise.
fn match_path(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();
    for (pattern_part, path_part) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(param_name) = pattern_part.strip_prefix(':') {
            params.insert(param_name.to_string(), path_part.to_string());
        } else if pattern_part != path_part {
            return None;
        }
    }

    Some(params)
}

/// Parse a query string into a map of parameters.
fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let mut split = part.splitn(2, '=');
            let key = split.next()?;
            let value = split.next().unwrap_or("");
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}
