// Default status codes and metadata-driven response inference
//
// This module is consumed by both the route compiler and the documentation
// generator. It is the single source of the defaulting rules, which is what
// keeps the runtime and the documented behavior from diverging.

use crate::HttpMethod;

/// Generic message for failures whose real cause must stay internal.
pub const GENERIC_INTERNAL_ERROR: &str = "Internal server error";

/// Default success status for a verb. Fixed, not overridable per route.
pub fn default_status(method: HttpMethod) -> u16 {
    match method {
        HttpMethod::POST => 201,
        HttpMethod::DELETE => 204,
        _ => 200,
    }
}

/// Which optional metadata a route carries. Presence alone drives the
/// inferred error responses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoutePresence {
    pub has_query_shape: bool,
    pub has_body_shape: bool,
    pub has_middleware: bool,
    pub has_path_params: bool,
}

/// Error-response entries implied by the metadata present on a route.
///
/// A body or query shape implies a 400, attached middleware implies a 401,
/// a path parameter implies a 404, and 500 is always possible.
pub fn error_responses(presence: RoutePresence) -> Vec<(u16, &'static str)> {
    let mut entries = Vec::with_capacity(4);
    if presence.has_query_shape || presence.has_body_shape {
        entries.push((400, "Validation error"));
    }
    if presence.has_middleware {
        entries.push((401, "Unauthorized"));
    }
    if presence.has_path_params {
        entries.push((404, "Resource not found"));
    }
    entries.push((500, GENERIC_INTERNAL_ERROR));
    entries
}
