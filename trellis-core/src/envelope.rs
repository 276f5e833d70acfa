// The two wire envelope shapes and the single error-to-response boundary

use crate::defaults::GENERIC_INTERNAL_ERROR;
use crate::{Error, HttpResponse};
use serde_json::{json, Value};
use tracing::error;

/// Success envelope: `{"success": true, "data": <value>}`.
pub fn success(data: &Value) -> Value {
    json!({ "success": true, "data": data })
}

/// Error envelope: `{"success": false, "error": <message>, "details": <details|null>}`.
pub fn declared_error(message: &str, details: Option<&Value>) -> Value {
    json!({ "success": false, "error": message, "details": details })
}

/// Turn any failure into a wire response.
///
/// Declared failures are exposed verbatim at their status code. Everything
/// else is logged and surfaced as the generic 500 envelope; internal detail
/// never crosses the boundary.
pub fn error_response(err: &Error) -> HttpResponse {
    match err.declared() {
        Some((status, message, details)) => {
            HttpResponse::new(status).with_json_value(&declared_error(message, details))
        }
        None => {
            error!(cause = %err, "undeclared failure during dispatch");
            HttpResponse::new(500)
                .with_json_value(&declared_error(GENERIC_INTERNAL_ERROR, None))
        }
    }
}
