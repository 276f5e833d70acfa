// Inbound and outbound validation around a handler invocation

use crate::defaults::GENERIC_INTERNAL_ERROR;
use crate::registry::HandlerMetadata;
use crate::schema::issues_to_details;
use crate::{Error, HttpRequest};
use serde_json::{Map, Value};

/// Build the JSON object view of the raw query parameters.
pub fn query_object(req: &HttpRequest) -> Value {
    let mut map = Map::new();
    for (key, value) in &req.query_params {
        map.insert(key.clone(), Value::String(value.clone()));
    }
    Value::Object(map)
}

/// Validate the inbound channels of a request against declared shapes.
///
/// Query is checked before body; validation stops at the first failing
/// channel. Both channels use the strict variant, so undeclared fields are
/// rejected rather than silently accepted. The validated (coerced) values
/// replace the request's `query` and `body_json` views. A channel without
/// a declared shape passes through unvalidated.
pub fn validate_inbound(meta: &HandlerMetadata, req: &mut HttpRequest) -> Result<(), Error> {
    req.query = query_object(req);
    if let Some(shape) = &meta.query {
        req.query = shape.validate_strict(&req.query).map_err(|issues| {
            Error::bad_request("Query validation failed").with_details(issues_to_details(&issues))
        })?;
    }

    if let Some(shape) = &meta.body {
        let raw = parse_body(req)
            .map_err(|e| Error::bad_request(format!("Invalid JSON body: {}", e)))?;
        req.body_json = shape.validate_strict(&raw).map_err(|issues| {
            Error::bad_request("Body validation failed").with_details(issues_to_details(&issues))
        })?;
    } else {
        // No contract for this channel: expose whatever parses, or null
        req.body_json = parse_body(req).unwrap_or(Value::Null);
    }

    Ok(())
}

/// Validate a handler's return value against its declared response shape.
///
/// A failure here is a server bug (the documentation promised a shape the
/// handler did not deliver), so it surfaces as a declared 500 whose message
/// is the fixed generic string; the validator issues travel only in
/// `details`.
pub fn validate_outbound(meta: &HandlerMetadata, value: Value) -> Result<Value, Error> {
    match &meta.response {
        Some(shape) => shape.validate(&value).map_err(|issues| {
            Error::internal_server_error(GENERIC_INTERNAL_ERROR)
                .with_details(issues_to_details(&issues))
        }),
        None => Ok(value),
    }
}

fn parse_body(req: &HttpRequest) -> Result<Value, serde_json::Error> {
    if req.body.is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_slice(&req.body)
    }
}
