// The consumed schema capability: shapes validate values, the core never
// implements a schema language itself

use serde::Serialize;
use serde_json::{json, Value};

/// One issue reported by a shape when a value fails validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Path of the offending field ("" for the value as a whole)
    pub path: String,
    pub message: String,
}

impl Issue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Render issues as the structured `details` payload of a declared failure.
pub fn issues_to_details(issues: &[Issue]) -> Value {
    json!({ "issues": issues })
}

/// Opaque validation capability attached to handler metadata.
///
/// The registration layer only ever calls these three methods; what a shape
/// is made of (field rules, a JSON Schema engine, hand-written checks) is
/// the implementor's business.
pub trait Shape: Send + Sync {
    /// Validate a value, returning the validated (possibly coerced) value.
    fn validate(&self, value: &Value) -> Result<Value, Vec<Issue>>;

    /// Strict variant: fields the shape does not declare cause a failure.
    fn validate_strict(&self, value: &Value) -> Result<Value, Vec<Issue>>;

    /// JSON Schema fragment describing this shape, used for documentation.
    fn schema(&self) -> Value;
}
