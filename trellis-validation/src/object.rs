// Object shapes: typed fields, strict unknown-field rejection, coercion

use serde_json::{json, Map, Value};
use trellis_core::{Issue, Shape};

/// Primitive type of a declared field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl FieldKind {
    fn type_name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
        }
    }
}

#[derive(Clone, Debug)]
struct FieldSpec {
    name: String,
    kind: FieldKind,
    required: bool,
}

/// A flat object shape built field by field.
///
/// Values from query strings arrive as strings, so integer, number, and
/// boolean fields coerce from string representations; the validated value
/// carries the coerced types.
///
/// # Examples
///
/// ```
/// use trellis_core::Shape;
/// use trellis_validation::{FieldKind, ObjectShape};
///
/// let shape = ObjectShape::new()
///     .field("name", FieldKind::String)
///     .optional("age", FieldKind::Integer);
///
/// let value = serde_json::json!({"name": "ada", "age": "36"});
/// let validated = shape.validate(&value).unwrap();
/// assert_eq!(validated, serde_json::json!({"name": "ada", "age": 36}));
///
/// let stray = serde_json::json!({"name": "ada", "shoe_size": 7});
/// assert!(shape.validate_strict(&stray).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ObjectShape {
    fields: Vec<FieldSpec>,
}

impl ObjectShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a required field.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind,
            required: true,
        });
        self
    }

    /// Declare an optional field.
    pub fn optional(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind,
            required: false,
        });
        self
    }

    fn check(&self, value: &Value, strict: bool) -> Result<Value, Vec<Issue>> {
        let Some(object) = value.as_object() else {
            return Err(vec![Issue::new("", "expected an object")]);
        };

        let mut validated = Map::new();
        let mut issues = Vec::new();

        for spec in &self.fields {
            match object.get(&spec.name) {
                Some(raw) if !raw.is_null() => match coerce(raw, spec.kind) {
                    Ok(coerced) => {
                        validated.insert(spec.name.clone(), coerced);
                    }
                    Err(message) => issues.push(Issue::new(spec.name.clone(), message)),
                },
                _ if spec.required => {
                    issues.push(Issue::new(
                        spec.name.clone(),
                        format!("{} is required", spec.name),
                    ));
                }
                _ => {}
            }
        }

        if strict {
            for key in object.keys() {
                if !self.fields.iter().any(|spec| &spec.name == key) {
                    issues.push(Issue::new(key.clone(), format!("unknown field {:?}", key)));
                }
            }
        }

        if issues.is_empty() {
            Ok(Value::Object(validated))
        } else {
            Err(issues)
        }
    }
}

impl Shape for ObjectShape {
    fn validate(&self, value: &Value) -> Result<Value, Vec<Issue>> {
        self.check(value, false)
    }

    fn validate_strict(&self, value: &Value) -> Result<Value, Vec<Issue>> {
        self.check(value, true)
    }

    fn schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for spec in &self.fields {
            properties.insert(
                spec.name.clone(),
                json!({ "type": spec.kind.type_name() }),
            );
            if spec.required {
                required.push(Value::String(spec.name.clone()));
            }
        }
        let mut schema = Map::new();
        schema.insert("type".to_string(), Value::String("object".to_string()));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        Value::Object(schema)
    }
}

fn coerce(value: &Value, kind: FieldKind) -> Result<Value, String> {
    match kind {
        FieldKind::String => match value.as_str() {
            Some(s) => Ok(Value::String(s.to_string())),
            None => Err("must be a string".to_string()),
        },
        FieldKind::Integer => {
            if let Some(n) = value.as_i64() {
                return Ok(json!(n));
            }
            value
                .as_str()
                .and_then(|s| s.parse::<i64>().ok())
                .map(|n| json!(n))
                .ok_or_else(|| "must be an integer".to_string())
        }
        FieldKind::Number => {
            if let Some(n) = value.as_f64() {
                return Ok(json!(n));
            }
            value
                .as_str()
                .and_then(|s| s.parse::<f64>().ok())
                .map(|n| json!(n))
                .ok_or_else(|| "must be a number".to_string())
        }
        FieldKind::Boolean => {
            if let Some(b) = value.as_bool() {
                return Ok(Value::Bool(b));
            }
            match value.as_str() {
                Some("true") => Ok(Value::Bool(true)),
                Some("false") => Ok(Value::Bool(false)),
                _ => Err("must be a boolean".to_string()),
            }
        }
    }
}
