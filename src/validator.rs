//! Validator capability boundary.
//!
//! The router never looks inside a schema. It hands raw input to a [`Schema`]
//! and gets back either the (possibly coerced) value or a list of
//! [`ValidationIssue`]s, which [`ValidationError::from_issues`](crate::error::ValidationError::from_issues)
//! flattens into the `{ field: { code, message } }` map clients receive.
//!
//! [`JsonSchema`] binds the capability to JSON Schema through the `jsonschema`
//! crate. Any `Fn(&Value) -> Result<Value, Vec<ValidationIssue>>` is a schema as
//! well, for hand written or serde-driven validation.
//!
//! ```rust
//! use routewise::validator::{JsonSchema, Schema};
//! use serde_json::json;
//!
//! let schema = JsonSchema::compile(&json!({
//!     "type": "object",
//!     "properties": { "userId": { "type": "integer" } },
//!     "required": ["userId"]
//! }))
//! .unwrap()
//! .coerce_strings();
//!
//! let value = schema.validate(&json!({ "userId": "42" })).unwrap();
//! assert_eq!(value["userId"], 42);
//! ```

use http::StatusCode;
use jsonschema::error::ValidationErrorKind;
use serde_json::{Map, Value};
use std::fmt;

/// One problem reported by a validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Ordered field segments leading to the offending value (empty for the root)
    pub path: Vec<String>,
    /// Machine readable code (`invalid_type`, `too_small`, ...)
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: Vec<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationIssue {
            path,
            code: code.into(),
            message: message.into(),
        }
    }
}

/// A schema capable of validating (and optionally transforming) raw input.
pub trait Schema: Send + Sync {
    /// Validate `input`, returning the value handlers should see.
    fn validate(&self, input: &Value) -> Result<Value, Vec<ValidationIssue>>;

    /// Status used when validation fails.
    fn status(&self) -> StatusCode {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

impl<F> Schema for F
where
    F: Fn(&Value) -> Result<Value, Vec<ValidationIssue>> + Send + Sync,
{
    fn validate(&self, input: &Value) -> Result<Value, Vec<ValidationIssue>> {
        self(input)
    }
}

/// JSON Schema backed [`Schema`].
pub struct JsonSchema {
    raw: Value,
    validator: jsonschema::Validator,
    coerce: bool,
    status: StatusCode,
}

impl fmt::Debug for JsonSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchema")
            .field("schema", &self.raw)
            .field("coerce", &self.coerce)
            .field("status", &self.status)
            .finish()
    }
}

impl JsonSchema {
    /// Compile a JSON Schema document.
    pub fn compile(schema: &Value) -> anyhow::Result<Self> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|e| anyhow::anyhow!("invalid JSON schema: {e}"))?;
        Ok(Self {
            raw: schema.clone(),
            validator,
            coerce: false,
            status: StatusCode::UNPROCESSABLE_ENTITY,
        })
    }

    /// Convert string property values to the primitive type their property
    /// schema declares before validating. Path and query input is always text,
    /// so their schemas normally want this.
    #[must_use]
    pub fn coerce_strings(mut self) -> Self {
        self.coerce = true;
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    fn coerce_input(&self, input: &Value) -> Value {
        match (input, self.raw.get("properties")) {
            (Value::Object(fields), Some(Value::Object(props))) => {
                let coerced: Map<String, Value> = fields
                    .iter()
                    .map(|(k, v)| {
                        let v = match v {
                            Value::String(s) => decode_param_value(s, props.get(k)),
                            other => other.clone(),
                        };
                        (k.clone(), v)
                    })
                    .collect();
                Value::Object(coerced)
            }
            _ => input.clone(),
        }
    }
}

impl Schema for JsonSchema {
    fn validate(&self, input: &Value) -> Result<Value, Vec<ValidationIssue>> {
        let value = if self.coerce {
            self.coerce_input(input)
        } else {
            input.clone()
        };

        let issues: Vec<ValidationIssue> = self
            .validator
            .iter_errors(&value)
            .map(|err| {
                let mut path = pointer_segments(&err.instance_path.to_string());
                let (code, message) = match &err.kind {
                    ValidationErrorKind::Required { property } => {
                        let name = property
                            .as_str()
                            .map(str::to_owned)
                            .unwrap_or_else(|| property.to_string());
                        path.push(name);
                        ("invalid_type", "Required".to_string())
                    }
                    kind => (issue_code(kind), err.to_string()),
                };
                ValidationIssue::new(path, code, message)
            })
            .collect();

        if issues.is_empty() {
            Ok(value)
        } else {
            Err(issues)
        }
    }

    fn status(&self) -> StatusCode {
        self.status
    }
}

/// Map a JSON Schema error kind onto the issue code vocabulary clients expect.
fn issue_code(kind: &ValidationErrorKind) -> &'static str {
    match kind {
        ValidationErrorKind::Type { .. } | ValidationErrorKind::Required { .. } => "invalid_type",
        ValidationErrorKind::MinLength { .. }
        | ValidationErrorKind::Minimum { .. }
        | ValidationErrorKind::ExclusiveMinimum { .. }
        | ValidationErrorKind::MinItems { .. }
        | ValidationErrorKind::MinProperties { .. } => "too_small",
        ValidationErrorKind::MaxLength { .. }
        | ValidationErrorKind::Maximum { .. }
        | ValidationErrorKind::ExclusiveMaximum { .. }
        | ValidationErrorKind::MaxItems { .. }
        | ValidationErrorKind::MaxProperties { .. } => "too_big",
        ValidationErrorKind::Enum { .. } => "invalid_enum_value",
        ValidationErrorKind::Constant { .. } => "invalid_literal",
        ValidationErrorKind::Pattern { .. } | ValidationErrorKind::Format { .. } => {
            "invalid_string"
        }
        ValidationErrorKind::AdditionalProperties { .. } => "unrecognized_keys",
        ValidationErrorKind::MultipleOf { .. } => "not_multiple_of",
        _ => "custom",
    }
}

/// Split a JSON pointer (`/a/0/b~1c`) into unescaped segments.
fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Decode a textual parameter value according to its property schema.
///
/// Converts to integer, number or boolean when the schema declares that type,
/// and splits comma separated values for `array` schemas. Values that do not
/// parse are left as strings so the validator reports the type mismatch.
#[must_use]
pub fn decode_param_value(value: &str, schema: Option<&Value>) -> Value {
    fn convert_primitive(val: &str, schema: Option<&Value>) -> Value {
        match schema.and_then(|s| s.get("type")).and_then(Value::as_str) {
            Some("integer") => val
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(val.to_string())),
            Some("number") => val
                .parse::<f64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(val.to_string())),
            Some("boolean") => val
                .parse::<bool>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(val.to_string())),
            _ => Value::String(val.to_string()),
        }
    }

    match schema.and_then(|s| s.get("type")).and_then(Value::as_str) {
        Some("array") => {
            let items_schema = schema.and_then(|s| s.get("items"));
            Value::Array(
                value
                    .split(',')
                    .filter(|s| !s.is_empty())
                    .map(|p| convert_primitive(p.trim(), items_schema))
                    .collect(),
            )
        }
        Some("object") => {
            serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
        }
        _ => convert_primitive(value, schema),
    }
}
