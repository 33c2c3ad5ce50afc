use std::collections::HashMap;

use serde_json::{Map, Value};

use super::{run_schema, value_to_string};
use crate::error::RouterError;
use crate::validator::Schema;

/// Route parameters as seen by middleware and handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    /// Percent-decoded captures, exactly as matched
    Raw(HashMap<String, String>),
    /// Output of the endpoint's params schema
    Validated(Value),
}

impl Default for Params {
    fn default() -> Self {
        Params::Raw(HashMap::new())
    }
}

impl Params {
    /// Value for `name`, rendered as text.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        match self {
            Params::Raw(map) => map.get(name).cloned(),
            Params::Validated(v) => v.get(name).and_then(value_to_string),
        }
    }

    /// Overwrite a parameter. Validated parameters receive the value as a
    /// JSON string.
    ///
    /// A schema may transform params into a non-object value; there is no
    /// slot to write into then, and the call is a no-op returning `false`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        match self {
            Params::Raw(map) => {
                map.insert(name.into(), value.into());
                true
            }
            Params::Validated(Value::Object(map)) => {
                map.insert(name.into(), Value::String(value.into()));
                true
            }
            Params::Validated(_) => false,
        }
    }

    #[must_use]
    pub fn is_validated(&self) -> bool {
        matches!(self, Params::Validated(_))
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Params::Raw(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
            Params::Validated(v) => v.clone(),
        }
    }
}

/// Derive the params slot from the matcher's raw captures.
pub fn extract_params(
    raw: HashMap<String, String>,
    schema: Option<&dyn Schema>,
) -> Result<Params, RouterError> {
    let Some(schema) = schema else {
        return Ok(Params::Raw(raw));
    };
    let input: Map<String, Value> = raw
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();
    Ok(Params::Validated(run_schema(schema, &Value::Object(input))?))
}
