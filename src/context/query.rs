use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};
use url::Url;

use super::{run_schema, value_to_string};
use crate::error::RouterError;
use crate::validator::Schema;

/// Ordered, multi-valued query parameters.
///
/// Exposed when an endpoint has no query schema. Keeps every occurrence of a
/// key in the order it appeared, so `?tag=a&tag=b` is not lossy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pairs: Vec<(String, String)>,
}

impl SearchParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` query string (without `?`).
    #[must_use]
    pub fn parse(query: &str) -> Self {
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    /// First value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == name)
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// Replace the first occurrence of `name` and drop the others; append if absent.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == name) {
            Some(first) => {
                self.pairs[first].1 = value;
                let mut idx = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = k != name || idx == first;
                    idx += 1;
                    keep
                });
            }
            None => self.pairs.push((name.to_owned(), value)),
        }
    }

    pub fn delete(&mut self, name: &str) {
        self.pairs.retain(|(k, _)| k != name);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Collapse into a plain map; the last occurrence of a key wins.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.pairs.iter().cloned().collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SearchParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl fmt::Display for SearchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish();
        f.write_str(&encoded)
    }
}

/// Query parameters as seen by middleware and handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// No schema configured: the live multi-valued collection
    Raw(SearchParams),
    /// Output of the endpoint's query schema
    Validated(Value),
}

impl Query {
    /// First (raw) or validated value for `name`, rendered as text.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        match self {
            Query::Raw(sp) => sp.get(name).map(str::to_owned),
            Query::Validated(v) => v.get(name).and_then(value_to_string),
        }
    }

    /// Overwrite `name`. Validated queries receive the value as a JSON string.
    ///
    /// Returns `false`, leaving the query untouched, when a schema transformed
    /// it into a non-object value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self {
            Query::Raw(sp) => {
                sp.set(name, value);
                true
            }
            Query::Validated(Value::Object(map)) => {
                map.insert(name.to_owned(), Value::String(value.into()));
                true
            }
            Query::Validated(_) => false,
        }
    }

    #[must_use]
    pub fn as_raw(&self) -> Option<&SearchParams> {
        match self {
            Query::Raw(sp) => Some(sp),
            Query::Validated(_) => None,
        }
    }

    /// JSON view: the validated value, or an object of raw strings (last wins).
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Query::Raw(sp) => Value::Object(
                sp.to_map()
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect(),
            ),
            Query::Validated(v) => v.clone(),
        }
    }
}

/// Derive the query slot from the request URL.
///
/// With a schema the query string is flattened into a key→string object (the
/// last occurrence of a key wins) and validated. Without one the ordered
/// [`SearchParams`] collection is returned as-is.
pub fn extract_query(url: &Url, schema: Option<&dyn Schema>) -> Result<Query, RouterError> {
    let Some(schema) = schema else {
        return Ok(Query::Raw(url.query_pairs().into_owned().collect()));
    };

    let raw: Map<String, Value> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect();
    Ok(Query::Validated(run_schema(schema, &Value::Object(raw))?))
}
