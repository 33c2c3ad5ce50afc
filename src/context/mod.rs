//! # Context Module
//!
//! Per-request context types and the three extraction operations that fill
//! them: route parameters, query parameters and body.
//!
//! Each extractor takes the raw input plus the endpoint's optional
//! [`Schema`] for that slot. Without a schema the raw form is returned
//! ([`Params::Raw`], [`Query::Raw`], the decoded [`Body`]); with one, the
//! schema's output replaces it, or a [`ValidationError`] is raised carrying
//! the per-field details.

mod body;
mod core;
mod form;
mod params;
mod query;

pub use body::{extract_body, Body};
pub use core::{request_url, GlobalContext, RequestContext};
pub use form::{FilePart, FormData, FormValue};
pub use params::{extract_params, Params};
pub use query::{extract_query, Query, SearchParams};

use serde_json::Value;

use crate::error::ValidationError;
use crate::validator::Schema;

/// Run `schema` and turn its issue list into a [`ValidationError`].
pub(crate) fn run_schema(schema: &dyn Schema, input: &Value) -> Result<Value, ValidationError> {
    schema
        .validate(input)
        .map_err(|issues| ValidationError::from_issues(schema.status(), issues))
}

/// Text rendering of a scalar JSON value; `null` renders as absent.
pub(crate) fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
