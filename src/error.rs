//! Error model shared by the matcher, the extraction layer, the middleware
//! pipelines and the dispatcher.
//!
//! Three kinds of failure exist:
//!
//! - [`RouteError`] - an HTTP status plus a human readable message (bad request,
//!   not found, method not allowed, unprocessable body, middleware failure).
//! - [`ValidationError`] - a status (422 by convention) plus a per-field map of
//!   `{ code, message }` entries produced by a [`Schema`](crate::validator::Schema).
//! - Unclassified failures raised by handler or middleware code, carried as
//!   [`anyhow::Error`].
//!
//! [`RouterError`] is the union every pipeline stage returns. The dispatcher
//! matches on it exactly once to produce a response.

use std::collections::BTreeMap;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::method::HttpMethod;
use crate::response::{self, Response};
use crate::validator::ValidationIssue;

/// Message used for every default validation failure body.
pub const VALIDATION_MESSAGE: &str = "Invalid request data";

/// Message used when unclassified errors are translated without an `on_error` hook.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Message used when the `on_error` hook itself fails.
pub const CRITICAL_FAILURE_MESSAGE: &str = "A critical failure occurred during error handling";

/// One failing field inside a [`ValidationError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Machine readable issue code (e.g. `invalid_type`, `too_small`)
    pub code: String,
    /// Human readable description of the issue
    pub message: String,
}

/// Dotted field path (`address.street`, `tags.0`) to its first issue.
pub type FieldErrors = BTreeMap<String, FieldError>;

/// A failure carrying an HTTP status and a message.
///
/// Build-time failures (invalid patterns, conflicting parameter names,
/// duplicate registrations) and most request-time failures use this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct RouteError {
    status: StatusCode,
    message: String,
    allow: Vec<HttpMethod>,
}

impl RouteError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            allow: Vec::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// No registered route matches `path`.
    pub fn not_found(path: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("No route found for path: {path}"),
        )
    }

    /// `method` is not accepted here. Takes a string so unsupported verbs
    /// (`TRACE`, `CONNECT`, extension methods) can be reported verbatim.
    pub fn method_not_allowed(method: &str) -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("The HTTP method '{method}' is not allowed"),
        )
    }

    /// The body could not be decoded according to its content type.
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    /// Uniform failure reported for anything raised inside the per-endpoint
    /// middleware pipeline.
    pub fn middleware_failed() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "An error was thrown while executing the endpoint middleware",
        )
    }

    /// Attach the methods that *are* registered for the path (sent as `Allow`).
    #[must_use]
    pub fn with_allow(mut self, allow: Vec<HttpMethod>) -> Self {
        self.allow = allow;
        self
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Canonical reason phrase for the status (`"Not Found"`).
    #[must_use]
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Unknown")
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn allow(&self) -> &[HttpMethod] {
        &self.allow
    }
}

/// Schema validation failure with per-field details.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid request data ({} field(s))", .details.len())]
pub struct ValidationError {
    status: StatusCode,
    details: FieldErrors,
}

impl ValidationError {
    pub fn new(status: StatusCode, details: FieldErrors) -> Self {
        Self { status, details }
    }

    /// Flatten a validator's issue list into the field map. The first issue
    /// reported for a path wins.
    pub fn from_issues(status: StatusCode, issues: Vec<ValidationIssue>) -> Self {
        let mut details = FieldErrors::new();
        for issue in issues {
            details
                .entry(issue.path.join("."))
                .or_insert_with(|| FieldError {
                    code: issue.code,
                    message: issue.message,
                });
        }
        Self { status, details }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn details(&self) -> &FieldErrors {
        &self.details
    }
}

/// Union returned by every pipeline stage.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Unhandled(#[from] anyhow::Error),
}

impl From<serde_json::Error> for RouterError {
    fn from(err: serde_json::Error) -> Self {
        RouterError::Unhandled(err.into())
    }
}

impl From<std::io::Error> for RouterError {
    fn from(err: std::io::Error) -> Self {
        RouterError::Unhandled(err.into())
    }
}

impl RouterError {
    /// Status the default translation would answer with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            RouterError::Route(e) => e.status(),
            RouterError::Validation(e) => e.status(),
            RouterError::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Default error-to-response translation used when no `on_error` hook is
    /// configured. Never exposes the underlying cause of unclassified errors.
    #[must_use]
    pub fn to_response(&self) -> Response {
        match self {
            RouterError::Route(e) => {
                let mut res = response::json(e.status(), &json!({ "message": e.message() }));
                if !e.allow().is_empty() {
                    let allow = e
                        .allow()
                        .iter()
                        .map(HttpMethod::as_str)
                        .collect::<Vec<_>>()
                        .join(", ");
                    response::set_header(&mut res, http::header::ALLOW, &allow);
                }
                res
            }
            RouterError::Validation(e) => response::json(
                e.status(),
                &json!({
                    "message": VALIDATION_MESSAGE,
                    "error": "validation_error",
                    "details": e.details(),
                }),
            ),
            RouterError::Unhandled(_) => response::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({ "message": INTERNAL_ERROR_MESSAGE }),
            ),
        }
    }
}

/// Fixed response returned when the `on_error` hook fails.
#[must_use]
pub fn critical_failure_response() -> Response {
    response::json(
        StatusCode::INTERNAL_SERVER_ERROR,
        &json!({ "message": CRITICAL_FAILURE_MESSAGE }),
    )
}
