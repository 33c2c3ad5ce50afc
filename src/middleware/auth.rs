use futures::future::BoxFuture;
use http::header::HeaderName;
use http::StatusCode;
use serde_json::json;

use super::{Flow, GlobalMiddleware, MiddlewareResult};
use crate::context::GlobalContext;
use crate::response;

/// Global middleware rejecting requests that lack a header.
///
/// Optionally requires an exact value (a static API token, for instance).
/// Rejected requests never reach route matching.
#[derive(Debug, Clone)]
pub struct RequireHeader {
    header: HeaderName,
    expected: Option<String>,
    status: StatusCode,
    message: String,
}

impl RequireHeader {
    /// Require `header` to be present. Answers `403 {"message":"Forbidden"}` otherwise.
    pub fn new(header: HeaderName) -> Self {
        Self {
            header,
            expected: None,
            status: StatusCode::FORBIDDEN,
            message: "Forbidden".to_string(),
        }
    }

    /// Also require the header to equal `value`.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.expected = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_rejection(mut self, status: StatusCode, message: impl Into<String>) -> Self {
        self.status = status;
        self.message = message.into();
        self
    }

    fn accepts(&self, value: Option<&str>) -> bool {
        match (value, &self.expected) {
            (Some(v), Some(expected)) => v == expected,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

impl<C: Send + 'static> GlobalMiddleware<C> for RequireHeader {
    fn call(&self, ctx: GlobalContext<C>) -> BoxFuture<'static, MiddlewareResult<GlobalContext<C>>> {
        let value = ctx
            .request
            .headers()
            .get(&self.header)
            .and_then(|v| v.to_str().ok());
        let flow = if self.accepts(value) {
            Flow::Next(ctx)
        } else {
            Flow::Respond(response::json(self.status, &json!({ "message": self.message })))
        };
        Box::pin(async move { Ok(flow) })
    }
}
