//! Transport types and response helpers.
//!
//! Requests and responses are plain [`http`] values with a fully buffered
//! [`Bytes`] body, so cloning a request (to read its body without consuming the
//! original) costs a reference count bump.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use serde_json::Value;

pub type Request = http::Request<Bytes>;
pub type Response = http::Response<Bytes>;

/// Build a JSON response.
#[must_use]
pub fn json(status: StatusCode, body: &Value) -> Response {
    // Serializing a `Value` only fails for non-string map keys, which `Value` cannot hold.
    let bytes = serde_json::to_vec(body).unwrap_or_default();
    with_content_type(status, "application/json", Bytes::from(bytes))
}

/// Build a `text/plain` response.
#[must_use]
pub fn text(status: StatusCode, body: impl Into<String>) -> Response {
    with_content_type(
        status,
        "text/plain; charset=utf-8",
        Bytes::from(body.into()),
    )
}

/// An empty response with the given status.
#[must_use]
pub fn empty(status: StatusCode) -> Response {
    let mut res = Response::new(Bytes::new());
    *res.status_mut() = status;
    res
}

fn with_content_type(status: StatusCode, content_type: &'static str, body: Bytes) -> Response {
    let mut res = Response::new(body);
    *res.status_mut() = status;
    res.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    res
}

/// Insert or replace a header; values that are not valid header text are skipped.
pub fn set_header(res: &mut Response, name: HeaderName, value: &str) {
    if let Ok(v) = HeaderValue::from_str(value) {
        res.headers_mut().insert(name, v);
    }
}

/// Copy a request's method, URI, version, headers and body.
///
/// Extensions are not copied: they are transport-specific and not part of the
/// request abstraction the router works with.
#[must_use]
pub fn clone_request(req: &Request) -> Request {
    let mut copy = Request::new(req.body().clone());
    *copy.method_mut() = req.method().clone();
    *copy.uri_mut() = req.uri().clone();
    *copy.version_mut() = req.version();
    *copy.headers_mut() = req.headers().clone();
    copy
}
