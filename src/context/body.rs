use bytes::Bytes;
use http::header::CONTENT_TYPE;
use serde_json::Value;

use super::form::{parse_multipart, parse_urlencoded, FormData};
use super::run_schema;
use crate::error::{RouteError, RouterError};
use crate::method::HttpMethod;
use crate::response::Request;
use crate::validator::Schema;

/// Decoded request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// JSON payload, validated when the endpoint has a body schema
    Json(Value),
    Form(FormData),
    Text(String),
    /// `application/octet-stream`
    Bytes(Bytes),
    /// Images, video, audio and PDF documents
    Blob { content_type: String, bytes: Bytes },
    None,
}

impl Body {
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_form(&self) -> Option<&FormData> {
        match self {
            Body::Form(f) => Some(f),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Body::None)
    }

    /// JSON view used for typed access. Binary bodies map to `null`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Body::Json(v) => v.clone(),
            Body::Form(f) => f.to_value(),
            Body::Text(s) => Value::String(s.clone()),
            Body::Bytes(_) | Body::Blob { .. } | Body::None => Value::Null,
        }
    }
}

enum BodyKind {
    Json,
    UrlEncoded,
    Multipart,
    Text,
    Binary,
    Blob,
    Unknown,
}

fn classify(essence: &str) -> BodyKind {
    match essence {
        "application/json" => BodyKind::Json,
        e if e.ends_with("+json") => BodyKind::Json,
        "application/x-www-form-urlencoded" => BodyKind::UrlEncoded,
        "multipart/form-data" => BodyKind::Multipart,
        e if e.starts_with("text/") || e.ends_with("/xml") || e.ends_with("+xml") => BodyKind::Text,
        "application/octet-stream" => BodyKind::Binary,
        "application/pdf" => BodyKind::Blob,
        e if e.starts_with("image/") || e.starts_with("video/") || e.starts_with("audio/") => {
            BodyKind::Blob
        }
        _ => BodyKind::Unknown,
    }
}

/// Decode the request body according to its `Content-Type`.
///
/// Only POST, PUT and PATCH carry a body; any other method yields
/// [`Body::None`]. The request body is a shared buffer, so reading it leaves
/// the request intact for later stages.
///
/// A configured schema forces JSON decoding whatever the declared content
/// type. Decode failures are reported as 422 route errors, distinct from
/// schema failures.
pub async fn extract_body(
    req: &Request,
    method: HttpMethod,
    schema: Option<&dyn Schema>,
) -> Result<Body, RouterError> {
    if !method.carries_body() {
        return Ok(Body::None);
    }

    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let bytes = req.body();

    let kind = classify(&essence);
    if schema.is_some() || matches!(kind, BodyKind::Json) {
        let value = if bytes.is_empty() {
            if schema.is_none() {
                return Ok(Body::None);
            }
            Value::Null
        } else {
            serde_json::from_slice(bytes).map_err(|e| {
                RouteError::unprocessable(format!("Request body is not valid JSON: {e}"))
            })?
        };
        return match schema {
            Some(schema) => Ok(Body::Json(run_schema(schema, &value)?)),
            None => Ok(Body::Json(value)),
        };
    }

    let body = match kind {
        BodyKind::UrlEncoded => Body::Form(parse_urlencoded(bytes)),
        BodyKind::Multipart => Body::Form(parse_multipart(bytes.clone(), content_type).await?),
        BodyKind::Text => Body::Text(String::from_utf8(bytes.to_vec()).map_err(|_| {
            RouteError::unprocessable("Request body is not valid UTF-8 text")
        })?),
        BodyKind::Binary => Body::Bytes(bytes.clone()),
        BodyKind::Blob => Body::Blob {
            content_type: essence,
            bytes: bytes.clone(),
        },
        BodyKind::Json | BodyKind::Unknown => Body::None,
    };
    Ok(body)
}
