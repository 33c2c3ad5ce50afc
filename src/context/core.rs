use std::collections::HashMap;
use std::sync::Arc;

use http::header::{COOKIE, HOST};
use http::HeaderMap;
use serde::de::DeserializeOwned;
use url::Url;

use super::{Body, Params, Query};
use crate::error::{RouteError, RouterError};
use crate::ids::RequestId;
use crate::method::HttpMethod;
use crate::response::Request;

/// Per-request state handed to endpoint middleware and the handler.
///
/// Middleware receive the context by value and hand it on, so any change they
/// make (a rewritten param, an added header, a new `context` value) is what
/// the next stage sees.
#[derive(Debug)]
pub struct RequestContext<C> {
    pub params: Params,
    pub search_params: Query,
    pub body: Body,
    /// Working copy of the request headers
    pub headers: HeaderMap,
    /// The request as it left the global middleware pipeline
    pub request: Request,
    pub url: Url,
    pub method: HttpMethod,
    /// Fully qualified route pattern that matched (base path included)
    pub route: Arc<str>,
    pub request_id: RequestId,
    /// Application context, cloned from the router configuration per request
    pub context: C,
}

impl<C> RequestContext<C> {
    /// Deserialize the (validated) route parameters into `T`.
    pub fn params_as<T: DeserializeOwned>(&self) -> Result<T, RouterError> {
        Ok(serde_json::from_value(self.params.to_value())?)
    }

    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T, RouterError> {
        Ok(serde_json::from_value(self.search_params.to_value())?)
    }

    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, RouterError> {
        Ok(serde_json::from_value(self.body.to_value())?)
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Cookies from the `Cookie` header.
    #[must_use]
    pub fn cookies(&self) -> HashMap<String, String> {
        parse_cookies(&self.headers)
    }
}

/// State visible to global middleware, before a route is known.
#[derive(Debug)]
pub struct GlobalContext<C> {
    pub request: Request,
    pub context: C,
}

fn parse_cookies(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|c| c.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=').unwrap_or((pair.trim(), ""));
            (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Absolute URL of the request. Origin-form URIs are resolved against the
/// `Host` header. A missing or unparsable `Host` falls back to `localhost`;
/// only the path and query are used for routing.
pub fn request_url(req: &Request) -> Result<Url, RouteError> {
    let uri = req.uri();
    if uri.scheme().is_some() && uri.authority().is_some() {
        if let Ok(url) = Url::parse(&uri.to_string()) {
            return Ok(url);
        }
    }

    let path = uri.path_and_query().map_or("/", |pq| pq.as_str());
    let host = req.headers().get(HOST).and_then(|h| h.to_str().ok());
    if let Some(url) = host.and_then(|h| Url::parse(&format!("http://{h}{path}")).ok()) {
        return Ok(url);
    }
    Url::parse(&format!("http://localhost{path}"))
        .map_err(|e| RouteError::bad_request(format!("Invalid request URL: {e}")))
}
