//! Endpoint declarations.
//!
//! [`create_endpoint`] validates a declaration (methods, pattern shape) before
//! it can reach the matcher. The handler's signature is checked by the
//! compiler.
//!
//! ```rust
//! use routewise::endpoint::{create_endpoint, EndpointConfig};
//! use routewise::error::RouterError;
//! use routewise::method::HttpMethod;
//! use routewise::response;
//! use http::StatusCode;
//! use serde_json::json;
//!
//! let endpoint = create_endpoint(
//!     HttpMethod::Get,
//!     "/users/:userId",
//!     |ctx: routewise::context::RequestContext<()>| async move {
//!         let id = ctx.params.get("userId").unwrap_or_default();
//!         Ok::<_, RouterError>(response::json(StatusCode::OK, &json!({ "id": id })))
//!     },
//!     EndpointConfig::new(),
//! )
//! .unwrap();
//! assert_eq!(endpoint.route_pattern(), "/users/:userId");
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::context::RequestContext;
use crate::error::{RouteError, RouterError};
use crate::method::HttpMethod;
use crate::middleware::Middleware;
use crate::response::Response;
use crate::validator::Schema;

static ROUTE_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^/(?::?[A-Za-z0-9_-]+(?:/:?[A-Za-z0-9_-]+)*/?)?$").ok());

/// Async request handler.
pub type Handler<C> =
    Arc<dyn Fn(RequestContext<C>) -> BoxFuture<'static, Result<Response, RouterError>> + Send + Sync>;

/// Optional schemas and middleware attached to an endpoint.
pub struct EndpointConfig<C> {
    pub params: Option<Arc<dyn Schema>>,
    pub query: Option<Arc<dyn Schema>>,
    pub body: Option<Arc<dyn Schema>>,
    pub middleware: Vec<Arc<dyn Middleware<C>>>,
}

impl<C> Default for EndpointConfig<C> {
    fn default() -> Self {
        Self {
            params: None,
            query: None,
            body: None,
            middleware: Vec::new(),
        }
    }
}

impl<C> Clone for EndpointConfig<C> {
    fn clone(&self) -> Self {
        Self {
            params: self.params.clone(),
            query: self.query.clone(),
            body: self.body.clone(),
            middleware: self.middleware.clone(),
        }
    }
}

impl<C> fmt::Debug for EndpointConfig<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("params", &self.params.is_some())
            .field("query", &self.query.is_some())
            .field("body", &self.body.is_some())
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

impl<C> EndpointConfig<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn params(mut self, schema: impl Schema + 'static) -> Self {
        self.params = Some(Arc::new(schema));
        self
    }

    #[must_use]
    pub fn query(mut self, schema: impl Schema + 'static) -> Self {
        self.query = Some(Arc::new(schema));
        self
    }

    #[must_use]
    pub fn body(mut self, schema: impl Schema + 'static) -> Self {
        self.body = Some(Arc::new(schema));
        self
    }

    /// Append a middleware; they run in the order they were added.
    #[must_use]
    pub fn use_middleware(mut self, middleware: impl Middleware<C> + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }
}

/// A validated endpoint declaration. Immutable once created.
pub struct Endpoint<C> {
    methods: Vec<HttpMethod>,
    route_pattern: String,
    handler: Handler<C>,
    config: EndpointConfig<C>,
}

impl<C> Clone for Endpoint<C> {
    fn clone(&self) -> Self {
        Self {
            methods: self.methods.clone(),
            route_pattern: self.route_pattern.clone(),
            handler: Arc::clone(&self.handler),
            config: self.config.clone(),
        }
    }
}

impl<C> fmt::Debug for Endpoint<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("methods", &self.methods)
            .field("route_pattern", &self.route_pattern)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<C> Endpoint<C> {
    #[must_use]
    pub fn methods(&self) -> &[HttpMethod] {
        &self.methods
    }

    #[must_use]
    pub fn route_pattern(&self) -> &str {
        &self.route_pattern
    }

    #[must_use]
    pub fn config(&self) -> &EndpointConfig<C> {
        &self.config
    }

    #[must_use]
    pub fn handler(&self) -> &Handler<C> {
        &self.handler
    }

    /// Same endpoint under a different (already prefixed) pattern.
    pub(crate) fn with_pattern(&self, pattern: String) -> Self {
        Self {
            route_pattern: pattern,
            ..self.clone()
        }
    }
}

/// Anything that names one or more HTTP methods.
pub trait IntoMethods {
    fn into_methods(self) -> Result<Vec<HttpMethod>, RouteError>;
}

impl IntoMethods for HttpMethod {
    fn into_methods(self) -> Result<Vec<HttpMethod>, RouteError> {
        Ok(vec![self])
    }
}

impl IntoMethods for &str {
    fn into_methods(self) -> Result<Vec<HttpMethod>, RouteError> {
        Ok(vec![self.parse()?])
    }
}

impl IntoMethods for &[&str] {
    fn into_methods(self) -> Result<Vec<HttpMethod>, RouteError> {
        self.iter().map(|m| m.parse()).collect()
    }
}

impl IntoMethods for Vec<HttpMethod> {
    fn into_methods(self) -> Result<Vec<HttpMethod>, RouteError> {
        Ok(self)
    }
}

impl IntoMethods for &[HttpMethod] {
    fn into_methods(self) -> Result<Vec<HttpMethod>, RouteError> {
        Ok(self.to_vec())
    }
}

impl<const N: usize> IntoMethods for [HttpMethod; N] {
    fn into_methods(self) -> Result<Vec<HttpMethod>, RouteError> {
        Ok(self.to_vec())
    }
}

/// Check a route pattern: a leading `/`, then `/`-separated segments that are
/// either `[A-Za-z0-9_-]+` or `:[A-Za-z0-9_-]+`.
pub fn validate_route_pattern(pattern: &str) -> Result<(), RouteError> {
    let valid = ROUTE_PATTERN
        .as_ref()
        .is_some_and(|re| re.is_match(pattern));
    if valid {
        Ok(())
    } else {
        Err(RouteError::bad_request(format!(
            "Invalid route pattern '{pattern}': expected '/' followed by segments of \
             letters, digits, '_' or '-', optionally prefixed with ':'"
        )))
    }
}

/// Declare an endpoint.
///
/// # Errors
///
/// A 400 [`RouteError`] when a method is outside the supported set, the method
/// list is empty, or the pattern is malformed.
pub fn create_endpoint<C, F, Fut>(
    methods: impl IntoMethods,
    route_pattern: &str,
    handler: F,
    config: EndpointConfig<C>,
) -> Result<Endpoint<C>, RouteError>
where
    C: 'static,
    F: Fn(RequestContext<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, RouterError>> + Send + 'static,
{
    let mut methods = methods.into_methods()?;
    if methods.is_empty() {
        return Err(RouteError::bad_request(
            "An endpoint must declare at least one HTTP method",
        ));
    }
    let mut seen = Vec::with_capacity(methods.len());
    methods.retain(|m| {
        let first = !seen.contains(m);
        seen.push(*m);
        first
    });
    validate_route_pattern(route_pattern)?;

    let handler: Handler<C> =
        Arc::new(move |ctx| Box::pin(handler(ctx)) as BoxFuture<'static, _>);
    Ok(Endpoint {
        methods,
        route_pattern: route_pattern.to_owned(),
        handler,
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response;
    use http::StatusCode;

    async fn ok(_ctx: RequestContext<()>) -> Result<Response, RouterError> {
        Ok(response::empty(StatusCode::NO_CONTENT))
    }

    #[test]
    fn test_route_pattern_grammar() {
        for good in ["/", "/users", "/users/:id", "/a-b/c_d/:x-y/", "/v1/:a/:b"] {
            assert!(validate_route_pattern(good).is_ok(), "{good}");
        }
        for bad in ["", "users", "/users//x", "/:", "/users/*", "/a b", "/users/:id?", "/a/::b"] {
            let err = validate_route_pattern(bad).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "{bad}");
        }
    }

    #[test]
    fn test_create_endpoint_methods() {
        let e = create_endpoint("POST", "/items", ok, EndpointConfig::new()).unwrap();
        assert_eq!(e.methods(), &[HttpMethod::Post]);

        let e = create_endpoint(
            [HttpMethod::Put, HttpMethod::Patch, HttpMethod::Put],
            "/items/:id",
            ok,
            EndpointConfig::new(),
        )
        .unwrap();
        assert_eq!(e.methods(), &[HttpMethod::Put, HttpMethod::Patch]);

        let err = create_endpoint("TRACE", "/items", ok, EndpointConfig::new()).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = create_endpoint(Vec::<HttpMethod>::new(), "/items", ok, EndpointConfig::new()).unwrap_err();
        assert!(err.message().contains("at least one"));

        let names: &[&str] = &["GET", "get"];
        assert!(create_endpoint(names, "/items", ok, EndpointConfig::new()).is_err());
    }

    #[test]
    fn test_create_endpoint_rejects_bad_pattern() {
        let err = create_endpoint(HttpMethod::Get, "no-slash", ok, EndpointConfig::new()).unwrap_err();
        assert!(err.message().contains("Invalid route pattern"));
    }

    #[tokio::test]
    async fn test_handler_is_callable() {
        let e = create_endpoint(HttpMethod::Get, "/", ok, EndpointConfig::new()).unwrap();
        let req = http::Request::builder()
            .uri("/")
            .body(bytes::Bytes::new())
            .unwrap();
        let ctx = RequestContext {
            params: Default::default(),
            search_params: crate::context::Query::Raw(Default::default()),
            body: crate::context::Body::None,
            headers: req.headers().clone(),
            url: crate::context::request_url(&req).unwrap(),
            request: req,
            method: HttpMethod::Get,
            route: Arc::from("/"),
            request_id: crate::ids::RequestId::new(),
            context: (),
        };
        let res = (e.handler())(ctx).await.unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
}
