use std::collections::{BTreeMap, BTreeSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::{OnErrorHook, RouterConfig};
use crate::context::{
    extract_body, extract_params, extract_query, request_url, GlobalContext, RequestContext,
};
use crate::endpoint::Endpoint;
use crate::error::{critical_failure_response, RouteError, RouterError};
use crate::ids::RequestId;
use crate::method::HttpMethod;
use crate::middleware::{run_endpoint, run_global, Flow, GlobalMiddleware};
use crate::response::{clone_request, Request, Response};
use crate::router::{RouteOutcome, Router};

/// State shared by every per-method entry point. Read-only after build.
struct Shared<C> {
    router: Router<Endpoint<C>>,
    global: Vec<Arc<dyn GlobalMiddleware<C>>>,
    on_error: Option<OnErrorHook>,
    context: C,
}

/// Request-handling entry point bound to one HTTP method.
///
/// Only methods some endpoint declared get a handler; see
/// [`Dispatcher::handler`].
pub struct MethodHandler<C> {
    method: HttpMethod,
    shared: Arc<Shared<C>>,
}

impl<C> Clone for MethodHandler<C> {
    fn clone(&self) -> Self {
        Self {
            method: self.method,
            shared: Arc::clone(&self.shared),
        }
    }
}

/// The router orchestrator.
///
/// Built once from endpoint declarations and a [`RouterConfig`], then shared
/// (it is cheap to clone) by whatever transport feeds it requests.
pub struct Dispatcher<C> {
    handlers: BTreeMap<HttpMethod, MethodHandler<C>>,
    shared: Arc<Shared<C>>,
}

impl<C> Clone for Dispatcher<C> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
            shared: Arc::clone(&self.shared),
        }
    }
}

/// `base` + `pattern`, where `base` is already normalized (`""` or `/x/y`).
fn prefixed(base: &str, pattern: &str) -> String {
    if base.is_empty() {
        pattern.to_owned()
    } else if pattern == "/" {
        base.to_owned()
    } else {
        format!("{base}{pattern}")
    }
}

impl<C> Dispatcher<C>
where
    C: Clone + Send + Sync + 'static,
{
    /// Register every endpoint under the configured base path.
    ///
    /// # Errors
    ///
    /// Route conflicts and duplicate registrations. These are configuration
    /// bugs; callers are expected to abort startup.
    pub fn build(endpoints: Vec<Endpoint<C>>, config: RouterConfig<C>) -> Result<Self, RouteError> {
        let mut router = Router::new();
        let mut declared = BTreeSet::new();

        for endpoint in endpoints {
            let pattern = prefixed(&config.base_path, endpoint.route_pattern());
            declared.extend(endpoint.methods().iter().copied());
            let methods = endpoint.methods().to_vec();
            router.add(&methods, &pattern, endpoint.with_pattern(pattern.clone()))?;
        }
        router.log_summary();

        let shared = Arc::new(Shared {
            router,
            global: config.global,
            on_error: config.on_error,
            context: config.context,
        });
        let handlers = declared
            .into_iter()
            .map(|method| {
                (
                    method,
                    MethodHandler {
                        method,
                        shared: Arc::clone(&shared),
                    },
                )
            })
            .collect();

        Ok(Self { handlers, shared })
    }

    /// Entry point for `method`, or `None` if no endpoint declared it.
    #[must_use]
    pub fn handler(&self, method: HttpMethod) -> Option<&MethodHandler<C>> {
        self.handlers.get(&method)
    }

    /// Methods with an entry point, in canonical order.
    pub fn methods(&self) -> impl Iterator<Item = HttpMethod> + '_ {
        self.handlers.keys().copied()
    }

    /// All registered (method, fully qualified pattern) pairs.
    #[must_use]
    pub fn routes(&self) -> &[(HttpMethod, String)] {
        self.shared.router.routes()
    }

    /// Route `req` to the entry point for its method.
    ///
    /// Methods outside the supported set, or never declared by any endpoint,
    /// get a 405 through the usual error translation. No routing happens for
    /// them, so the path is not consulted: `PATCH /nope` answers 405, not 404,
    /// when no endpoint declares PATCH.
    pub fn handle(&self, req: Request) -> BoxFuture<'static, Response> {
        let handler = HttpMethod::try_from(req.method())
            .ok()
            .and_then(|m| self.handlers.get(&m));
        match handler {
            Some(handler) => handler.call(req),
            None => {
                let shared = Arc::clone(&self.shared);
                let err = RouteError::method_not_allowed(req.method().as_str());
                async move { translate(&shared, err.into(), req).await }.boxed()
            }
        }
    }
}

impl<C> MethodHandler<C>
where
    C: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Process one request. Never fails: every error, and every panic raised
    /// by middleware or the handler, is translated to a response exactly once.
    pub fn call(&self, req: Request) -> BoxFuture<'static, Response> {
        let shared = Arc::clone(&self.shared);
        let bound = self.method;
        let request_id = RequestId::from_headers(req.headers());
        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %req.method(),
            path = %req.uri().path()
        );

        async move {
            let start = Instant::now();
            let original = clone_request(&req);
            let outcome = AssertUnwindSafe(process(&shared, bound, request_id, req))
                .catch_unwind()
                .await;

            let err = match outcome {
                Ok(Ok(res)) => {
                    info!(
                        status = %res.status(),
                        latency_us = start.elapsed().as_micros(),
                        "Request completed"
                    );
                    return res;
                }
                Ok(Err(err)) => err,
                Err(panic) => {
                    let panic_message = panic_message(panic.as_ref());
                    error!(panic_message = %panic_message, "Handler panicked - CRITICAL");
                    RouterError::Unhandled(anyhow::anyhow!("handler panicked: {panic_message}"))
                }
            };
            translate(&shared, err, original).await
        }
        .instrument(span)
        .boxed()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_owned())
}

fn method_of(req: &Request) -> Result<HttpMethod, RouteError> {
    HttpMethod::try_from(req.method())
        .map_err(|_| RouteError::method_not_allowed(req.method().as_str()))
}

async fn process<C>(
    shared: &Shared<C>,
    bound: HttpMethod,
    request_id: RequestId,
    req: Request,
) -> Result<Response, RouterError>
where
    C: Clone + Send + Sync + 'static,
{
    method_of(&req)?;

    let global = GlobalContext {
        request: req,
        context: shared.context.clone(),
    };
    let GlobalContext { request, context } = match run_global(&shared.global, global).await? {
        Flow::Next(ctx) => ctx,
        Flow::Respond(res) => return Ok(res),
    };

    // Global middleware may have rewritten the method
    let method = method_of(&request)?;
    if method != bound {
        return Err(RouteError::method_not_allowed(method.as_str()).into());
    }

    let path = request.uri().path().to_owned();
    let matched = match shared.router.route(method, &path) {
        RouteOutcome::Matched(m) => m,
        RouteOutcome::NotFound => return Err(RouteError::not_found(&path).into()),
        RouteOutcome::MethodNotAllowed { allowed } => {
            return Err(RouteError::method_not_allowed(method.as_str())
                .with_allow(allowed)
                .into())
        }
    };
    let endpoint = Arc::clone(&matched.value);
    if !endpoint.methods().contains(&method) {
        return Err(RouteError::method_not_allowed(method.as_str()).into());
    }

    let config = endpoint.config();
    let params = extract_params(matched.path_params_map(), config.params.as_deref())?;
    let body = extract_body(&request, method, config.body.as_deref()).await?;
    let url = request_url(&request)?;
    let search_params = extract_query(&url, config.query.as_deref())?;

    let ctx = RequestContext {
        params,
        search_params,
        body,
        headers: request.headers().clone(),
        request,
        url,
        method,
        route: Arc::from(endpoint.route_pattern()),
        request_id,
        context,
    };

    let ctx = match run_endpoint(&config.middleware, ctx).await? {
        Flow::Next(ctx) => ctx,
        Flow::Respond(res) => return Ok(res),
    };

    debug!(route = %endpoint.route_pattern(), "Invoking handler");
    (endpoint.handler())(ctx).await
}

/// Turn an error into a response: the `on_error` hook when configured, the
/// default mapping otherwise.
async fn translate<C>(shared: &Shared<C>, err: RouterError, original: Request) -> Response {
    let status = err.status();
    if status.is_server_error() {
        error!(status = %status, error = %err, "Request failed");
    } else {
        warn!(status = %status, error = %err, "Request rejected");
    }

    let Some(hook) = &shared.on_error else {
        return err.to_response();
    };

    let hook = Arc::clone(hook);
    match AssertUnwindSafe(async move { hook(err, original).await })
        .catch_unwind()
        .await
    {
        Ok(Ok(res)) => res,
        Ok(Err(hook_err)) => {
            error!(error = %hook_err, "on_error hook failed");
            critical_failure_response()
        }
        Err(_) => {
            error!("on_error hook panicked");
            critical_failure_response()
        }
    }
}
