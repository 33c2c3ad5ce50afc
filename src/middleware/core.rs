use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, error};

use crate::context::{GlobalContext, RequestContext};
use crate::error::{RouteError, RouterError};
use crate::response::Response;

/// What a middleware decided: continue with a (possibly modified) value, or
/// answer the request right away.
#[derive(Debug)]
pub enum Flow<T> {
    Next(T),
    Respond(Response),
}

pub type MiddlewareResult<T> = Result<Flow<T>, RouterError>;

/// Pre-match middleware over the raw request and the application context.
pub trait GlobalMiddleware<C>: Send + Sync {
    fn call(&self, ctx: GlobalContext<C>) -> BoxFuture<'static, MiddlewareResult<GlobalContext<C>>>;
}

/// Post-match middleware over the fully populated request context.
pub trait Middleware<C>: Send + Sync {
    fn call(&self, ctx: RequestContext<C>) -> BoxFuture<'static, MiddlewareResult<RequestContext<C>>>;
}

impl<C, M: GlobalMiddleware<C> + ?Sized> GlobalMiddleware<C> for Arc<M> {
    fn call(&self, ctx: GlobalContext<C>) -> BoxFuture<'static, MiddlewareResult<GlobalContext<C>>> {
        (**self).call(ctx)
    }
}

impl<C, M: Middleware<C> + ?Sized> Middleware<C> for Arc<M> {
    fn call(&self, ctx: RequestContext<C>) -> BoxFuture<'static, MiddlewareResult<RequestContext<C>>> {
        (**self).call(ctx)
    }
}

struct FnMiddleware<F>(F);

impl<C, F, Fut> Middleware<C> for FnMiddleware<F>
where
    F: Fn(RequestContext<C>) -> Fut + Send + Sync,
    Fut: Future<Output = MiddlewareResult<RequestContext<C>>> + Send + 'static,
{
    fn call(&self, ctx: RequestContext<C>) -> BoxFuture<'static, MiddlewareResult<RequestContext<C>>> {
        Box::pin((self.0)(ctx))
    }
}

struct FnGlobalMiddleware<F>(F);

impl<C, F, Fut> GlobalMiddleware<C> for FnGlobalMiddleware<F>
where
    F: Fn(GlobalContext<C>) -> Fut + Send + Sync,
    Fut: Future<Output = MiddlewareResult<GlobalContext<C>>> + Send + 'static,
{
    fn call(&self, ctx: GlobalContext<C>) -> BoxFuture<'static, MiddlewareResult<GlobalContext<C>>> {
        Box::pin((self.0)(ctx))
    }
}

/// Create per-endpoint middleware from an async function
///
/// # Example
/// ```rust
/// use routewise::context::RequestContext;
/// use routewise::error::RouterError;
/// use routewise::middleware::{from_fn, Flow};
///
/// let stamp = from_fn(|mut ctx: RequestContext<()>| async move {
///     ctx.headers.insert("x-stamped", "1".parse().unwrap());
///     Ok::<_, RouterError>(Flow::Next(ctx))
/// });
/// ```
pub fn from_fn<C, F, Fut>(f: F) -> Arc<dyn Middleware<C>>
where
    C: 'static,
    F: Fn(RequestContext<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MiddlewareResult<RequestContext<C>>> + Send + 'static,
{
    Arc::new(FnMiddleware(f))
}

/// Create global middleware from an async function
pub fn global_from_fn<C, F, Fut>(f: F) -> Arc<dyn GlobalMiddleware<C>>
where
    C: 'static,
    F: Fn(GlobalContext<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MiddlewareResult<GlobalContext<C>>> + Send + 'static,
{
    Arc::new(FnGlobalMiddleware(f))
}

/// Run the global pipeline in order.
///
/// Stops at the first [`Flow::Respond`]. Errors propagate unchanged so the
/// dispatcher (or its error hook) sees the original cause.
pub async fn run_global<C>(
    chain: &[Arc<dyn GlobalMiddleware<C>>],
    mut ctx: GlobalContext<C>,
) -> MiddlewareResult<GlobalContext<C>> {
    for (index, mw) in chain.iter().enumerate() {
        match mw.call(ctx).await? {
            Flow::Next(next) => ctx = next,
            Flow::Respond(res) => {
                debug!(index, status = %res.status(), "Global middleware short-circuited");
                return Ok(Flow::Respond(res));
            }
        }
    }
    Ok(Flow::Next(ctx))
}

/// Run the per-endpoint pipeline in order.
///
/// Stops at the first [`Flow::Respond`]. Any error or panic raised by a
/// middleware is logged and replaced by [`RouteError::middleware_failed`].
pub async fn run_endpoint<C: Send + 'static>(
    chain: &[Arc<dyn Middleware<C>>],
    mut ctx: RequestContext<C>,
) -> MiddlewareResult<RequestContext<C>> {
    for (index, mw) in chain.iter().enumerate() {
        let mw = Arc::clone(mw);
        let route = Arc::clone(&ctx.route);
        let outcome = AssertUnwindSafe(async move { mw.call(ctx).await })
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(Flow::Next(next))) => ctx = next,
            Ok(Ok(Flow::Respond(res))) => {
                debug!(index, route = %route, status = %res.status(), "Endpoint middleware short-circuited");
                return Ok(Flow::Respond(res));
            }
            Ok(Err(err)) => {
                error!(index, route = %route, error = %err, "Endpoint middleware failed");
                return Err(RouteError::middleware_failed().into());
            }
            Err(_) => {
                error!(index, route = %route, "Endpoint middleware panicked");
                return Err(RouteError::middleware_failed().into());
            }
        }
    }
    Ok(Flow::Next(ctx))
}
