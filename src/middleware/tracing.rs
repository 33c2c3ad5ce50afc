use futures::future::BoxFuture;
use tracing::debug;

use super::{Flow, Middleware, MiddlewareResult};
use crate::context::RequestContext;

/// Per-endpoint middleware logging the populated context before the handler runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMiddleware;

impl<C: Send + 'static> Middleware<C> for TracingMiddleware {
    fn call(&self, ctx: RequestContext<C>) -> BoxFuture<'static, MiddlewareResult<RequestContext<C>>> {
        debug!(
            request_id = %ctx.request_id,
            method = %ctx.method,
            route = %ctx.route,
            path = %ctx.url.path(),
            params = ?ctx.params,
            "Dispatching to handler"
        );
        Box::pin(async move { Ok(Flow::Next(ctx)) })
    }
}
