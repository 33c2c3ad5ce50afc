//! Router configuration: base path, global middleware, error hook and the
//! application context handed to every request.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::RouterError;
use crate::middleware::GlobalMiddleware;
use crate::response::{Request, Response};
use crate::runtime_config::{normalize_base_path, RuntimeConfig};

/// Replaces the default error translation. Receives the untranslated error
/// and the request as it was received. A failure (or panic) inside the hook
/// yields the fixed critical-failure response.
pub type OnErrorHook =
    Arc<dyn Fn(RouterError, Request) -> BoxFuture<'static, Result<Response, RouterError>> + Send + Sync>;

/// Build-time router configuration. Consumed by
/// [`Dispatcher::build`](crate::dispatcher::Dispatcher::build).
pub struct RouterConfig<C> {
    pub(crate) base_path: String,
    pub(crate) global: Vec<Arc<dyn GlobalMiddleware<C>>>,
    pub(crate) on_error: Option<OnErrorHook>,
    pub(crate) context: C,
}

impl<C: Default> Default for RouterConfig<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C> fmt::Debug for RouterConfig<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterConfig")
            .field("base_path", &self.base_path)
            .field("global_middleware", &self.global.len())
            .field("on_error", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}

impl<C> RouterConfig<C> {
    #[must_use]
    pub fn new(context: C) -> Self {
        Self {
            base_path: String::new(),
            global: Vec::new(),
            on_error: None,
            context,
        }
    }

    /// Seed the configuration from `ROUTEWISE_*` environment variables.
    #[must_use]
    pub fn from_env(context: C) -> Self {
        Self::new(context).with_runtime(&RuntimeConfig::from_env())
    }

    #[must_use]
    pub fn with_runtime(mut self, runtime: &RuntimeConfig) -> Self {
        self.base_path = runtime.base_path.clone();
        self
    }

    /// Literal prefix for every endpoint pattern (`/api/auth`).
    #[must_use]
    pub fn base_path(mut self, base_path: &str) -> Self {
        self.base_path = normalize_base_path(base_path);
        self
    }

    /// Append a global middleware; they run in the order they were added.
    #[must_use]
    pub fn use_middleware(mut self, middleware: impl GlobalMiddleware<C> + 'static) -> Self {
        self.global.push(Arc::new(middleware));
        self
    }

    #[must_use]
    pub fn on_error<F, Fut>(mut self, hook: F) -> Self
    where
        C: 'static,
        F: Fn(RouterError, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, RouterError>> + Send + 'static,
    {
        self.on_error = Some(Arc::new(move |err, req| {
            Box::pin(hook(err, req)) as BoxFuture<'static, _>
        }));
        self
    }

    #[must_use]
    pub fn get_base_path(&self) -> &str {
        &self.base_path
    }

    #[must_use]
    pub fn context(&self) -> &C {
        &self.context
    }
}
