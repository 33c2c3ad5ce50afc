//! # Middleware Module
//!
//! Two pipelines run around route resolution:
//!
//! - **Global** ([`GlobalMiddleware`]) runs before matching, over the raw
//!   request and the application context. It can rewrite either, or answer
//!   the request directly.
//! - **Per-endpoint** ([`Middleware`]) runs after params, query and body have
//!   been extracted, over the full [`RequestContext`](crate::context::RequestContext).
//!
//! Both are strictly sequential and stop at the first [`Flow::Respond`].
//! Failures inside the per-endpoint pipeline are collapsed into a single
//! 500 "middleware failed" error.

mod auth;
mod core;
mod tracing;

pub use self::auth::RequireHeader;
pub use self::core::{
    from_fn, global_from_fn, run_endpoint, run_global, Flow, GlobalMiddleware, Middleware,
    MiddlewareResult,
};
pub use self::tracing::TracingMiddleware;
