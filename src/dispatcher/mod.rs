//! # Dispatcher Module
//!
//! The dispatcher composes the matcher, context extraction and both middleware
//! pipelines into one request-handling entry point per declared HTTP method.
//!
//! ## Request Flow
//!
//! 1. Methods outside the supported set are rejected (405)
//! 2. Global middleware runs; a response short-circuits everything below
//! 3. The (possibly rewritten) request method must still equal the entry
//!    point's method (405)
//! 4. The matcher resolves the path (404, or 405 with an `Allow` header)
//! 5. The matched endpoint must own the method (405)
//! 6. Params, body and query are extracted and validated
//! 7. Per-endpoint middleware runs; a response short-circuits the handler
//! 8. The handler's response is returned verbatim
//!
//! ## Error Handling
//!
//! Every failure from steps 1-8, panics included, is caught once at the
//! entry point and translated to a response, by the configured `on_error`
//! hook or by [`RouterError::to_response`](crate::error::RouterError::to_response).
//! If the hook fails, a fixed critical-failure response is returned.
//!
//! ```rust,ignore
//! let dispatcher = Dispatcher::build(endpoints, RouterConfig::new(app).base_path("/api"))?;
//! let get = dispatcher.handler(HttpMethod::Get).expect("GET endpoints declared");
//! let response = get.call(request).await;
//! ```

mod core;

pub use self::core::{Dispatcher, MethodHandler};
