//! # routewise
//!
//! **routewise** is an async HTTP request router: a segment trie with conflict
//! detection and a static fast path, schema-validated extraction of path,
//! query and body data, and a two-phase middleware pipeline with
//! deterministic error-to-response mapping.
//!
//! ## Architecture
//!
//! - **[`router`]** - Segment trie plus static map; resolves (method, path) to an endpoint
//! - **[`endpoint`]** - Endpoint declarations and route-pattern validation
//! - **[`context`]** - Request context types and params/query/body extraction
//! - **[`validator`]** - The schema capability (`Schema` trait, JSON Schema binding)
//! - **[`middleware`]** - Global (pre-match) and per-endpoint (post-match) pipelines
//! - **[`dispatcher`]** - Per-method entry points composing all of the above
//! - **[`config`]** / **[`runtime_config`]** - Router configuration, environment overrides
//! - **[`error`]** - Error model and default error responses
//! - **[`logging`]** - `tracing-subscriber` initialization (JSON or pretty)
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Handler as MethodHandler
//!     participant Global as Global Middleware
//!     participant Router as Router (trie)
//!     participant Extract as Context Extraction
//!     participant Endpoint as Endpoint Middleware
//!     participant Fn as Handler fn
//!
//!     Client->>Handler: Request GET /users/123/books/456
//!     Handler->>Handler: Supported method?
//!     alt Unsupported
//!         Handler-->>Client: 405 Method Not Allowed
//!     end
//!     Handler->>Global: { request, context }
//!     alt Short-circuit
//!         Global-->>Client: Middleware response (e.g. 403)
//!     end
//!     Global-->>Handler: Next { request, context }
//!     Handler->>Router: route(GET, /users/123/books/456)
//!     alt No route
//!         Router-->>Client: 404 No route found for path
//!     end
//!     Router-->>Handler: Endpoint + { userId, bookId }
//!     Handler->>Extract: params, body, query (+ schemas)
//!     alt Invalid input
//!         Extract-->>Client: 422 Invalid request data + details
//!     end
//!     Handler->>Endpoint: RequestContext
//!     alt Short-circuit
//!         Endpoint-->>Client: Middleware response
//!     end
//!     Endpoint-->>Handler: Next RequestContext
//!     Handler->>Fn: handler(ctx)
//!     Fn-->>Client: Response
//! ```
//!
//! Any failure along the way is caught once by the `MethodHandler` and
//! translated by the configured `on_error` hook, or by the default mapping.
//!
//! ## Quick Start
//!
//! ```rust
//! use http::StatusCode;
//! use routewise::context::RequestContext;
//! use routewise::{create_endpoint, response, Dispatcher, EndpointConfig, HttpMethod, RouterConfig, RouterError};
//! use serde_json::json;
//!
//! async fn get_book(ctx: RequestContext<()>) -> Result<response::Response, RouterError> {
//!     Ok(response::json(
//!         StatusCode::OK,
//!         &json!({ "userId": ctx.params.get("userId"), "bookId": ctx.params.get("bookId") }),
//!     ))
//! }
//!
//! let endpoint = create_endpoint(
//!     HttpMethod::Get,
//!     "/users/:userId/books/:bookId",
//!     get_book,
//!     EndpointConfig::new(),
//! )
//! .unwrap();
//! let dispatcher = Dispatcher::build(vec![endpoint], RouterConfig::new(())).unwrap();
//!
//! let request = http::Request::builder()
//!     .uri("/users/123/books/456")
//!     .body(bytes::Bytes::new())
//!     .unwrap();
//! let res = futures::executor::block_on(dispatcher.handle(request));
//! assert_eq!(res.status(), StatusCode::OK);
//! ```
//!
//! ## Runtime Considerations
//!
//! Handlers and middleware return boxed `Send` futures; the crate does not
//! depend on a particular executor. The routing table is immutable once
//! [`Dispatcher::build`] returns, so lookups from many tasks need no locking.
//! Anything mutable the application shares between requests belongs behind
//! its own synchronization inside the context type `C`.

pub mod config;
pub mod context;
pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod ids;
pub mod logging;
pub mod method;
pub mod middleware;
pub mod response;
pub mod router;
pub mod runtime_config;
pub mod validator;

pub use config::{OnErrorHook, RouterConfig};
pub use context::{Body, GlobalContext, Params, Query, RequestContext, SearchParams};
pub use dispatcher::{Dispatcher, MethodHandler};
pub use endpoint::{create_endpoint, Endpoint, EndpointConfig};
pub use error::{FieldError, FieldErrors, RouteError, RouterError, ValidationError};
pub use method::HttpMethod;
pub use middleware::{Flow, GlobalMiddleware, Middleware};
pub use validator::{JsonSchema, Schema, ValidationIssue};
