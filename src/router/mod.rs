//! # Router Module
//!
//! Path matching and route resolution.
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Build**: route patterns (`/users/:id/books/:bookId`) are split into
//!    segments. Patterns without a `:name` segment go to a flat static map; the
//!    rest are inserted into a segment trie with one parameter child per node.
//!    Conflicting parameter names and duplicate registrations fail here.
//!
//! 2. **Match**: static paths resolve with a single hash lookup. Other paths walk
//!    the trie one segment at a time, preferring literal children over the
//!    parameter child, and collect percent-decoded captures. When a literal
//!    branch dead-ends the walk backtracks into the parameter child, so a miss
//!    can visit both branches at every level (see [`RadixRouter::resolve`]).
//!
//! A miss distinguishes "unknown path" from "known path, other methods", so the
//! dispatcher can answer 404 and 405 precisely.
//!
//! ## Example
//!
//! ```rust
//! use routewise::method::HttpMethod;
//! use routewise::router::{RouteOutcome, Router};
//!
//! let mut router = Router::new();
//! router.add(&[HttpMethod::Get], "/users/:userId/books/:bookId", "get_book").unwrap();
//!
//! match router.route(HttpMethod::Get, "/users/123/books/456") {
//!     RouteOutcome::Matched(m) => {
//!         assert_eq!(*m.value, "get_book");
//!         assert_eq!(m.get_path_param("bookId"), Some("456"));
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

mod core;
mod radix;
#[cfg(test)]
mod tests;

pub use core::{ParamVec, RouteMatch, RouteOutcome, Router, MAX_INLINE_PARAMS};
pub use radix::{RadixRouter, Resolution};
