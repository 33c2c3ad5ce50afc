//! Router core module - hot path for request routing.
//!
//! Wraps the [`RadixRouter`] with registration bookkeeping, structured logging
//! and match timing. Nothing here mutates after the build phase.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::radix::{RadixRouter, Resolution};
use crate::error::RouteError;
use crate::method::HttpMethod;

/// Maximum number of path parameters before heap allocation.
/// Most REST APIs have ≤4 path params (e.g. `/users/:id/posts/:postId`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Names are `Arc<str>` shared with the trie node they were bound on, so a
/// match clones a pointer rather than a string. Values are per-request data.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of successfully matching a request path to a route
#[derive(Debug)]
pub struct RouteMatch<T> {
    /// The registration that matched
    pub value: Arc<T>,
    /// Raw (percent-decoded) path parameters in pattern order
    pub path_params: ParamVec,
}

impl<T> RouteMatch<T> {
    /// Get a path parameter by name
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert path_params to a HashMap
    /// Note: This allocates - use get_path_param() in hot paths instead
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Outcome of [`Router::route`].
#[derive(Debug)]
pub enum RouteOutcome<T> {
    Matched(RouteMatch<T>),
    /// Path exists, method does not. `allowed` lists the registered methods.
    MethodNotAllowed { allowed: Vec<HttpMethod> },
    NotFound,
}

/// Route matcher: static fast path plus segment trie.
///
/// Build it with [`Router::add`] during startup, then share it (typically in an
/// `Arc`) for lock-free concurrent lookups.
pub struct Router<T> {
    radix: RadixRouter<T>,
    /// (method, pattern) pairs in registration order, for listing
    registered: Vec<(HttpMethod, String)>,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            radix: RadixRouter::new(),
            registered: Vec::new(),
        }
    }

    /// Register `value` under every method in `methods` at `pattern`.
    ///
    /// # Errors
    ///
    /// Returns the first conflict or duplicate reported by the trie; methods
    /// registered before the failing one stay registered, which is harmless
    /// because a build-time error aborts startup.
    pub fn add(&mut self, methods: &[HttpMethod], pattern: &str, value: T) -> Result<(), RouteError> {
        let value = Arc::new(value);
        for &method in methods {
            self.radix.insert(method, pattern, Arc::clone(&value))?;
            debug!(method = %method, pattern = %pattern, "Route registered");
            self.registered.push((method, pattern.to_owned()));
        }
        Ok(())
    }

    /// Log a summary of the routing table. Call once after the build phase.
    pub fn log_summary(&self) {
        let routes_summary: Vec<String> = self
            .registered
            .iter()
            .take(10)
            .map(|(m, p)| format!("{m} {p}"))
            .collect();
        info!(
            routes_count = self.registered.len(),
            static_routes = self.radix.static_count(),
            trie_nodes = self.radix.node_count(),
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );
    }

    /// All registered (method, pattern) pairs in registration order.
    #[must_use]
    pub fn routes(&self) -> &[(HttpMethod, String)] {
        &self.registered
    }

    /// Match a request. Never fails; a miss is reported through the outcome.
    #[must_use]
    pub fn route(&self, method: HttpMethod, path: &str) -> RouteOutcome<T> {
        debug!(method = %method, path = %path, "Route match attempt");

        let match_start = Instant::now();
        let result = self.radix.resolve(method, path);
        let match_duration = match_start.elapsed();

        match result {
            Resolution::Matched { value, params } => {
                if match_duration > Duration::from_millis(1) {
                    warn!(
                        method = %method,
                        path = %path,
                        path_params = ?params,
                        duration_us = match_duration.as_micros(),
                        "Slow route matching detected"
                    );
                } else {
                    info!(
                        method = %method,
                        path = %path,
                        path_params = ?params,
                        duration_us = match_duration.as_micros(),
                        "Route matched"
                    );
                }
                RouteOutcome::Matched(RouteMatch {
                    value,
                    path_params: params,
                })
            }
            Resolution::MethodNotAllowed { allowed } => {
                warn!(
                    method = %method,
                    path = %path,
                    allowed = ?allowed,
                    duration_us = match_duration.as_micros(),
                    "Path matched but method is not registered"
                );
                RouteOutcome::MethodNotAllowed { allowed }
            }
            Resolution::NotFound => {
                warn!(
                    method = %method,
                    path = %path,
                    duration_us = match_duration.as_micros(),
                    "No route matched"
                );
                RouteOutcome::NotFound
            }
        }
    }
}
