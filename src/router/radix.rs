//! Segment trie for HTTP route matching
//!
//! Routes are split on `/` into segments. Fully static routes never enter the
//! trie: they live in a flat map keyed by normalized path and resolve in O(1).
//! Routes with at least one `:name` segment are inserted into the trie, where
//! each node has:
//!
//! - static children keyed by literal segment
//! - at most one parameter child, bound to a single capture name
//! - the registrations that terminate at the node, keyed by HTTP method
//!
//! Nodes live in an arena (`Vec<RadixNode>`) and refer to each other by index.
//! The tree is only written while routes are registered; resolution takes
//! `&self` and never allocates nodes, so a built tree can be shared across
//! threads without locking.
//!
//! ## Resolution order
//!
//! At every segment a literal child is tried before the parameter child. If the
//! literal branch dead-ends the search backtracks and tries the parameter child,
//! so a static segment never hides a parameter route that would match.
//!
//! A hit costs one step per segment when the routes do not overlap. The worst
//! case is a miss on a path where every level has both a matching literal child
//! and a parameter child: the search then tries both branches at each level,
//! which is exponential in path depth (2^depth node visits). Realistic route
//! tables overlap at a handful of levels at most.
//!
//! ```rust,ignore
//! let mut radix = RadixRouter::new();
//! radix.insert(HttpMethod::Get, "/users/:id", Arc::new("get_user"))?;
//! match radix.resolve(HttpMethod::Get, "/users/42") {
//!     Resolution::Matched { value, params } => { /* params = [("id", "42")] */ }
//!     _ => unreachable!(),
//! }
//! ```

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use super::core::ParamVec;
use crate::error::RouteError;
use crate::method::HttpMethod;

type NodeId = usize;

const ROOT: NodeId = 0;

/// Outcome of resolving a (method, path) pair.
#[derive(Debug)]
pub enum Resolution<T> {
    /// A registration exists for the path and method.
    Matched { value: Arc<T>, params: ParamVec },
    /// The path is known but none of its registrations accept the method.
    MethodNotAllowed { allowed: Vec<HttpMethod> },
    /// No registered pattern matches the path.
    NotFound,
}

struct ParamChild {
    name: Arc<str>,
    node: NodeId,
}

/// Node in the segment trie.
struct RadixNode<T> {
    /// Literal segment -> child node
    children: HashMap<Box<str>, NodeId>,
    /// The single capture child allowed at this position
    param: Option<ParamChild>,
    /// Registrations terminating here
    routes: HashMap<HttpMethod, Arc<T>>,
}

impl<T> RadixNode<T> {
    fn new() -> Self {
        Self {
            children: HashMap::new(),
            param: None,
            routes: HashMap::new(),
        }
    }
}

/// Split a path or pattern into segments, dropping empty ones.
///
/// `""`, `"/"` and `"//"` all produce zero segments; `"/a//b/"` produces `["a", "b"]`.
pub(crate) fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Canonical form used as the static map key: `/a/b`, or `/` for the root.
pub(crate) fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for seg in segments(path) {
        out.push('/');
        out.push_str(seg);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Segment trie plus static fast-path map.
pub struct RadixRouter<T> {
    nodes: Vec<RadixNode<T>>,
    statics: HashMap<String, HashMap<HttpMethod, Arc<T>>>,
}

impl<T> Default for RadixRouter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RadixRouter<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![RadixNode::new()],
            statics: HashMap::new(),
        }
    }

    /// Register `value` for `method` at `pattern`.
    ///
    /// # Errors
    ///
    /// - a `:name` capture where another registration already bound a
    ///   different name at the same position (route conflict)
    /// - the same method registered twice for the same pattern (duplicate)
    pub fn insert(
        &mut self,
        method: HttpMethod,
        pattern: &str,
        value: Arc<T>,
    ) -> Result<(), RouteError> {
        if !segments(pattern).any(|s| s.starts_with(':')) {
            let slot = self.statics.entry(normalize(pattern)).or_default();
            if slot.contains_key(&method) {
                return Err(duplicate(method, pattern));
            }
            slot.insert(method, value);
            return Ok(());
        }

        let mut current = ROOT;
        for seg in segments(pattern) {
            current = match seg.strip_prefix(':') {
                Some(name) => self.param_child(current, name, pattern)?,
                None => self.static_child(current, seg),
            };
        }

        let routes = &mut self.nodes[current].routes;
        if routes.contains_key(&method) {
            return Err(duplicate(method, pattern));
        }
        routes.insert(method, value);
        Ok(())
    }

    fn static_child(&mut self, parent: NodeId, seg: &str) -> NodeId {
        if let Some(&id) = self.nodes[parent].children.get(seg) {
            return id;
        }
        let id = self.push_node();
        self.nodes[parent].children.insert(seg.into(), id);
        id
    }

    fn param_child(&mut self, parent: NodeId, name: &str, pattern: &str) -> Result<NodeId, RouteError> {
        if let Some(existing) = &self.nodes[parent].param {
            if existing.name.as_ref() != name {
                return Err(RouteError::bad_request(format!(
                    "Route conflict in '{pattern}': parameter ':{name}' conflicts with \
                     existing parameter ':{}' at the same position",
                    existing.name
                )));
            }
            return Ok(existing.node);
        }
        let id = self.push_node();
        self.nodes[parent].param = Some(ParamChild {
            name: Arc::from(name),
            node: id,
        });
        Ok(id)
    }

    fn push_node(&mut self) -> NodeId {
        self.nodes.push(RadixNode::new());
        self.nodes.len() - 1
    }

    /// Resolve `method` + `path`.
    ///
    /// Captured segments are percent-decoded; a segment that does not decode to
    /// valid UTF-8 is captured verbatim.
    ///
    /// Backtracking makes the worst case exponential in path depth; see the
    /// module docs.
    pub fn resolve(&self, method: HttpMethod, path: &str) -> Resolution<T> {
        let mut allowed = BTreeSet::new();

        if let Some(by_method) = self.statics.get(&normalize(path)) {
            if let Some(value) = by_method.get(&method) {
                return Resolution::Matched {
                    value: Arc::clone(value),
                    params: ParamVec::new(),
                };
            }
            allowed.extend(by_method.keys().copied());
        }

        let segs: Vec<&str> = segments(path).collect();
        let mut params = ParamVec::new();
        if let Some(value) = self.search(ROOT, &segs, method, &mut params, &mut allowed) {
            return Resolution::Matched { value, params };
        }

        if allowed.is_empty() {
            Resolution::NotFound
        } else {
            Resolution::MethodNotAllowed {
                allowed: allowed.into_iter().collect(),
            }
        }
    }

    fn search(
        &self,
        id: NodeId,
        segs: &[&str],
        method: HttpMethod,
        params: &mut ParamVec,
        allowed: &mut BTreeSet<HttpMethod>,
    ) -> Option<Arc<T>> {
        let node = &self.nodes[id];
        let Some((&seg, rest)) = segs.split_first() else {
            if let Some(value) = node.routes.get(&method) {
                return Some(Arc::clone(value));
            }
            allowed.extend(node.routes.keys().copied());
            return None;
        };

        if let Some(&child) = node.children.get(seg) {
            if let Some(found) = self.search(child, rest, method, params, allowed) {
                return Some(found);
            }
        }

        if let Some(param) = &node.param {
            let decoded = urlencoding::decode(seg)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| seg.to_string());
            params.push((Arc::clone(&param.name), decoded));
            if let Some(found) = self.search(param.node, rest, method, params, allowed) {
                return Some(found);
            }
            // Backtrack
            params.pop();
        }

        None
    }

    /// Number of trie nodes, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of static (method, path) registrations.
    #[must_use]
    pub fn static_count(&self) -> usize {
        self.statics.values().map(HashMap::len).sum()
    }
}

fn duplicate(method: HttpMethod, pattern: &str) -> RouteError {
    RouteError::bad_request(format!(
        "Duplicate endpoint: {method} {pattern} is already registered"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(routes: &[(HttpMethod, &str, &'static str)]) -> RadixRouter<&'static str> {
        let mut r = RadixRouter::new();
        for (m, p, h) in routes {
            r.insert(*m, p, Arc::new(*h)).unwrap();
        }
        r
    }

    fn matched(r: &RadixRouter<&'static str>, m: HttpMethod, path: &str) -> (&'static str, Vec<(String, String)>) {
        match r.resolve(m, path) {
            Resolution::Matched { value, params } => (
                *value,
                params.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            ),
            other => panic!("expected match for {m} {path}, got {other:?}"),
        }
    }

    #[test]
    fn test_radix_router_simple_route() {
        let r = router(&[(HttpMethod::Get, "/health", "health_check")]);
        let (h, params) = matched(&r, HttpMethod::Get, "/health");
        assert_eq!(h, "health_check");
        assert!(params.is_empty());
        // Static routes do not touch the trie
        assert_eq!(r.node_count(), 1);
        assert_eq!(r.static_count(), 1);
    }

    #[test]
    fn test_radix_router_root_and_slashes() {
        let r = router(&[
            (HttpMethod::Get, "/", "root"),
            (HttpMethod::Get, "/a/b", "ab"),
        ]);
        assert_eq!(matched(&r, HttpMethod::Get, "").0, "root");
        assert_eq!(matched(&r, HttpMethod::Get, "/").0, "root");
        assert_eq!(matched(&r, HttpMethod::Get, "/a/b/").0, "ab");
        assert_eq!(matched(&r, HttpMethod::Get, "a//b").0, "ab");
    }

    #[test]
    fn test_radix_router_multiple_parameters() {
        let r = router(&[(HttpMethod::Get, "/users/:userId/books/:bookId", "get_book")]);
        let (h, params) = matched(&r, HttpMethod::Get, "/users/123/books/456");
        assert_eq!(h, "get_book");
        assert_eq!(
            params,
            vec![
                ("userId".to_string(), "123".to_string()),
                ("bookId".to_string(), "456".to_string())
            ]
        );
    }

    #[test]
    fn test_radix_router_percent_decoding() {
        let r = router(&[(HttpMethod::Get, "/greet/:name", "greet")]);
        let (_, params) = matched(&r, HttpMethod::Get, "/greet/hello%20world");
        assert_eq!(params[0].1, "hello world");
        // Invalid UTF-8 keeps the raw segment
        let (_, params) = matched(&r, HttpMethod::Get, "/greet/%FF");
        assert_eq!(params[0].1, "%FF");
    }

    #[test]
    fn test_radix_router_static_segment_preferred() {
        let r = router(&[
            (HttpMethod::Get, "/users/:id/profile", "profile"),
            (HttpMethod::Get, "/users/me/:section", "my_section"),
        ]);
        let (h, params) = matched(&r, HttpMethod::Get, "/users/me/profile");
        assert_eq!(h, "my_section");
        assert_eq!(params[0], ("section".to_string(), "profile".to_string()));

        let (h, params) = matched(&r, HttpMethod::Get, "/users/42/profile");
        assert_eq!(h, "profile");
        assert_eq!(params[0], ("id".to_string(), "42".to_string()));
    }

    #[test]
    fn test_radix_router_backtracks_from_dead_static_branch() {
        let r = router(&[
            (HttpMethod::Get, "/files/:id", "get_file"),
            (HttpMethod::Get, "/files/latest/:version", "latest_version"),
        ]);
        let (h, params) = matched(&r, HttpMethod::Get, "/files/latest");
        assert_eq!(h, "get_file");
        assert_eq!(params, vec![("id".to_string(), "latest".to_string())]);
    }

    #[test]
    fn test_radix_router_backtracks_through_every_overlapping_level() {
        // Each level has a matching literal and a parameter child
        let r = router(&[
            (HttpMethod::Get, "/a/a/a/a/:leaf/z", "literal_chain"),
            (HttpMethod::Get, "/:p1/:p2/:p3/:p4/end", "param_chain"),
        ]);
        let (h, params) = matched(&r, HttpMethod::Get, "/a/a/a/a/end");
        assert_eq!(h, "param_chain");
        assert_eq!(params.len(), 4);
        assert!(params.iter().all(|(_, v)| v == "a"));

        let (h, params) = matched(&r, HttpMethod::Get, "/a/a/a/a/x/z");
        assert_eq!(h, "literal_chain");
        assert_eq!(params, vec![("leaf".to_string(), "x".to_string())]);
        assert!(matches!(
            r.resolve(HttpMethod::Get, "/a/a/a/a/none"),
            Resolution::NotFound
        ));
    }

    #[test]
    fn test_radix_router_conflicting_param_names() {
        let mut r = RadixRouter::new();
        r.insert(HttpMethod::Get, "/users/:a", Arc::new("a")).unwrap();
        let err = r
            .insert(HttpMethod::Post, "/users/:b", Arc::new("b"))
            .unwrap_err();
        assert_eq!(err.status(), http::StatusCode::BAD_REQUEST);
        assert!(err.message().contains(":a"));
        assert!(err.message().contains(":b"));
    }

    #[test]
    fn test_radix_router_duplicate_registration() {
        let mut r = RadixRouter::new();
        r.insert(HttpMethod::Get, "/users/:id", Arc::new("first")).unwrap();
        let err = r
            .insert(HttpMethod::Get, "/users/:id", Arc::new("second"))
            .unwrap_err();
        assert!(err.message().contains("Duplicate endpoint"));

        r.insert(HttpMethod::Get, "/health", Arc::new("h")).unwrap();
        assert!(r.insert(HttpMethod::Get, "/health/", Arc::new("h2")).is_err());
        // Other methods on the same pattern are fine
        r.insert(HttpMethod::Delete, "/users/:id", Arc::new("del")).unwrap();
    }

    #[test]
    fn test_radix_router_method_not_allowed_vs_not_found() {
        let r = router(&[
            (HttpMethod::Get, "/items", "list"),
            (HttpMethod::Post, "/items", "create"),
            (HttpMethod::Get, "/items/:id", "get"),
        ]);
        match r.resolve(HttpMethod::Put, "/items") {
            Resolution::MethodNotAllowed { allowed } => {
                assert_eq!(allowed, vec![HttpMethod::Get, HttpMethod::Post]);
            }
            other => panic!("unexpected {other:?}"),
        }
        match r.resolve(HttpMethod::Delete, "/items/7") {
            Resolution::MethodNotAllowed { allowed } => assert_eq!(allowed, vec![HttpMethod::Get]),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(r.resolve(HttpMethod::Get, "/nothing/here"), Resolution::NotFound));
        assert!(matches!(r.resolve(HttpMethod::Get, "/items/7/extra"), Resolution::NotFound));
    }

    #[test]
    fn test_radix_router_static_miss_falls_back_to_trie() {
        let r = router(&[
            (HttpMethod::Get, "/users/me", "me"),
            (HttpMethod::Delete, "/users/:id", "delete_user"),
        ]);
        let (h, params) = matched(&r, HttpMethod::Delete, "/users/me");
        assert_eq!(h, "delete_user");
        assert_eq!(params[0].1, "me");
    }
}
