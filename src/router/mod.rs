//! Trie-based request routing with positional path parameters.
//!
//! Routes are registered as (method, path pattern, handler factory) triples.
//! Path patterns are `/`-delimited static segments; every registered path
//! implicitly captures any deeper remainder of a request path as positional
//! parameters. So a single registration `GET /api/v1/users` matches
//! `/api/v1/users` (no parameters), `/api/v1/users/1` (parameters `["1"]`)
//! and `/api/v1/users/1/abc/def` (parameters `["1", "abc", "def"]`).
//!
//! Matching prefers leaves: at every node, deeper static children are tried
//! against the path remainder before the node considers swallowing that
//! remainder as parameters. A fully static registration therefore always
//! beats a shorter prefix that would capture the same path parametrically.
//!
//! The trie is built once, before the server starts accepting, and is
//! read-only afterwards; it is shared across connection tasks behind an
//! `Arc` with no synchronization.

use std::fmt;
use std::sync::Arc;

use crate::handler::Handler;
use crate::protocol::Method;

/// Creates a fresh handler instance for one request.
pub type HandlerFactory = Arc<dyn Fn() -> Box<dyn Handler> + Send + Sync>;

/// A registered route: method, path pattern and handler factory.
///
/// Immutable after registration; owned by the router for the life of the
/// server.
pub struct Route {
    method: Method,
    path: String,
    factory: HandlerFactory,
}

impl Route {
    pub fn new<F, H>(method: Method, path: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> H + Send + Sync + 'static,
        H: Handler + 'static,
    {
        Self { method, path: path.into(), factory: Arc::new(move || Box::new(factory())) }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Instantiates the handler for one request.
    pub fn handler(&self) -> Box<dyn Handler> {
        (self.factory)()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route").field("method", &self.method).field("path", &self.path).finish()
    }
}

/// A successful route match: the route plus the positional parameters
/// captured from the path remainder, in left-to-right order.
#[derive(Debug)]
pub struct RouteMatch<'router> {
    route: &'router Route,
    params: Vec<String>,
}

impl<'router> RouteMatch<'router> {
    pub fn route(&self) -> &'router Route {
        self.route
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn into_parts(self) -> (&'router Route, Vec<String>) {
        (self.route, self.params)
    }
}

/// One static path segment in the routing trie.
#[derive(Debug)]
struct Node {
    segment: String,
    children: Vec<Node>,
    routes: Vec<Route>,
}

impl Node {
    fn new(segment: impl Into<String>) -> Self {
        Self { segment: segment.into(), children: Vec::new(), routes: Vec::new() }
    }

    /// The route registered at this node for `method`, first registration
    /// wins.
    fn route_for(&self, method: Method) -> Option<&Route> {
        self.routes.iter().find(|route| route.method == method)
    }

    fn find(&self, method: Method, path: &str) -> Option<(&Route, Vec<String>)> {
        let path = path.strip_suffix('/').unwrap_or(path);

        let Some((base, rest)) = path.split_once('/') else {
            // no deeper segments left: this node must match exactly
            if path == self.segment {
                return self.route_for(method).map(|route| (route, Vec::new()));
            }
            return None;
        };

        if base != self.segment {
            return None;
        }

        // prefer leaves: a deeper static match always wins over capturing
        // the remainder as parameters here
        for child in &self.children {
            if let Some(found) = child.find(method, rest) {
                return Some(found);
            }
        }

        let params = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').map(String::from).collect()
        };
        self.route_for(method).map(|route| (route, params))
    }
}

/// The routing trie.
#[derive(Debug)]
pub struct Router {
    root: Node,
}

impl Router {
    pub fn new() -> Self {
        Self { root: Node::new("") }
    }

    /// Registers a route, creating trie nodes for any path segments not seen
    /// before. Registration is idempotent per path prefix: existing nodes
    /// are reused.
    pub fn add_route(&mut self, route: Route) {
        let pattern = route.path.trim_matches('/').to_string();

        let mut node = &mut self.root;
        if !pattern.is_empty() {
            for segment in pattern.split('/') {
                let position = node.children.iter().position(|child| child.segment == segment);
                let index = match position {
                    Some(index) => index,
                    None => {
                        node.children.push(Node::new(segment));
                        node.children.len() - 1
                    }
                };
                node = &mut node.children[index];
            }
        }
        node.routes.push(route);
    }

    /// Matches a request against the trie.
    ///
    /// Pure function of the trie and the path: performs no I/O and cannot
    /// fail — absence of a match is `None` (the caller answers 404).
    pub fn match_route(&self, method: Method, path: &str) -> Option<RouteMatch<'_>> {
        self.root.find(method, path).map(|(route, params)| RouteMatch { route, params })
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::make_handler;
    use crate::protocol::{FragmentStream, HttpError, Request};
    use futures::stream;
    use tokio_util::sync::CancellationToken;

    fn test_route(method: Method, path: &str) -> Route {
        Route::new(method, path, || {
            make_handler(|_request: Request, _cancel: CancellationToken| async {
                Ok::<FragmentStream, HttpError>(Box::pin(stream::empty()))
            })
        })
    }

    fn test_router() -> Router {
        let mut router = Router::new();
        router.add_route(test_route(Method::Get, "/api/v1/users"));
        router
    }

    #[test]
    fn empty_router_matches_nothing() {
        let router = Router::new();
        assert!(router.match_route(Method::Get, "/x").is_none());
    }

    #[test]
    fn exact_static_match() {
        let router = test_router();

        let matched = router.match_route(Method::Get, "/api/v1/users").unwrap();
        assert_eq!(matched.route().path(), "/api/v1/users");
        assert!(matched.params().is_empty());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let router = test_router();

        let matched = router.match_route(Method::Get, "/api/v1/users/").unwrap();
        assert_eq!(matched.route().path(), "/api/v1/users");
        assert!(matched.params().is_empty());
    }

    #[test]
    fn single_positional_parameter() {
        let router = test_router();

        let matched = router.match_route(Method::Get, "/api/v1/users/1").unwrap();
        assert_eq!(matched.route().path(), "/api/v1/users");
        assert_eq!(matched.params(), &["1"]);
    }

    #[test]
    fn multiple_positional_parameters() {
        let router = test_router();

        let matched = router.match_route(Method::Get, "/api/v1/users/1/abc/def").unwrap();
        assert_eq!(matched.route().path(), "/api/v1/users");
        assert_eq!(matched.params(), &["1", "abc", "def"]);
    }

    #[test]
    fn unregistered_parent_matches_nothing() {
        let router = test_router();
        assert!(router.match_route(Method::Get, "/api/v1").is_none());
    }

    #[test]
    fn method_must_match() {
        let router = test_router();
        assert!(router.match_route(Method::Post, "/api/v1/users").is_none());
    }

    #[test]
    fn deeper_static_route_beats_parameter_capture() {
        let mut router = test_router();
        router.add_route(test_route(Method::Get, "/api/v1/users/address"));

        let matched = router.match_route(Method::Get, "/api/v1/users/address").unwrap();
        assert_eq!(matched.route().path(), "/api/v1/users/address");
        assert!(matched.params().is_empty());

        // the sibling path still captures parametrically
        let matched = router.match_route(Method::Get, "/api/v1/users/42").unwrap();
        assert_eq!(matched.route().path(), "/api/v1/users");
        assert_eq!(matched.params(), &["42"]);
    }

    #[test]
    fn root_route_matches_everything_under_it() {
        let mut router = Router::new();
        router.add_route(test_route(Method::Get, "/"));

        let matched = router.match_route(Method::Get, "/").unwrap();
        assert!(matched.params().is_empty());

        let matched = router.match_route(Method::Get, "/index.html").unwrap();
        assert_eq!(matched.params(), &["index.html"]);
    }

    #[test]
    fn first_registration_wins_per_method() {
        let mut router = Router::new();
        router.add_route(test_route(Method::Get, "/api"));
        router.add_route(test_route(Method::Get, "/api/"));

        // both registrations share the node; matching returns the first
        let matched = router.match_route(Method::Get, "/api").unwrap();
        assert_eq!(matched.route().path(), "/api");
    }
}
