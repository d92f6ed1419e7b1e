//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. You register a path, you
//! get a handler. A path registered under some other method answers
//! `405 Method Not Allowed` instead of `404 Not Found`.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::multipart::DEFAULT_MAX_TOTAL_SIZE;
use crate::query::percent_decode_path;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Every registration call returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    body_limit: usize,
}

/// Outcome of a route lookup.
pub(crate) enum Lookup {
    Found(BoxedHandler, HashMap<String, String>),
    MethodNotAllowed,
    NotFound,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), body_limit: DEFAULT_MAX_TOTAL_SIZE }
    }

    /// Caps how many body bytes the server reads for any route on this
    /// router. Larger bodies answer `413` before a handler runs. Defaults to
    /// the multipart total limit.
    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    pub(crate) fn body_limit(&self) -> usize { self.body_limit }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use persona::{Method, Request, Response, Router};
    /// # async fn show(_: Request) -> Response { Response::text("") }
    /// # async fn update(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Get, "/person/detail/{person_id}", show)
    ///     .on(Method::Put, "/person/{person_id}",        update);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup, so this is a
    /// programming error.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, path, handler)
    }

    pub(crate) fn lookup(&self, method: Method, path: &str) -> Lookup {
        if let Some(matched) = self.routes.get(&method).and_then(|tree| tree.at(path).ok()) {
            let params = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), percent_decode_path(v).into_owned()))
                .collect();
            return Lookup::Found(Arc::clone(matched.value), params);
        }
        if self.allows_other_method(method, path) {
            Lookup::MethodNotAllowed
        } else {
            Lookup::NotFound
        }
    }

    fn allows_other_method(&self, method: Method, path: &str) -> bool {
        self.routes
            .iter()
            .any(|(m, tree)| *m != method && tree.at(path).is_ok())
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Request, Response};

    async fn ok(_: Request) -> Response { Response::text("ok") }

    fn app() -> Router {
        Router::new()
            .get("/person/detail", ok)
            .get("/person/detail/{person_id}", ok)
            .put("/person/{person_id}", ok)
    }

    #[test]
    fn static_route_wins_over_param() {
        match app().lookup(Method::Get, "/person/detail") {
            Lookup::Found(_, params) => assert!(params.is_empty()),
            _ => panic!("expected a match"),
        }
    }

    #[test]
    fn params_are_captured() {
        match app().lookup(Method::Get, "/person/detail/7") {
            Lookup::Found(_, params) => assert_eq!(params["person_id"], "7"),
            _ => panic!("expected a match"),
        }
    }

    #[test]
    fn params_are_percent_decoded() {
        match app().lookup(Method::Get, "/person/detail/%31") {
            Lookup::Found(_, params) => assert_eq!(params["person_id"], "1"),
            _ => panic!("expected a match"),
        }
        match app().lookup(Method::Put, "/person/a+b%2Fc") {
            Lookup::Found(_, params) => assert_eq!(params["person_id"], "a+b/c"),
            _ => panic!("expected a match"),
        }
    }

    #[test]
    fn other_method_is_405_unknown_path_is_404() {
        assert!(matches!(app().lookup(Method::Get, "/person/3"), Lookup::MethodNotAllowed));
        assert!(matches!(app().lookup(Method::Get, "/nobody"), Lookup::NotFound));
    }

    #[test]
    fn delete_routes_share_the_path_table() {
        let router = app().delete("/person/{person_id}", ok);
        assert!(matches!(router.lookup(Method::Delete, "/person/3"), Lookup::Found(..)));
        assert!(matches!(router.lookup(Method::Post, "/person/3"), Lookup::MethodNotAllowed));
    }

    #[test]
    fn body_limit_defaults_to_multipart_total() {
        assert_eq!(app().body_limit(), DEFAULT_MAX_TOTAL_SIZE);
        assert_eq!(app().with_body_limit(1024).body_limit(), 1024);
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_routes_panic() {
        let _ = Router::new().get("/person/{id}", ok).get("/person/{person_id}", ok);
    }
}
