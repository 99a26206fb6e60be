//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Once built, the router is
//! itself a handler, so the middleware stack wraps it like any other.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::{Outcome, Response};
use crate::status::Status;

/// The application router.
///
/// Build it once at startup, then hand it to a
/// [`Stack`](crate::middleware::Stack) via [`Router::into_handler`].
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// Freezes the routing table into a handler.
    ///
    /// Requests the router cannot dispatch are answered here, after every
    /// middleware layer has seen them:
    /// - a body the server could not read: `400 {"error": "Unreadable request body"}`
    /// - a method outside RFC 9110: `405 {"error": "Method not allowed"}`
    /// - no matching route: `404 {"error": "Not found"}`
    pub fn into_handler(self) -> BoxedHandler {
        Arc::new(self)
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl ErasedHandler for Router {
    fn call(&self, mut req: Request) -> BoxFuture {
        let response = if req.body_unreadable {
            Response::error(Status::BadRequest, "Unreadable request body")
        } else if !req.method.is_standard() {
            Response::error(Status::MethodNotAllowed, "Method not allowed")
        } else {
            match self.lookup(&req.method, &req.path) {
                Some((handler, params)) => {
                    req.params = params;
                    return handler.call(req);
                }
                None => Response::error(Status::NotFound, "Not found"),
            }
        };
        Box::pin(async move { Outcome::Ok(response) })
    }
}
