//! Middleware layer.
//!
//! A middleware takes the next handler in the chain and returns a new
//! handler of the same shape. That is the whole contract, so layers nest to
//! any depth and in any order.
//!
//! ```rust
//! use userbase::middleware::{Authentication, ErrorHandling, Logging, Stack};
//! use userbase::{Method, Request, Router, Status};
//!
//! let router = Router::new().on(Method::Get, "/", |_req: Request| async { Status::Ok });
//!
//! // First layer added is the outermost one.
//! let app = Stack::new()
//!     .layer(ErrorHandling)
//!     .layer(Authentication::new("valid_token"))
//!     .layer(Logging)
//!     .service(router.into_handler());
//! ```
//!
//! Any `Fn(BoxedHandler) -> BoxedHandler` is a middleware too, which is handy
//! for one-off layers in tests.

mod auth;
mod error;
mod logging;

pub use auth::{Authentication, bearer_token};
pub use error::ErrorHandling;
pub use logging::Logging;

use crate::handler::BoxedHandler;

/// Wraps a handler in another handler.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler;
}

impl<F> Middleware for F
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
{
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        self(next)
    }
}

/// An ordered list of middleware, composed once at startup.
#[derive(Default)]
pub struct Stack {
    layers: Vec<Box<dyn Middleware>>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer inside the ones already added.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Box::new(middleware));
        self
    }

    /// Wraps `inner` in every layer; the first layer added ends up outermost.
    pub fn service(self, inner: BoxedHandler) -> BoxedHandler {
        self.layers
            .iter()
            .rev()
            .fold(inner, |next, middleware| middleware.wrap(next))
    }
}
