//! Bearer-token gate.
//!
//! The check is a comparison against one configured token. It keeps
//! unauthenticated callers out of the routes; it is not a credential scheme.

use std::sync::Arc;

use tracing::debug;

use crate::error::ApiError;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::middleware::Middleware;
use crate::request::Request;

/// Rejects requests whose `Authorization` token does not match with
/// `401 {"error": "Unauthorized"}`. The next handler is never called for them.
#[derive(Clone, Debug)]
pub struct Authentication {
    token: Arc<str>,
}

impl Authentication {
    pub fn new(token: impl Into<Arc<str>>) -> Self {
        Self { token: token.into() }
    }
}

impl Middleware for Authentication {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(AuthenticationService { token: Arc::clone(&self.token), next })
    }
}

struct AuthenticationService {
    token: Arc<str>,
    next: BoxedHandler,
}

impl ErasedHandler for AuthenticationService {
    fn call(&self, req: Request) -> BoxFuture {
        let authorized = req
            .header("authorization")
            .and_then(bearer_token)
            .is_some_and(|token| token == &*self.token);

        if authorized {
            return self.next.call(req);
        }

        debug!(method = %req.method(), path = %req.path(), "rejecting unauthenticated request");
        Box::pin(async { ApiError::Unauthorized.into_outcome() })
    }
}

/// Extracts the token from an `Authorization` value: everything after the
/// last space, so `"Bearer abc"` yields `"abc"`. Empty tokens yield `None`.
pub fn bearer_token(header: &str) -> Option<&str> {
    header.rsplit(' ').next().filter(|token| !token.is_empty())
}
