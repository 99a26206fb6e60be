//! Outermost layer: the single recovery point for unexpected faults.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::error;

use crate::error::{Fault, install_panic_hook};
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error.";

/// Catches every [`Fault`] and panic raised further down the chain, logs it
/// with its backtrace and answers `500 {"error": "Internal server error."}`.
///
/// Must be the first layer on the [`Stack`](super::Stack), or faults from
/// the layers outside it escape.
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorHandling;

impl Middleware for ErrorHandling {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        install_panic_hook();
        Arc::new(ErrorHandlingService { next })
    }
}

struct ErrorHandlingService {
    next: BoxedHandler,
}

impl ErasedHandler for ErrorHandlingService {
    fn call(&self, req: Request) -> BoxFuture {
        let next = Arc::clone(&self.next);
        Box::pin(async move {
            // `next.call` runs inside the guarded future so a panic while
            // building the downstream future is caught as well.
            let guarded = AssertUnwindSafe(async move { next.call(req).await }).catch_unwind();
            let fault = match guarded.await {
                Ok(outcome @ Ok(_)) => return outcome,
                Ok(Err(fault)) => fault,
                Err(payload) => Fault::from_panic(payload),
            };
            error!(
                error = %fault,
                backtrace = %fault.backtrace(),
                "unhandled fault while processing request",
            );
            Ok(Response::error(Status::InternalServerError, INTERNAL_ERROR_MESSAGE))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::handler::Handler;
    use crate::method::Method;

    fn guarded(inner: BoxedHandler) -> BoxedHandler {
        ErrorHandling.wrap(inner)
    }

    async fn body_of(handler: BoxedHandler) -> (u16, String) {
        let res = handler.call(Request::new(Method::Get, "/")).await.expect("never Err");
        (res.status_code(), String::from_utf8(res.body().to_vec()).unwrap())
    }

    #[tokio::test]
    async fn successful_responses_pass_untouched() {
        let inner = (|_req: Request| async { Status::Created }).into_boxed_handler();
        let (status, body) = body_of(guarded(inner)).await;
        assert_eq!(status, 201);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn propagated_faults_become_a_generic_500() {
        let inner = (|_req: Request| async {
            Err::<Response, ApiError>(Fault::new("connection string leaked: secret").into())
        })
        .into_boxed_handler();
        let (status, body) = body_of(guarded(inner)).await;
        assert_eq!(status, 500);
        assert_eq!(body, r#"{"error":"Internal server error."}"#);
        assert!(!body.contains("secret"));
    }

    #[tokio::test]
    async fn panics_inside_the_handler_are_contained() {
        let inner = (|_req: Request| async {
            if true {
                panic!("index out of bounds: secret detail");
            }
            Status::Ok
        })
        .into_boxed_handler();
        let (status, body) = body_of(guarded(inner)).await;
        assert_eq!(status, 500);
        assert!(!body.contains("secret"));
    }

    #[inline(never)]
    fn reach_past_the_end(items: &[u64]) -> u64 {
        items[items.len()]
    }

    #[tokio::test]
    async fn panic_faults_carry_the_panic_site() {
        install_panic_hook();
        let payload = AssertUnwindSafe(async { reach_past_the_end(&[1, 2, 3]) })
            .catch_unwind()
            .await
            .unwrap_err();
        let fault = Fault::from_panic(payload);
        assert!(fault.message().contains("index out of bounds"));
        assert!(fault.backtrace().to_string().contains("reach_past_the_end"));
    }

    #[tokio::test]
    async fn panics_before_the_future_exists_are_contained() {
        struct Eager;
        impl ErasedHandler for Eager {
            fn call(&self, _req: Request) -> BoxFuture {
                panic!("failed while building the future");
            }
        }
        let (status, _) = body_of(guarded(Arc::new(Eager))).await;
        assert_eq!(status, 500);
    }
}
