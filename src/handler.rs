//! Handler trait and type erasure.
//!
//! # How handlers and middleware share one shape
//!
//! The router holds handlers of *different* concrete types, and every
//! middleware has to wrap "whatever comes next" without knowing its type.
//! Both problems are solved the same way: hide the concrete type behind the
//! [`ErasedHandler`] trait object and pass [`BoxedHandler`]s around.
//!
//! ```text
//! async fn get_user(req: Request) -> Result<Response, ApiError>  ← user writes this
//!        ↓ router.on(Method::Get, "/users/{id}", get_user)
//! get_user.into_boxed_handler()                   ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(get_user))                   ← stored as BoxedHandler
//!        ↓ middleware.wrap(next) -> BoxedHandler  ← same shape, one layer out
//! handler.call(req)  at request time              ← one vtable dispatch per layer
//!        ↓
//! Box::pin(async { get_user(req).await.into_outcome() })
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoOutcome, Outcome};

/// A heap-allocated, type-erased future that resolves to an [`Outcome`].
///
/// `Send + 'static` let tokio move the future across threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Outcome> + Send + 'static>>;

/// Request in, outcome out. Route handlers, the router and every middleware
/// layer implement this.
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Automatically satisfied for any function or closure with the shape:
///
/// ```text
/// Fn(Request) -> impl Future<Output = impl IntoOutcome>
/// ```
///
/// The trait is sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Bridges a concrete handler `F` to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_outcome() })
    }
}
