//! Request/response logging. Observes only; the outcome is returned as-is.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::middleware::Middleware;
use crate::request::Request;

/// Logs `method` and `path` before delegating, then the response status and
/// latency once the inner handler answers.
///
/// A fault passes through unlogged here; [`ErrorHandling`](super::ErrorHandling)
/// reports it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Logging;

impl Middleware for Logging {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(LoggingService { next })
    }
}

struct LoggingService {
    next: BoxedHandler,
}

impl ErasedHandler for LoggingService {
    fn call(&self, req: Request) -> BoxFuture {
        let next = Arc::clone(&self.next);
        Box::pin(async move {
            let method = req.method().clone();
            let path = req.path().to_owned();
            info!(%method, %path, "handling request");

            let started = Instant::now();
            let outcome = next.call(req).await;

            if let Ok(res) = &outcome {
                info!(
                    %method,
                    %path,
                    status = res.status_code(),
                    elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                    "finished handling request",
                );
            }
            outcome
        })
    }
}
