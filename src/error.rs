//! Error types.
//!
//! Two families live here. [`Error`] surfaces infrastructure failures at
//! startup: reading configuration, installing the log subscriber, binding a
//! socket. Everything that can go wrong while serving a request is an
//! [`ApiError`], and the one variant nobody expects, [`Fault`], is left for
//! the error-handling middleware to turn into a generic 500.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::Cell;
use std::fmt;
use std::sync::Once;

use crate::config::ConfigError;
use crate::response::{Outcome, Response};
use crate::status::Status;
use crate::store::StoreError;
use crate::validate::ValidationError;

/// The error type returned by userbase's fallible startup operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}

// ── Fault ─────────────────────────────────────────────────────────────────────

thread_local! {
    /// Backtrace of the most recent panic on this thread, taken by the hook
    /// before unwinding starts.
    static PANIC_BACKTRACE: Cell<Option<Backtrace>> = const { Cell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Chains a panic hook that records where each panic happened, so
/// [`Fault::from_panic`] can report the panic site instead of the catch site.
/// Installing it more than once is a no-op.
pub(crate) fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            PANIC_BACKTRACE.set(Some(Backtrace::force_capture()));
            previous(info);
        }));
    });
}

/// An unanticipated failure during request handling.
///
/// Carries a message and the backtrace captured where the fault was built.
/// Neither is ever sent to the client.
pub struct Fault {
    message: String,
    backtrace: Backtrace,
}

impl Fault {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), backtrace: Backtrace::force_capture() }
    }

    /// Builds a fault from the payload of a caught panic.
    ///
    /// Must be called on the thread that panicked. The backtrace is the one
    /// recorded by the panic hook, or a fresh one if the hook is not installed.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panic with a non-string payload".to_owned()
        };
        let backtrace = PANIC_BACKTRACE.take().unwrap_or_else(Backtrace::force_capture);
        Self { message: format!("handler panicked: {message}"), backtrace }
    }

    pub fn message(&self) -> &str { &self.message }
    pub fn backtrace(&self) -> &Backtrace { &self.backtrace }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault").field("message", &self.message).finish_non_exhaustive()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Fault {}

impl From<StoreError> for Fault {
    fn from(e: StoreError) -> Self { Self::new(e.to_string()) }
}

impl From<serde_json::Error> for Fault {
    fn from(e: serde_json::Error) -> Self { Self::new(format!("serialization failed: {e}")) }
}

// ── ApiError ──────────────────────────────────────────────────────────────────

/// Everything a route handler can fail with.
///
/// All variants except [`ApiError::Fault`] are answered on the spot with a
/// `{"error": "..."}` body. A fault is handed up the middleware chain.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    BadRequest(String),

    #[error("user {0} not found")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Fault(#[from] Fault),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self { Self::Fault(e.into()) }
}

impl ApiError {
    pub fn into_outcome(self) -> Outcome {
        let status = match self {
            Self::Fault(fault) => return Err(fault),
            Self::Validation(_) | Self::BadRequest(_) => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
            Self::Unauthorized => Status::Unauthorized,
        };
        Ok(Response::error(status, &self.to_string()))
    }
}
