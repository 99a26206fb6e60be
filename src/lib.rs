//! # userbase
//!
//! An HTTP service for CRUD over an in-memory set of users, wrapped in three
//! middleware layers.
//!
//! ## The pipeline
//!
//! ```text
//! request → ErrorHandling → Authentication → Logging → Router → route handler
//! ```
//!
//! - **ErrorHandling** contains every fault and panic from the layers inside
//!   it and answers a generic 500.
//! - **Authentication** answers 401 unless the bearer token matches.
//! - **Logging** records method and path on the way in and status on the
//!   way out.
//!
//! Route handlers answer validation failures (400) and unknown ids (404)
//! themselves. Anything unexpected travels up as a [`Fault`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use userbase::{Server, UserStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), userbase::Error> {
//!     let app = userbase::app(Arc::new(UserStore::seeded()), "valid_token");
//!     Server::bind("0.0.0.0:8080".parse().unwrap()).await?.serve(app).await
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod config;
pub mod middleware;
pub mod routes;
pub mod store;
pub mod telemetry;
pub mod validate;

use std::sync::Arc;

pub use error::{ApiError, Error, Fault};
pub use handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
pub use method::Method;
pub use request::Request;
pub use response::{IntoOutcome, IntoResponse, Outcome, Response, ResponseBuilder, to_json};
pub use router::Router;
pub use server::Server;
pub use status::Status;
pub use store::{NewUser, User, UserStore};

use middleware::{Authentication, ErrorHandling, Logging, Stack};

/// Assembles the full service: the user routes behind
/// ErrorHandling → Authentication → Logging.
pub fn app(store: Arc<UserStore>, auth_token: &str) -> BoxedHandler {
    Stack::new()
        .layer(ErrorHandling)
        .layer(Authentication::new(auth_token))
        .layer(Logging)
        .service(routes::router(store).into_handler())
}
