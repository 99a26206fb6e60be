//! Runs the user service.
//!
//! ```text
//! PORT=3000 LOG_DIR=./logs cargo run
//! curl -H 'Authorization: Bearer valid_token' http://localhost:3000/users
//! ```

use std::sync::Arc;

use tracing::info;
use userbase::config::{Config, FromEnv};
use userbase::{Server, UserStore, telemetry};

#[tokio::main]
async fn main() -> Result<(), userbase::Error> {
    let config = Config::from_env()?;
    let _log_guard = telemetry::init(&config.log)?;

    let store = Arc::new(UserStore::seeded());
    let app = userbase::app(store, &config.auth_token);

    let server = Server::bind(config.address()?).await?;
    info!(port = config.port, "starting userbase");
    server.serve(app).await
}
