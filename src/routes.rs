//! The user routes.
//!
//! Validation and not-found are answered here. A store failure is logged with
//! the operation that hit it and then handed up the chain as a fault.

use std::future::Future;
use std::sync::Arc;

use tracing::{error, info};

use crate::error::ApiError;
use crate::handler::Handler;
use crate::method::Method;
use crate::request::Request;
use crate::response::{IntoOutcome, Response, to_json};
use crate::router::Router;
use crate::status::Status;
use crate::store::{NewUser, UserStore};
use crate::validate::validate;

pub const WELCOME: &str = "Welcome to the user management API!";

/// Registers every route against `store`.
pub fn router(store: Arc<UserStore>) -> Router {
    Router::new()
        .on(Method::Get,    "/",           welcome)
        .on(Method::Get,    "/users",      with_store(&store, list_users))
        .on(Method::Get,    "/users/{id}", with_store(&store, get_user))
        .on(Method::Post,   "/users",      with_store(&store, create_user))
        .on(Method::Put,    "/users/{id}", with_store(&store, update_user))
        .on(Method::Delete, "/users/{id}", with_store(&store, delete_user))
}

/// Turns a handler that also needs the store into a plain [`Handler`].
fn with_store<F, Fut, R>(store: &Arc<UserStore>, f: F) -> impl Handler
where
    F: Fn(Arc<UserStore>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    let store = Arc::clone(store);
    move |req: Request| f(Arc::clone(&store), req)
}

async fn welcome(_req: Request) -> &'static str {
    WELCOME
}

async fn list_users(store: Arc<UserStore>, _req: Request) -> Result<Response, ApiError> {
    let users = store.list().inspect_err(|e| error!(error = %e, "failed to list users"))?;
    Ok(Response::json(to_json(&users)?))
}

async fn get_user(store: Arc<UserStore>, req: Request) -> Result<Response, ApiError> {
    let id = user_id(&req)?;
    let user = store
        .get(id)
        .inspect_err(|e| error!(user_id = id, error = %e, "failed to fetch user"))?
        .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
    Ok(Response::json(to_json(&user)?))
}

async fn create_user(store: Arc<UserStore>, req: Request) -> Result<Response, ApiError> {
    let candidate = payload(&req)?;
    validate(&candidate)?;

    let user = store
        .create(candidate)
        .inspect_err(|e| error!(error = %e, "failed to create user"))?;
    info!(user_id = user.id, "created user");

    Ok(Response::builder()
        .status(Status::Created)
        .header("location", &format!("/users/{}", user.id))
        .json(to_json(&user)?))
}

async fn update_user(store: Arc<UserStore>, req: Request) -> Result<Status, ApiError> {
    let id = user_id(&req)?;
    let candidate = payload(&req)?;
    validate(&candidate)?;

    let updated = store
        .update(id, candidate)
        .inspect_err(|e| error!(user_id = id, error = %e, "failed to update user"))?;
    if !updated {
        return Err(ApiError::NotFound(id.to_string()));
    }
    info!(user_id = id, "updated user");
    Ok(Status::NoContent)
}

async fn delete_user(store: Arc<UserStore>, req: Request) -> Result<Status, ApiError> {
    let id = user_id(&req)?;
    let deleted = store
        .delete(id)
        .inspect_err(|e| error!(user_id = id, error = %e, "failed to delete user"))?;
    if !deleted {
        return Err(ApiError::NotFound(id.to_string()));
    }
    info!(user_id = id, "deleted user");
    Ok(Status::NoContent)
}

/// A path id that does not parse names no user, so it is a 404.
fn user_id(req: &Request) -> Result<u64, ApiError> {
    let raw = req.param("id").unwrap_or_default();
    raw.parse().map_err(|_| ApiError::NotFound(raw.to_owned()))
}

fn payload(req: &Request) -> Result<NewUser, ApiError> {
    serde_json::from_slice(req.body())
        .map_err(|e| ApiError::BadRequest(format!("invalid user payload: {e}")))
}
