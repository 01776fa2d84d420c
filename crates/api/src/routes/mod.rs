//! API route definitions.

use axum::Router;
use quill_core::{post::PostRepository, storage::ObjectStore};

use crate::AppState;

pub mod health;
pub mod posts;

/// Creates the API router with all routes.
pub fn api_routes<R, S>() -> Router<AppState<R, S>>
where
    R: PostRepository + 'static,
    S: ObjectStore + 'static,
{
    Router::new()
        .merge(health::routes())
        .merge(posts::routes())
}
