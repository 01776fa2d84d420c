//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for posts
//! - Error-to-response mapping

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use quill_core::{
    post::{PostRepository, PostService},
    storage::ObjectStore,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Room left in a request body for the text fields and multipart framing.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application state shared across handlers.
pub struct AppState<R, S> {
    /// Post lifecycle service.
    pub posts: Arc<PostService<R, S>>,
    /// Maximum accepted request body size in bytes.
    pub body_limit: usize,
}

impl<R, S> AppState<R, S> {
    /// Create application state accepting images up to `max_image_bytes`.
    #[must_use]
    pub fn new(posts: PostService<R, S>, max_image_bytes: u64) -> Self {
        let body_limit = usize::try_from(max_image_bytes)
            .unwrap_or(usize::MAX)
            .saturating_add(FORM_OVERHEAD_BYTES);
        Self {
            posts: Arc::new(posts),
            body_limit,
        }
    }
}

impl<R, S> Clone for AppState<R, S> {
    fn clone(&self) -> Self {
        Self {
            posts: Arc::clone(&self.posts),
            body_limit: self.body_limit,
        }
    }
}

/// Creates the main application router.
pub fn create_router<R, S>(state: AppState<R, S>) -> Router
where
    R: PostRepository + 'static,
    S: ObjectStore + 'static,
{
    Router::new()
        .merge(routes::api_routes())
        .layer(DefaultBodyLimit::max(state.body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
