//! Post lifecycle errors.

use quill_shared::{AppError, types::PostId};
use thiserror::Error;

use crate::storage::StorageError;

/// Post operation errors.
#[derive(Debug, Error)]
pub enum PostError {
    /// Post not found.
    #[error("post not found: {0}")]
    NotFound(PostId),

    /// Compose request carried no image.
    #[error("an image file is required")]
    MissingImage,

    /// Object store operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl PostError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(id: PostId) -> Self {
        Self::NotFound(id)
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<PostError> for AppError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::NotFound(id) => AppError::NotFound(format!("post {id}")),
            PostError::MissingImage => AppError::Validation(PostError::MissingImage.to_string()),
            PostError::Storage(e) if e.is_client_error() => AppError::Validation(e.to_string()),
            PostError::Storage(e) => AppError::ExternalService(e.to_string()),
            PostError::Repository(msg) => AppError::Database(msg),
        }
    }
}
