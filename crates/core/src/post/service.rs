//! Post lifecycle service.
//!
//! Keeps post records and their images consistent:
//! - compose stores the image before the record exists
//! - delete removes the image before the record
//! - reads mint a fresh signed URL per post instead of exposing the key

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use quill_shared::types::PostId;
use tracing::{info, warn};

use super::error::PostError;
use super::key::image_key;
use super::types::{ComposePostInput, CreatePostInput, Post, PostWithImage};
use crate::storage::{ObjectStore, PresignedUrl, StorageError};

/// Repository trait for post persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait PostRepository: Send + Sync {
    /// Create a new post record. The repository assigns the id.
    fn create(
        &self,
        input: CreatePostInput,
    ) -> impl Future<Output = Result<Post, PostError>> + Send;

    /// List every post in a stable order.
    fn list_all(&self) -> impl Future<Output = Result<Vec<Post>, PostError>> + Send;

    /// Find post by ID.
    fn find_by_id(
        &self,
        id: PostId,
    ) -> impl Future<Output = Result<Option<Post>, PostError>> + Send;

    /// Delete post by ID. Returns `false` when no record matched.
    fn delete_by_id(&self, id: PostId) -> impl Future<Output = Result<bool, PostError>> + Send;
}

/// Coordinates the post repository with the image store.
pub struct PostService<R, S> {
    repo: Arc<R>,
    store: Arc<S>,
    url_ttl: Duration,
}

impl<R: PostRepository, S: ObjectStore> PostService<R, S> {
    /// Lifetime of signed image URLs unless overridden.
    pub const DEFAULT_URL_TTL: Duration = Duration::from_secs(3600);

    /// Create a new post service.
    #[must_use]
    pub fn new(repo: Arc<R>, store: Arc<S>) -> Self {
        Self {
            repo,
            store,
            url_ttl: Self::DEFAULT_URL_TTL,
        }
    }

    /// Override the signed URL lifetime.
    #[must_use]
    pub fn with_url_ttl(mut self, ttl: Duration) -> Self {
        self.url_ttl = ttl;
        self
    }

    /// Lifetime of the URLs this service signs.
    #[must_use]
    pub fn url_ttl(&self) -> Duration {
        self.url_ttl
    }

    /// Store the image, then create the post record pointing at it.
    ///
    /// The returned post carries no signed URL.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No image was supplied
    /// - The image upload fails (no record is created)
    /// - Record creation fails (the stored image is left behind)
    pub async fn compose(&self, input: ComposePostInput) -> Result<Post, PostError> {
        let image = input.image.ok_or(PostError::MissingImage)?;
        let key = image_key(&image.field_name, &image.file_name, Utc::now());

        self.store
            .put(&key, image.bytes, image.content_type.as_deref())
            .await?;

        let created = self
            .repo
            .create(CreatePostInput {
                title: input.title,
                content: input.content,
                image_key: key.clone(),
            })
            .await;

        match created {
            Ok(post) => {
                info!(post_id = %post.id, image_key = %post.image_key, "Post composed");
                Ok(post)
            }
            Err(e) => {
                warn!(
                    image_key = %key,
                    error = %e,
                    "Post record not created; stored image is orphaned"
                );
                Err(e)
            }
        }
    }

    /// List all posts with signed image URLs.
    ///
    /// Signing runs concurrently. A post whose URL cannot be signed is still
    /// returned, with `image` set to `None`. Output order is repository order.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be read.
    pub async fn list(&self) -> Result<Vec<PostWithImage>, PostError> {
        let posts = self.repo.list_all().await?;
        let images = join_all(posts.iter().map(|post| self.sign_or_none(post))).await;

        Ok(posts
            .into_iter()
            .zip(images)
            .map(|(post, image)| PostWithImage { post, image })
            .collect())
    }

    /// Get one post with a signed image URL.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Post not found
    /// - The repository cannot be read
    /// - The image URL cannot be signed
    pub async fn get(&self, id: PostId) -> Result<PostWithImage, PostError> {
        let post = self.find(id).await?;
        let image = self.store.sign_get(&post.image_key, self.url_ttl).await?;

        Ok(PostWithImage {
            post,
            image: Some(image),
        })
    }

    /// Delete a post: image first, then the record.
    ///
    /// An image that is already gone does not block the deletion.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Post not found
    /// - Image deletion fails (the record is kept)
    /// - Record deletion fails (the image is already gone)
    pub async fn delete(&self, id: PostId) -> Result<(), PostError> {
        let post = self.find(id).await?;

        match self.store.delete(&post.image_key).await {
            Ok(()) | Err(StorageError::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }

        match self.repo.delete_by_id(id).await {
            Ok(true) => {
                info!(post_id = %id, image_key = %post.image_key, "Post deleted");
                Ok(())
            }
            Ok(false) => Err(PostError::not_found(id)),
            Err(e) => {
                warn!(
                    post_id = %id,
                    image_key = %post.image_key,
                    error = %e,
                    "Image deleted but post record remains; record references a missing object"
                );
                Err(e)
            }
        }
    }

    async fn find(&self, id: PostId) -> Result<Post, PostError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| PostError::not_found(id))
    }

    async fn sign_or_none(&self, post: &Post) -> Option<PresignedUrl> {
        match self.store.sign_get(&post.image_key, self.url_ttl).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(post_id = %post.id, error = %e, "Failed to sign image URL");
                None
            }
        }
    }
}
