//! Post types and data structures.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use quill_shared::types::PostId;

use crate::storage::PresignedUrl;

/// Post domain model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Unique identifier, assigned by the repository.
    pub id: PostId,
    /// Post title.
    pub title: Option<String>,
    /// Post body text.
    pub content: Option<String>,
    /// Object store key of the post image. Never exposed to API callers.
    pub image_key: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a post record.
#[derive(Debug, Clone)]
pub struct CreatePostInput {
    /// Post title.
    pub title: Option<String>,
    /// Post body text.
    pub content: Option<String>,
    /// Key of the already stored image.
    pub image_key: String,
}

/// An uploaded image file.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Name of the form field the file arrived in.
    pub field_name: String,
    /// Client-supplied file name.
    pub file_name: String,
    /// Client-supplied content type.
    pub content_type: Option<String>,
    /// File contents.
    pub bytes: Bytes,
}

/// Input for composing a new post.
#[derive(Debug, Clone, Default)]
pub struct ComposePostInput {
    /// Post title.
    pub title: Option<String>,
    /// Post body text.
    pub content: Option<String>,
    /// The image; required.
    pub image: Option<ImageUpload>,
}

/// A post together with a freshly signed image URL.
#[derive(Debug, Clone)]
pub struct PostWithImage {
    /// The post.
    pub post: Post,
    /// Signed read URL, `None` when signing failed in a tolerant listing.
    pub image: Option<PresignedUrl>,
}
