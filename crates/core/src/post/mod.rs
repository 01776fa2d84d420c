//! Post lifecycle management.
//!
//! This module provides the business logic for posts and their images:
//! - Compose (image upload, then record)
//! - Listing with per-post signed image URLs
//! - Detail lookup with a signed image URL
//! - Deletion (image, then record)

mod error;
mod key;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use error::PostError;
pub use key::{IMAGE_KEY_PREFIX, image_key};
pub use service::{PostRepository, PostService};
pub use types::{ComposePostInput, CreatePostInput, ImageUpload, Post, PostWithImage};
