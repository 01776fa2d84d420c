//! Core business logic for Quill.
//!
//! This crate contains the post lifecycle with ZERO web or database dependencies.
//! Persistence is reached through the [`post::PostRepository`] trait and image
//! storage through the [`storage::ObjectStore`] trait.
//!
//! # Modules
//!
//! - `post` - Compose, list, detail and delete workflows for posts and their images
//! - `storage` - Object storage backed by Apache OpenDAL

pub mod post;
pub mod storage;
