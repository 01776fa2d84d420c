//! Object storage for post images using Apache OpenDAL.
//!
//! Supported backends:
//! - S3-compatible: AWS S3, Cloudflare R2, MinIO, DigitalOcean Spaces
//! - Azure Blob Storage
//! - Local filesystem (development only)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   ObjectStore (trait)                            │
//! │     put / get / sign_get / delete  - what posts depend on        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                   StorageService                                 │
//! │ op.write_with("key", data)  │ op.presign_read("key", duration)   │
//! │ op.read("key")              │ op.delete("key")                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod service;
mod store;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::StorageService;
pub use store::{ObjectStore, PresignedUrl, expires_in};
