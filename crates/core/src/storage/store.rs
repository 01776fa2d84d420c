//! The narrow object store interface consumed by the post lifecycle.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::error::StorageError;

/// Presigned URL for a read-only download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedUrl {
    /// The presigned URL.
    pub url: String,
    /// HTTP method to use.
    pub method: String,
    /// When the URL expires.
    pub expires_at: DateTime<Utc>,
}

/// Object store capability.
///
/// Implemented by [`StorageService`](super::StorageService) for real backends
/// and by in-memory fakes in tests.
pub trait ObjectStore: Send + Sync {
    /// Store a payload under `key`, replacing any existing object.
    fn put(
        &self,
        key: &str,
        payload: Bytes,
        content_type: Option<&str>,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Fetch the payload stored under `key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Bytes, StorageError>> + Send;

    /// Mint a read-only URL for `key` that expires after `ttl`.
    fn sign_get(
        &self,
        key: &str,
        ttl: Duration,
    ) -> impl Future<Output = Result<PresignedUrl, StorageError>> + Send;

    /// Remove the object under `key`. Removing a missing key succeeds.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Compute the expiry instant of a URL signed now for `ttl`.
#[must_use]
pub fn expires_in(ttl: Duration) -> DateTime<Utc> {
    let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
    Utc::now()
        .checked_add_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
