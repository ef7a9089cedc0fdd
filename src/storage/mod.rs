// src/storage/mod.rs
//
// Blob Store - binary media lifecycle
//
// CONTRACT:
// - put(path, bytes) is idempotent per path; last write wins
// - put must complete before any caller persists a record pointing at it
// - resolve(reference) yields a display URL; callers must never persist
//   a resolved URL back into a record
// - URL stability differs by backend: the embedded store mints
//   session-scoped URLs that do not survive a restart, the hosted store
//   yields permanent download URLs. Callers must tolerate both.

pub mod local;
pub mod remote;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::MediaSource;
use crate::error::{AppError, AppResult};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under a path, returning the stable reference to
    /// persist. Overwrites any previous content at the same path.
    async fn put(&self, path: &str, bytes: &[u8]) -> AppResult<MediaSource>;

    /// Produce a display URL for a reference. External references pass
    /// through unchanged.
    async fn resolve(&self, source: &MediaSource) -> AppResult<String>;
}

/// Storage paths are relative, slash-separated, and may not climb out of
/// the store's namespace.
pub fn validate_blob_path(path: &str) -> AppResult<()> {
    if path.is_empty() || path.starts_with('/') || path.contains('\\') {
        return Err(AppError::MediaUploadFailed(format!(
            "Invalid storage path: {}",
            path
        )));
    }
    if path.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..") {
        return Err(AppError::MediaUploadFailed(format!(
            "Invalid storage path: {}",
            path
        )));
    }
    Ok(())
}

pub use local::LocalBlobStore;
pub use remote::RemoteBlobStore;
