// src/storage/local.rs
//
// Embedded blob store: bytes on the local disk, display URLs minted per
// process session.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{validate_blob_path, BlobStore};
use crate::domain::MediaSource;
use crate::error::{AppError, AppResult};

/// On-disk blob store rooted in the application data directory.
///
/// Display URLs are derived from a per-process session nonce: within one
/// session the same reference always resolves to the same URL, across
/// restarts the URLs change. The asset protocol layer maps a token back
/// to the file via `path_for_token`.
pub struct LocalBlobStore {
    root: PathBuf,
    session_nonce: Uuid,
    tokens: RwLock<HashMap<String, PathBuf>>,
}

impl LocalBlobStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            session_nonce: Uuid::new_v4(),
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Store under {APP_DATA}/learnhub/media
    pub fn open_default() -> AppResult<Self> {
        let app_data_dir = dirs::data_dir()
            .ok_or_else(|| AppError::Other("Could not determine app data directory".to_string()))?;
        let root = app_data_dir.join("learnhub").join("media");
        std::fs::create_dir_all(&root).map_err(AppError::Io)?;
        Ok(Self::new(root))
    }

    /// Look up the on-disk file behind a minted token. Used by the asset
    /// serving layer; returns None for tokens from other sessions.
    pub fn path_for_token(&self, token: &str) -> Option<PathBuf> {
        self.tokens.read().unwrap().get(token).cloned()
    }

    fn disk_path(&self, path: &str) -> PathBuf {
        let mut full = self.root.clone();
        for segment in path.split('/') {
            full.push(segment);
        }
        full
    }

    fn token_for(&self, path: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.session_nonce.as_bytes());
        hasher.update(path.as_bytes());
        let digest = hasher.finalize();
        format!("{:x}", digest)[..32].to_string()
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, path: &str, bytes: &[u8]) -> AppResult<MediaSource> {
        validate_blob_path(path)?;

        let disk_path = self.disk_path(path);
        if let Some(parent) = disk_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::MediaUploadFailed(e.to_string()))?;
        }
        tokio::fs::write(&disk_path, bytes)
            .await
            .map_err(|e| AppError::MediaUploadFailed(e.to_string()))?;

        let digest = Sha256::digest(bytes);
        log::debug!("stored blob {} ({} bytes, sha256 {:x})", path, bytes.len(), digest);

        Ok(MediaSource::stored(path))
    }

    async fn resolve(&self, source: &MediaSource) -> AppResult<String> {
        match source {
            MediaSource::External { url } => Ok(url.clone()),
            MediaSource::Stored { path } => {
                let disk_path = self.disk_path(path);
                match tokio::fs::metadata(&disk_path).await {
                    Ok(metadata) if metadata.is_file() => {}
                    _ => return Err(AppError::NotFound),
                }

                let token = self.token_for(path);
                self.tokens.write().unwrap().insert(token.clone(), disk_path);
                Ok(format!("asset://media/{}", token))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (LocalBlobStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (LocalBlobStore::new(dir.path().to_path_buf()), dir)
    }

    #[tokio::test]
    async fn test_put_then_resolve_is_stable_within_session() {
        let (store, _dir) = store();

        let source = store.put("users/u1/photo.png", b"png-bytes").await.unwrap();
        let first = store.resolve(&source).await.unwrap();
        let second = store.resolve(&source).await.unwrap();

        assert!(!first.is_empty());
        assert_eq!(first, second);

        // The URL maps back to retrievable content
        let token = first.strip_prefix("asset://media/").unwrap();
        let path = store.path_for_token(token).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"png-bytes");
    }

    #[tokio::test]
    async fn test_urls_are_ephemeral_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let source = {
            let store = LocalBlobStore::new(dir.path().to_path_buf());
            store.put("courses/c1/image", b"img").await.unwrap()
        };

        // A fresh store over the same root simulates a process restart:
        // the content is still there, the URL is different.
        let restarted = LocalBlobStore::new(dir.path().to_path_buf());
        let url = restarted.resolve(&source).await.unwrap();
        assert!(url.starts_with("asset://media/"));

        let again = LocalBlobStore::new(dir.path().to_path_buf());
        assert_ne!(url, again.resolve(&source).await.unwrap());
    }

    #[tokio::test]
    async fn test_put_is_last_write_wins() {
        let (store, _dir) = store();

        store.put("courses/c1/image", b"first").await.unwrap();
        let source = store.put("courses/c1/image", b"second").await.unwrap();

        let url = store.resolve(&source).await.unwrap();
        let token = url.strip_prefix("asset://media/").unwrap();
        let path = store.path_for_token(token).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_resolve_external_passes_through() {
        let (store, _dir) = store();
        let source = MediaSource::external("https://example.com/video.mp4");
        assert_eq!(
            store.resolve(&source).await.unwrap(),
            "https://example.com/video.mp4"
        );
    }

    #[tokio::test]
    async fn test_resolve_missing_content_fails() {
        let (store, _dir) = store();
        let source = MediaSource::stored("users/u9/photo.png");
        assert!(matches!(
            store.resolve(&source).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_put_rejects_escaping_paths() {
        let (store, _dir) = store();
        let result = store.put("../outside", b"x").await;
        assert!(matches!(result, Err(AppError::MediaUploadFailed(_))));
    }
}
