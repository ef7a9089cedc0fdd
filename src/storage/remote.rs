// src/storage/remote.rs
//
// Hosted blob store: bytes in object storage behind the API, permanent
// download URLs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use sha2::{Digest, Sha256};

use super::{validate_blob_path, BlobStore};
use crate::domain::MediaSource;
use crate::error::{AppError, AppResult};
use crate::remote::RemoteConfig;

pub struct RemoteBlobStore {
    base_url: String,
    http: Client,
    api_key: Option<String>,
}

impl RemoteBlobStore {
    pub fn new(config: &RemoteConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::StorageUnavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.clone(),
            http,
            api_key: config.api_key.clone(),
        })
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/{}", self.base_url, path)
    }

    fn auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(header::AUTHORIZATION, format!("Bearer {}", key)),
            None => request,
        }
    }
}

#[async_trait]
impl BlobStore for RemoteBlobStore {
    async fn put(&self, path: &str, bytes: &[u8]) -> AppResult<MediaSource> {
        validate_blob_path(path)?;

        let digest = format!("{:x}", Sha256::digest(bytes));
        let response = self
            .auth(self.http.put(self.object_url(path)))
            .header("x-content-sha256", &digest)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| AppError::MediaUploadFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::MediaUploadFailed(format!(
                "upload of {} returned {}",
                path,
                response.status()
            )));
        }

        log::debug!("uploaded blob {} ({} bytes, sha256 {})", path, bytes.len(), digest);
        Ok(MediaSource::stored(path))
    }

    async fn resolve(&self, source: &MediaSource) -> AppResult<String> {
        match source {
            MediaSource::External { url } => Ok(url.clone()),
            // Download URLs are deterministic and permanent; no round trip.
            MediaSource::Stored { path } => Ok(format!("{}?alt=media", self.object_url(path))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RemoteBlobStore {
        RemoteBlobStore::new(&RemoteConfig::new("https://api.example.com")).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_builds_permanent_download_url() {
        let store = store();
        let source = MediaSource::stored("courses/c1/image");

        let url = store.resolve(&source).await.unwrap();
        assert_eq!(url, "https://api.example.com/storage/v1/courses/c1/image?alt=media");

        // Stable across calls: permanent, not session-scoped
        assert_eq!(url, store.resolve(&source).await.unwrap());
    }

    #[tokio::test]
    async fn test_resolve_external_passes_through() {
        let store = store();
        let source = MediaSource::external("https://cdn.example.com/intro.mp4");
        assert_eq!(
            store.resolve(&source).await.unwrap(),
            "https://cdn.example.com/intro.mp4"
        );
    }

    #[tokio::test]
    async fn test_put_rejects_invalid_paths_before_any_network_io() {
        let store = store();
        assert!(matches!(
            store.put("../escape", b"x").await,
            Err(AppError::MediaUploadFailed(_))
        ));
    }
}
