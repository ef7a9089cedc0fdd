// src/remote/client.rs
//
// Document store client for the hosted backend.
//
// ARCHITECTURE:
// - Documents live in named collections, addressed {base}/v1/{collection}/{id}
// - Equality queries POST to {base}/v1/{collection}:query
// - Multi-document atomic writes POST to {base}/v1:commit
// - After every acknowledged write the client emits CollectionChanged on
//   the event bus, which is the push-notification surface UI live
//   queries subscribe to
//
// CRITICAL RULES:
// - This is INFRASTRUCTURE, not DOMAIN
// - Server-side semantics are last-write-wins per document; the only
//   conditional primitive is create-only (HTTP 409 on conflict), which
//   repositories use to simulate unique indexes

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::events::{CollectionChanged, EventBus};

/// Connection settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Read LEARNHUB_API_URL (required) and LEARNHUB_API_KEY (optional).
    pub fn from_env() -> AppResult<Self> {
        let base_url = std::env::var("LEARNHUB_API_URL")
            .map_err(|_| AppError::Other("LEARNHUB_API_URL is not set".to_string()))?;
        let mut config = Self::new(base_url);
        if let Ok(api_key) = std::env::var("LEARNHUB_API_KEY") {
            config = config.with_api_key(api_key);
        }
        Ok(config)
    }
}

/// Equality filter for a collection query.
#[derive(Debug, Clone, Serialize)]
pub struct Filter {
    pub field: String,
    #[serde(rename = "equals")]
    pub value: serde_json::Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// A multi-document write applied atomically by the server: either every
/// operation commits or none do.
#[derive(Debug, Default, Serialize)]
pub struct WriteBatch {
    writes: Vec<WriteOp>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum WriteOp {
    Set {
        collection: String,
        id: String,
        data: serde_json::Value,
    },
    Create {
        collection: String,
        id: String,
        data: serde_json::Value,
    },
    Delete {
        collection: String,
        id: String,
    },
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: Serialize>(
        &mut self,
        collection: impl Into<String>,
        id: impl Into<String>,
        doc: &T,
    ) -> AppResult<()> {
        self.writes.push(WriteOp::Set {
            collection: collection.into(),
            id: id.into(),
            data: serde_json::to_value(doc)?,
        });
        Ok(())
    }

    pub fn create<T: Serialize>(
        &mut self,
        collection: impl Into<String>,
        id: impl Into<String>,
        doc: &T,
    ) -> AppResult<()> {
        self.writes.push(WriteOp::Create {
            collection: collection.into(),
            id: id.into(),
            data: serde_json::to_value(doc)?,
        });
        Ok(())
    }

    pub fn delete(&mut self, collection: impl Into<String>, id: impl Into<String>) {
        self.writes.push(WriteOp::Delete {
            collection: collection.into(),
            id: id.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Distinct collections touched, in first-seen order.
    fn collections(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for write in &self.writes {
            let collection = match write {
                WriteOp::Set { collection, .. }
                | WriteOp::Create { collection, .. }
                | WriteOp::Delete { collection, .. } => collection,
            };
            if !seen.iter().any(|c| c == collection) {
                seen.push(collection.clone());
            }
        }
        seen
    }
}

/// Document store client.
pub struct RemoteStore {
    base_url: String,
    http: Client,
    api_key: Option<String>,
    notifier: Option<Arc<EventBus>>,
}

impl RemoteStore {
    pub fn new(config: RemoteConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::StorageUnavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url,
            http,
            api_key: config.api_key,
            notifier: None,
        })
    }

    /// Attach the event bus that receives CollectionChanged after every
    /// acknowledged write.
    pub fn with_notifier(mut self, bus: Arc<EventBus>) -> Self {
        self.notifier = Some(bus);
        self
    }

    fn doc_url(&self, collection: &str, id: &str) -> String {
        format!("{}/v1/{}/{}", self.base_url, collection, id)
    }

    fn auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(header::AUTHORIZATION, format!("Bearer {}", key)),
            None => request,
        }
    }

    fn notify(&self, collection: &str) {
        if let Some(bus) = &self.notifier {
            bus.emit(CollectionChanged::new(collection));
        }
    }

    /// Fetch one document; None when it does not exist.
    pub async fn get_doc<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> AppResult<Option<T>> {
        let response = self
            .auth(self.http.get(self.doc_url(collection, id)))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let doc = response
                    .json::<T>()
                    .await
                    .map_err(|e| AppError::Other(format!("Malformed document body: {}", e)))?;
                Ok(Some(doc))
            }
            status => Err(AppError::StorageUnavailable(format!(
                "GET {}/{} returned {}",
                collection, id, status
            ))),
        }
    }

    /// Write one document unconditionally (last write wins).
    pub async fn set_doc<T: Serialize + Sync>(
        &self,
        collection: &str,
        id: &str,
        doc: &T,
    ) -> AppResult<()> {
        let response = self
            .auth(self.http.put(self.doc_url(collection, id)))
            .json(doc)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::StorageUnavailable(format!(
                "PUT {}/{} returned {}",
                collection, id, response.status()
            )));
        }

        self.notify(collection);
        Ok(())
    }

    /// Create-only write. Returns false (and writes nothing) when a
    /// document with this id already exists.
    pub async fn create_doc<T: Serialize + Sync>(
        &self,
        collection: &str,
        id: &str,
        doc: &T,
    ) -> AppResult<bool> {
        let url = format!("{}?mode=create", self.doc_url(collection, id));
        let response = self.auth(self.http.post(url)).json(doc).send().await?;

        match response.status() {
            StatusCode::CONFLICT => Ok(false),
            status if status.is_success() => {
                self.notify(collection);
                Ok(true)
            }
            status => Err(AppError::StorageUnavailable(format!(
                "CREATE {}/{} returned {}",
                collection, id, status
            ))),
        }
    }

    pub async fn delete_doc(&self, collection: &str, id: &str) -> AppResult<()> {
        let response = self
            .auth(self.http.delete(self.doc_url(collection, id)))
            .send()
            .await?;

        // Deleting an absent document is a no-op, matching the embedded
        // backend's DELETE semantics at this layer.
        if !response.status().is_success() && response.status() != StatusCode::NOT_FOUND {
            return Err(AppError::StorageUnavailable(format!(
                "DELETE {}/{} returned {}",
                collection, id, response.status()
            )));
        }

        self.notify(collection);
        Ok(())
    }

    /// Equality query over one collection. An empty filter list lists the
    /// whole collection.
    pub async fn query_docs<T: DeserializeOwned>(
        &self,
        collection: &str,
        filters: &[Filter],
    ) -> AppResult<Vec<T>> {
        let url = format!("{}/v1/{}:query", self.base_url, collection);
        let body = json!({ "where": filters });

        let response = self.auth(self.http.post(url)).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(AppError::StorageUnavailable(format!(
                "QUERY {} returned {}",
                collection,
                response.status()
            )));
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| AppError::Other(format!("Malformed query response: {}", e)))
    }

    pub async fn list_docs<T: DeserializeOwned>(&self, collection: &str) -> AppResult<Vec<T>> {
        self.query_docs(collection, &[]).await
    }

    /// Apply a batch atomically. One CollectionChanged fires per distinct
    /// collection touched.
    pub async fn commit(&self, batch: WriteBatch) -> AppResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let collections = batch.collections();
        let url = format!("{}/v1:commit", self.base_url);
        let response = self.auth(self.http.post(url)).json(&batch).send().await?;

        if !response.status().is_success() {
            return Err(AppError::StorageUnavailable(format!(
                "COMMIT of {} writes returned {}",
                batch.len(),
                response.status()
            )));
        }

        for collection in collections {
            self.notify(&collection);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_normalizes_base_url() {
        let config = RemoteConfig::new("https://api.example.com/");
        assert_eq!(config.base_url, "https://api.example.com");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_doc_url_shape() {
        let store = RemoteStore::new(RemoteConfig::new("https://api.example.com")).unwrap();
        assert_eq!(
            store.doc_url("courses", "abc"),
            "https://api.example.com/v1/courses/abc"
        );
    }

    #[test]
    fn test_batch_tracks_distinct_collections_in_order() {
        let mut batch = WriteBatch::new();
        batch.set("users", "u1", &json!({"name": "A"})).unwrap();
        batch.create("courses", "c1", &json!({"title": "T"})).unwrap();
        batch.delete("users", "u2");

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.collections(), vec!["users", "courses"]);
    }

    #[test]
    fn test_filter_serialization_shape() {
        let filter = Filter::eq("status", "published");
        let value = serde_json::to_value(&filter).unwrap();
        assert_eq!(value, json!({"field": "status", "equals": "published"}));
    }
}
