//! ObjectStore: JSON blobs in an object-storage bucket.
//!
//! Speaks the storage REST API:
//!
//! - `GET  {base}/storage/v1/object/{bucket}/{key}`: download
//! - `POST {base}/storage/v1/object/{bucket}/{key}` with `x-upsert: true`: upload
//!
//! The provider does not promise read-after-write consistency. A successful
//! upload only means the provider accepted it; clients confirm visibility with
//! the verification loop.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::StatusCode;

use super::DocumentStore;
use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct ObjectStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl ObjectStore {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key, bucket)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, key
        )
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header("apikey", &self.api_key)
    }
}

/// The storage API reports a missing object either as 404 or as a 400 whose
/// body names the not-found condition.
fn is_missing_object(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::NOT_FOUND {
        return true;
    }
    let body = body.to_ascii_lowercase();
    status == StatusCode::BAD_REQUEST && (body.contains("not_found") || body.contains("not found"))
}

#[async_trait]
impl DocumentStore for ObjectStore {
    fn backend(&self) -> &'static str {
        "object"
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let url = self.object_url(key);
        let response = self
            .authorized(self.client.get(&url))
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", url, e)))?;

        let status = response.status();
        if status.is_success() {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| StoreError::Unavailable(format!("{}: {}", url, e)))?;
            return Ok(Some(bytes.to_vec()));
        }

        let body = response.text().await.unwrap_or_default();
        if is_missing_object(status, &body) {
            return Ok(None);
        }
        Err(StoreError::Unavailable(format!(
            "{} returned {}: {}",
            url, status, body
        )))
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let url = self.object_url(key);
        let size = bytes.len();
        let response = self
            .authorized(self.client.post(&url))
            .header("x-upsert", "true")
            .header(CONTENT_TYPE, "application/json")
            .header(CACHE_CONTROL, "no-cache")
            .body(bytes)
            .send()
            .await
            .map_err(|e| StoreError::WriteFailed(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::WriteFailed(format!(
                "{} returned {}: {}",
                url, status, body
            )));
        }

        tracing::debug!(bucket = %self.bucket, key, bytes = size, "object uploaded");
        Ok(())
    }
}
