//! HttpClient: reaches the Record API over HTTP.
//!
//! Requires the `remote` feature.

use async_trait::async_trait;
use serde_json::Value;

use super::{CatalogClient, FetchError};
use crate::record::Record;

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// `base_url` is the server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn data_url(&self) -> String {
        format!("{}/api/data", self.base_url)
    }
}

/// Turn a non-success response into `FetchError::Status`, preferring the
/// API's `{ "error": ... }` message over the raw body.
async fn status_error(response: reqwest::Response) -> FetchError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body);
    FetchError::Status { status, message }
}

fn network(err: reqwest::Error) -> FetchError {
    FetchError::Network(err.to_string())
}

#[async_trait]
impl CatalogClient for HttpClient {
    async fn list(&self) -> Result<Vec<Record>, FetchError> {
        let response = self
            .client
            .get(self.data_url())
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(network)?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn replace_all(&self, records: &[Record]) -> Result<(), FetchError> {
        let response = self
            .client
            .put(self.data_url())
            .json(records)
            .send()
            .await
            .map_err(network)?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(())
    }
}
