//! client: the browser-side half of the catalog, expressed as a library.
//!
//! - [`CatalogCache`]: read-model mirror of the record list, with facets,
//!   search and gallery filtering, plus optimistic local mutation.
//! - [`Debouncer`]: re-run search only after a quiet period.
//! - [`AdminSession`]: the admin workflow. Mutate the cache, push the
//!   whole array, then verify the write landed.
//! - [`CatalogClient`]: how the client reaches the Record API. Implemented by
//!   `HttpClient` (feature `remote`) and by [`RecordApi`] for in-process use.
//!
//! The cache is disposable. Every mutation goes through the API before it is
//! trusted, and nothing here retries a failed write.

mod admin;
mod cache;
mod debounce;
mod filter;
#[cfg(feature = "remote")]
mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::api::RecordApi;
use crate::record::Record;

pub use admin::AdminSession;
pub use cache::{search, CatalogCache, Facets};
pub use debounce::{Debouncer, SEARCH_QUIET_PERIOD};
pub use filter::{GalleryFilter, TAG_FIELDS};
#[cfg(feature = "remote")]
pub use http::HttpClient;

/// A failed call from the client to the Record API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never got a response.
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    /// The response body was not what the API promises.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Why an admin save did not go out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// The calls the client makes against the Record API.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch the full record array.
    async fn list(&self) -> Result<Vec<Record>, FetchError>;

    /// Replace the whole record array with `records`.
    async fn replace_all(&self, records: &[Record]) -> Result<(), FetchError>;
}

/// In-process client: calls the API directly, with the same error surface a
/// remote client would see.
#[async_trait]
impl CatalogClient for RecordApi {
    async fn list(&self) -> Result<Vec<Record>, FetchError> {
        RecordApi::list(self).await.map_err(|e| FetchError::Status {
            status: e.status_code(),
            message: e.to_string(),
        })
    }

    async fn replace_all(&self, records: &[Record]) -> Result<(), FetchError> {
        RecordApi::replace_all(self, records.to_vec())
            .await
            .map_err(|e| FetchError::Status {
                status: e.status_code(),
                message: e.to_string(),
            })
    }
}
