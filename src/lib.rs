//! Catalog of miniature figure sets.
//!
//! The server side is a single JSON array of [`Record`]s behind a
//! [`DocumentStore`] (local files, process memory, or an object-storage
//! bucket) and the [`RecordApi`] that reads and rewrites it. The client side
//! mirrors that array in a [`CatalogCache`], mutates it optimistically, and
//! confirms each write with a [`Verifier`] poll loop.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod favorites;
pub mod record;
pub mod store;
pub mod verify;
pub mod version;

pub use api::{ApiError, RecordApi};
pub use client::{AdminSession, CatalogCache, CatalogClient, FetchError, SaveError};
pub use error::StoreError;
pub use record::{Record, SubItem};
#[cfg(feature = "remote")]
pub use store::ObjectStore;
pub use store::{DocumentStore, FileStore, MemoryStore, RecordStore};
pub use verify::{Expectation, Outcome, Verifier, VerifyConfig, VerifyState};
