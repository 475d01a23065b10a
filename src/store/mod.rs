//! Store: whole-document JSON persistence behind one contract.
//!
//! A [`DocumentStore`] reads and writes named JSON documents. Every document
//! store is also a [`RecordStore`]: `load()` returns the catalog array and
//! `replace()` overwrites it. There is no record-level primitive; every
//! mutation is a read-modify-write of the whole document and the last writer
//! wins.
//!
//! ## Backends
//!
//! - [`FileStore`]: JSON files in a data directory, atomic writes, strongly
//!   consistent. Also owns the image-asset tree for cascading deletes.
//! - [`MemoryStore`]: process-local documents seeded from a snapshot.
//! - `ObjectStore` (feature `remote`): blobs in an object-storage bucket;
//!   read-after-write is not guaranteed.
//!
//! ## Documents
//!
//! ```text
//! data.json        # record array
//! version.json     # { version, lastUpdated }
//! favorites.json   # array of record ids
//! ```

mod file;
mod memory;
#[cfg(feature = "remote")]
mod object;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;
use crate::record::Record;

pub use file::FileStore;
pub use memory::MemoryStore;
#[cfg(feature = "remote")]
pub use object::ObjectStore;

/// Key of the record array document.
pub const RECORDS: &str = "data.json";
/// Key of the site version document.
pub const VERSION: &str = "version.json";
/// Key of the favorites document.
pub const FAVORITES: &str = "favorites.json";

/// Raw document storage.
///
/// Implementations only move bytes; typed access goes through
/// [`load_json`]/[`save_json`] and the [`RecordStore`] blanket impl.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// Read a document. `Ok(None)` means the document has never been written.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Overwrite a document with `bytes`.
    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;

    /// Delete the image-asset group for `folder`.
    ///
    /// Best-effort: backends without an asset tree do nothing, and failures
    /// are logged rather than returned.
    async fn remove_assets(&self, _folder: &str) {}
}

/// Load a typed document, or `None` if it does not exist yet.
pub async fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    S: DocumentStore + ?Sized,
{
    match store.read(key).await? {
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Malformed {
                key: key.to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Serialize and overwrite a typed document.
pub async fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: DocumentStore + ?Sized,
{
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| StoreError::Malformed {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.write(key, bytes).await
}

/// Load a typed document, writing `T::default()` first if it does not exist.
pub async fn load_or_init<T, S>(store: &S, key: &str) -> Result<T, StoreError>
where
    T: DeserializeOwned + Serialize + Default + Send,
    S: DocumentStore + ?Sized,
{
    if let Some(value) = load_json(store, key).await? {
        return Ok(value);
    }
    let value = T::default();
    save_json(store, key, &value).await?;
    tracing::debug!(backend = store.backend(), key, "initialized empty document");
    Ok(value)
}

/// The record array contract: whole-document load and replace.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Return the full record array. A store with no document yet is
    /// initialized to `[]`.
    async fn load(&self) -> Result<Vec<Record>, StoreError>;

    /// Overwrite the record array.
    async fn replace(&self, records: &[Record]) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> RecordStore for S
where
    S: DocumentStore + ?Sized,
{
    async fn load(&self) -> Result<Vec<Record>, StoreError> {
        load_or_init(self, RECORDS).await
    }

    async fn replace(&self, records: &[Record]) -> Result<(), StoreError> {
        save_json(self, RECORDS, records).await
    }
}
