//! MemoryStore: process-local documents for single-instance deployments and tests.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::{DocumentStore, RECORDS};
use crate::error::StoreError;

/// In-memory document store backed by a HashMap.
///
/// Clone-friendly via Arc: clones share the same documents. Contents are
/// lost when the process exits and are not shared between processes.
#[derive(Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose record document starts as `snapshot`.
    ///
    /// The snapshot must be a JSON array; anything else is rejected so a bad
    /// deployment variable fails at startup instead of on first read.
    pub fn seeded(snapshot: &str) -> Result<Self, StoreError> {
        let parsed: serde_json::Value =
            serde_json::from_str(snapshot).map_err(|e| StoreError::Malformed {
                key: RECORDS.to_string(),
                message: e.to_string(),
            })?;
        if !parsed.is_array() {
            return Err(StoreError::Malformed {
                key: RECORDS.to_string(),
                message: "seed snapshot must be a JSON array".into(),
            });
        }

        let store = Self::new();
        store
            .documents
            .write()
            .map_err(|_| StoreError::LockPoisoned("seed"))?
            .insert(RECORDS.to_string(), snapshot.as_bytes().to_vec());
        Ok(store)
    }

    /// Number of documents currently held.
    pub fn len(&self) -> usize {
        self.documents.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let documents = self
            .documents
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(documents.get(key).cloned())
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))?;
        documents.insert(key.to_string(), bytes);
        Ok(())
    }
}
