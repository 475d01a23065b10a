use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use minifig_catalog::store::MemoryStore;
use minifig_catalog::{CatalogClient, FetchError, Record, RecordApi};

pub fn record(id: &str, name: &str, manufacturer: &str) -> Record {
    let mut record = Record::blank(id);
    record.name = name.into();
    record.manufacturer = manufacturer.into();
    record
}

/// In-process client over a memory store: writes are visible immediately.
pub fn in_process(records: &[Record]) -> Arc<dyn CatalogClient> {
    let seed = serde_json::to_string(records).unwrap();
    Arc::new(RecordApi::new(Arc::new(MemoryStore::seeded(&seed).unwrap())))
}

/// A client whose writes only show up in `list` after `lag` polls, the way
/// an eventually consistent bucket behaves.
pub struct LaggingClient {
    lag: u32,
    inner: Mutex<Lagged>,
    pub writes: AtomicU32,
}

#[derive(Default)]
struct Lagged {
    visible: Vec<Record>,
    pending: Option<Vec<Record>>,
    polls_since_write: u32,
}

impl LaggingClient {
    pub fn new(lag: u32) -> Self {
        Self {
            lag,
            inner: Mutex::new(Lagged::default()),
            writes: AtomicU32::new(0),
        }
    }

    /// Writes never become visible.
    pub fn stuck() -> Self {
        Self::new(u32::MAX)
    }
}

#[async_trait]
impl CatalogClient for LaggingClient {
    async fn list(&self) -> Result<Vec<Record>, FetchError> {
        let mut inner = self.inner.lock().unwrap();
        inner.polls_since_write = inner.polls_since_write.saturating_add(1);
        if inner.polls_since_write >= self.lag {
            if let Some(pending) = inner.pending.take() {
                inner.visible = pending;
            }
        }
        Ok(inner.visible.clone())
    }

    async fn replace_all(&self, records: &[Record]) -> Result<(), FetchError> {
        let mut inner = self.inner.lock().unwrap();
        inner.pending = Some(records.to_vec());
        inner.polls_since_write = 0;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Reads succeed with a fixed list; every write is rejected.
pub struct RejectingClient {
    pub records: Vec<Record>,
}

#[async_trait]
impl CatalogClient for RejectingClient {
    async fn list(&self) -> Result<Vec<Record>, FetchError> {
        Ok(self.records.clone())
    }

    async fn replace_all(&self, _records: &[Record]) -> Result<(), FetchError> {
        Err(FetchError::Status {
            status: 500,
            message: "store write failed: disk full".into(),
        })
    }
}
