//! RecordApi: stateless CRUD operations over an injected document store.
//!
//! Every mutation is a read-modify-write of the whole record document.
//! Concurrent mutations are not serialized: two requests racing on the same
//! store produce last-writer-wins with no merge and no conflict detection.

use std::sync::Arc;

use serde_json::Value;

use super::error::ApiError;
use crate::record::{self, Record};
use crate::store::{DocumentStore, RecordStore};

/// CRUD handlers for the catalog.
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct RecordApi {
    store: Arc<dyn DocumentStore>,
}

impl RecordApi {
    /// Create an API over an explicitly constructed store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// The underlying document store.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Return the full record array.
    pub async fn list(&self) -> Result<Vec<Record>, ApiError> {
        Ok(self.store.load().await?)
    }

    /// Return one record by id.
    pub async fn get(&self, id: &str) -> Result<Record, ApiError> {
        self.list()
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))
    }

    /// Validate and insert a new record at the front of the array.
    ///
    /// `name` and `manufacturer` are required. A fresh id is generated when
    /// the payload has none; a supplied id must not already exist.
    pub async fn create(&self, payload: Value) -> Result<Record, ApiError> {
        let Value::Object(mut fields) = payload else {
            return Err(ApiError::Validation("record must be a JSON object".into()));
        };
        if let Some(field) = record::missing_required(&fields) {
            return Err(ApiError::Validation(format!("{} is required", field)));
        }

        let mut records = self.store.load().await?;
        let supplied = fields
            .get("id")
            .and_then(|v| match v {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|id| !id.is_empty());

        let id = match supplied {
            Some(id) if records.iter().any(|r| r.id == id) => {
                return Err(ApiError::Validation(format!("id {} already exists", id)));
            }
            Some(id) => id,
            None => record::generate_id(records.iter().map(|r| r.id.as_str())),
        };
        fields.insert("id".into(), Value::String(id));

        let created: Record = serde_json::from_value(Value::Object(fields))?;
        records.insert(0, created.clone());
        self.store.replace(&records).await?;

        tracing::info!(id = %created.id, total = records.len(), "record created");
        Ok(created)
    }

    /// Shallow-merge `patch` into the record with `id`.
    ///
    /// The stored `id` is kept, and `subItems` are kept unless the patch
    /// supplies them.
    pub async fn update(&self, id: &str, patch: Value) -> Result<Record, ApiError> {
        let mut records = self.store.load().await?;
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;

        let merged = record::merge(&records[index], &patch)?;
        records[index] = merged.clone();
        self.store.replace(&records).await?;

        tracing::info!(id, "record updated");
        Ok(merged)
    }

    /// Merge into an existing record, or append when `id` is unknown.
    ///
    /// This is the forgiving per-record write used alongside whole-array
    /// replace: a missing id is an implicit insert rather than an error.
    pub async fn upsert(&self, id: &str, payload: Value) -> Result<Record, ApiError> {
        let mut records = self.store.load().await?;
        let saved = match records.iter().position(|r| r.id == id) {
            Some(index) => {
                let merged = record::merge(&records[index], &payload)?;
                records[index] = merged.clone();
                merged
            }
            None => {
                let appended = record::merge(&Record::blank(id), &payload)?;
                records.push(appended.clone());
                tracing::info!(id, "upsert target missing, appended");
                appended
            }
        };
        self.store.replace(&records).await?;
        Ok(saved)
    }

    /// Overwrite the whole array with `records`, trusted as sent.
    pub async fn replace_all(&self, records: Vec<Record>) -> Result<(), ApiError> {
        self.store.replace(&records).await?;
        tracing::info!(total = records.len(), "record array replaced");
        Ok(())
    }

    /// Remove the record with `id` and, where the backend has one, its
    /// image-asset folder.
    pub async fn delete(&self, id: &str) -> Result<Record, ApiError> {
        let mut records = self.store.load().await?;
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;

        let removed = records.remove(index);
        self.store.replace(&records).await?;
        self.store.remove_assets(&removed.folder).await;

        tracing::info!(id, remaining = records.len(), "record deleted");
        Ok(removed)
    }
}
