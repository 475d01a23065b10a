//! CatalogCache: client-side mirror of the record list.

use std::collections::{BTreeSet, HashSet};

use tokio::sync::watch;

use super::filter::GalleryFilter;
use super::{CatalogClient, FetchError};
use crate::record::Record;

/// Sorted, de-duplicated values of each facet field over the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub manufacturer: Vec<String>,
    pub scale: Vec<String>,
    pub folder: Vec<String>,
    pub material: Vec<String>,
    pub kind: Vec<String>,
}

/// Case-insensitive substring search over `name` and `manufacturer`.
///
/// An empty query matches everything. Order is preserved.
pub fn search<'a>(records: &'a [Record], query: &str) -> Vec<&'a Record> {
    let query = query.to_lowercase();
    records
        .iter()
        .filter(|r| matches_query(r, &query))
        .collect()
}

/// `query` must already be lowercased.
pub(crate) fn matches_query(record: &Record, query: &str) -> bool {
    query.is_empty()
        || record.name.to_lowercase().contains(query)
        || record.manufacturer.to_lowercase().contains(query)
}

/// Disposable copy of the server's record array.
///
/// The loading flag lives on a `watch` channel so a spinner can follow it
/// while [`refresh`](Self::refresh) holds the cache mutably.
#[derive(Debug)]
pub struct CatalogCache {
    records: Vec<Record>,
    loading: watch::Sender<bool>,
    error: Option<FetchError>,
}

impl Default for CatalogCache {
    fn default() -> Self {
        let (loading, _) = watch::channel(false);
        Self {
            records: Vec::new(),
            loading,
            error: None,
        }
    }
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Follow the loading flag, including while a refresh is in flight.
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// The error banner, if one is showing.
    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn report_error(&mut self, error: FetchError) {
        self.error = Some(error);
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Replace the cache with the server's list.
    ///
    /// On success the error banner is cleared. On failure the previous
    /// contents are kept and the error is shown as the banner.
    pub async fn refresh<C>(&mut self, client: &C) -> Result<(), FetchError>
    where
        C: CatalogClient + ?Sized,
    {
        self.loading.send_replace(true);
        let result = client.list().await;
        self.loading.send_replace(false);

        match result {
            Ok(records) => {
                tracing::debug!(records = records.len(), "cache refreshed");
                self.records = records;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "cache refresh failed");
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Overwrite the cache without a fetch.
    pub fn set_records(&mut self, records: Vec<Record>) {
        self.records = records;
    }

    /// Sorted distinct non-empty values of `field` (`manufacturer`, `scale`,
    /// `folder`, `material`, `type`, `year`).
    pub fn facet(&self, field: &str) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|r| r.facet(field))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn facets(&self) -> Facets {
        Facets {
            manufacturer: self.facet("manufacturer"),
            scale: self.facet("scale"),
            folder: self.facet("folder"),
            material: self.facet("material"),
            kind: self.facet("type"),
        }
    }

    pub fn search(&self, query: &str) -> Vec<&Record> {
        search(&self.records, query)
    }

    /// Records visible in the gallery under `filter`.
    pub fn filter(&self, filter: &GalleryFilter, favorites: &HashSet<String>) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|r| filter.matches(r, favorites))
            .collect()
    }

    // --- Optimistic mutation ---

    /// Insert a new record at the front, as the server does.
    pub fn apply_create(&mut self, record: Record) {
        self.records.insert(0, record);
    }

    /// Replace the record with the same id. Returns false if it is not cached.
    pub fn apply_update(&mut self, record: Record) -> bool {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    pub fn apply_delete(&mut self, id: &str) -> Option<Record> {
        let index = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(index))
    }

    /// Remove every record whose id is in `ids`. Returns how many were removed.
    pub fn apply_delete_many(&mut self, ids: &HashSet<String>) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !ids.contains(&r.id));
        before - self.records.len()
    }
}
