//! AdminSession: the back-office workflow over a [`CatalogCache`].
//!
//! Each mutation follows the same path:
//!
//! 1. apply it to the cache so the screen updates immediately,
//! 2. send the whole post-mutation array to the API,
//! 3. start verification and keep "saving" up until the server shows the
//!    change, the attempts run out, or the user cancels.
//!
//! If the send fails the error banner is raised and "saving" is cleared. The
//! optimistic change stays in the cache until the next refresh, and nothing
//! is retried.

use std::collections::HashSet;
use std::sync::Arc;

use super::cache::CatalogCache;
use super::debounce::{Debouncer, SEARCH_QUIET_PERIOD};
use super::{CatalogClient, FetchError, SaveError};
use crate::record::{self, Record, REQUIRED_FIELDS};
use crate::verify::{Expectation, Outcome, Verifier, VerifyConfig, VerifyState};

pub struct AdminSession {
    client: Arc<dyn CatalogClient>,
    cache: CatalogCache,
    verifier: Verifier,
    search: Debouncer<String>,
}

impl AdminSession {
    pub fn new(client: Arc<dyn CatalogClient>) -> Self {
        Self::with_config(client, VerifyConfig::default())
    }

    pub fn with_config(client: Arc<dyn CatalogClient>, config: VerifyConfig) -> Self {
        Self {
            client,
            cache: CatalogCache::new(),
            verifier: Verifier::new(config),
            search: Debouncer::new(String::new(), SEARCH_QUIET_PERIOD),
        }
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    pub fn verification(&self) -> VerifyState {
        self.verifier.state()
    }

    pub fn is_saving(&self) -> bool {
        self.verifier.is_saving()
    }

    pub fn dismiss_error(&mut self) {
        self.cache.dismiss_error();
    }

    /// Fetch the record list into the cache.
    pub async fn load(&mut self) -> Result<(), FetchError> {
        self.cache.refresh(self.client.as_ref()).await
    }

    /// A blank record with an id unused in the cache, for the "add" form.
    pub fn new_record(&self) -> Record {
        Record::blank(record::generate_id(
            self.cache.records().iter().map(|r| r.id.as_str()),
        ))
    }

    /// Save a record from the edit form: update it if the cache has its id,
    /// otherwise add it at the front.
    pub async fn save(&mut self, item: Record) -> Result<(), SaveError> {
        let [name, manufacturer] = REQUIRED_FIELDS;
        if item.name.trim().is_empty() {
            return Err(SaveError::MissingField(name));
        }
        if item.manufacturer.trim().is_empty() {
            return Err(SaveError::MissingField(manufacturer));
        }

        let expectation = if self.cache.apply_update(item.clone()) {
            Expectation::Record(item)
        } else {
            self.cache.apply_create(item);
            Expectation::Length(self.cache.len())
        };
        self.push(expectation).await?;
        Ok(())
    }

    /// Delete one record. Returns `Ok(false)` without calling the API when the
    /// id is not in the cache.
    pub async fn delete(&mut self, id: &str) -> Result<bool, FetchError> {
        if self.cache.apply_delete(id).is_none() {
            tracing::warn!(id, "delete requested for a record not in the cache");
            return Ok(false);
        }
        self.push(Expectation::Length(self.cache.len())).await?;
        Ok(true)
    }

    /// Delete every selected record in one write. Returns how many were removed.
    pub async fn delete_many(&mut self, ids: &HashSet<String>) -> Result<usize, FetchError> {
        let removed = self.cache.apply_delete_many(ids);
        if removed == 0 {
            return Ok(0);
        }
        self.push(Expectation::Length(self.cache.len())).await?;
        Ok(removed)
    }

    /// The user dismissed the saving overlay. The write keeps going; we just
    /// stop watching for it.
    pub fn cancel_saving(&mut self) {
        self.verifier.cancel();
    }

    /// Wait for the current verification run to end.
    pub async fn wait_verified(&mut self) -> Option<Outcome> {
        self.verifier.wait().await
    }

    /// Feed a keystroke to the debounced search box.
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search.input(query.into());
    }

    /// Records to list: everything, or the search hits once the query settles.
    pub fn visible(&self) -> Vec<&Record> {
        self.cache.search(&self.search.settled())
    }

    async fn push(&mut self, expectation: Expectation) -> Result<(), FetchError> {
        match self.client.replace_all(self.cache.records()).await {
            Ok(()) => {
                tracing::info!(records = self.cache.len(), "catalog pushed, verifying");
                self.verifier.start(Arc::clone(&self.client), expectation);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "catalog push failed");
                self.verifier.cancel();
                self.cache.report_error(e.clone());
                Err(e)
            }
        }
    }
}
