//! Gallery filter: search text, facet tags and a favorites-only switch.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::cache::matches_query;
use crate::record::Record;

/// Facet fields the gallery offers as tags.
pub const TAG_FIELDS: [&str; 4] = ["material", "manufacturer", "scale", "type"];

/// Active gallery filters.
///
/// Tags within one field are alternatives; fields are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryFilter {
    query: String,
    tags: BTreeMap<String, BTreeSet<String>>,
    favorites_only: bool,
}

impl GalleryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Set the (already debounced) search text.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into().to_lowercase();
    }

    /// Turn a tag on if it is off, off if it is on.
    pub fn toggle_tag(&mut self, field: &str, value: &str) {
        let values = self.tags.entry(field.to_string()).or_default();
        if !values.remove(value) {
            values.insert(value.to_string());
        }
        if values.is_empty() {
            self.tags.remove(field);
        }
    }

    pub fn is_tag_active(&self, field: &str, value: &str) -> bool {
        self.tags.get(field).is_some_and(|v| v.contains(value))
    }

    /// Clear every tag. Search text and the favorites switch are kept.
    pub fn reset_tags(&mut self) {
        self.tags.clear();
    }

    pub fn favorites_only(&self) -> bool {
        self.favorites_only
    }

    pub fn toggle_favorites(&mut self) {
        self.favorites_only = !self.favorites_only;
    }

    pub fn matches(&self, record: &Record, favorites: &HashSet<String>) -> bool {
        if !matches_query(record, &self.query) {
            return false;
        }
        let tags_match = self.tags.iter().all(|(field, values)| {
            record
                .facet(field)
                .is_some_and(|value| values.contains(value))
        });
        tags_match && (!self.favorites_only || favorites.contains(&record.id))
    }
}
