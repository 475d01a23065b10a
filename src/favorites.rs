//! Server-side favorites: an ordered list of record ids in `favorites.json`.

use crate::api::ApiError;
use crate::store::{self, DocumentStore};

/// All favorite ids. The document is created empty on first access.
pub async fn list(store: &dyn DocumentStore) -> Result<Vec<String>, ApiError> {
    Ok(store::load_or_init(store, store::FAVORITES).await?)
}

/// Add `id` if it is not already a favorite.
pub async fn add(store: &dyn DocumentStore, id: &str) -> Result<Vec<String>, ApiError> {
    let id = checked(id)?;
    let mut favorites = list(store).await?;
    if !favorites.iter().any(|f| f == id) {
        favorites.push(id.to_string());
        store::save_json(store, store::FAVORITES, &favorites).await?;
        tracing::debug!(id, "favorite added");
    }
    Ok(favorites)
}

/// Remove `id`. Removing an id that is not a favorite is a no-op.
pub async fn remove(store: &dyn DocumentStore, id: &str) -> Result<Vec<String>, ApiError> {
    let id = checked(id)?;
    let mut favorites = list(store).await?;
    let before = favorites.len();
    favorites.retain(|f| f != id);
    if favorites.len() != before {
        store::save_json(store, store::FAVORITES, &favorites).await?;
        tracing::debug!(id, "favorite removed");
    }
    Ok(favorites)
}

fn checked(id: &str) -> Result<&str, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::Validation("id is required".into()));
    }
    Ok(id)
}
