//! HTTP transport for the Record API.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET    /api/data`: full record array.
//! - `POST   /api/data`: create from a partial record; returns the record.
//! - `PUT    /api/data`: replace the whole array; returns `{ "success": true }`.
//! - `GET    /api/data/:id`: one record.
//! - `PUT    /api/data/:id`: merge a partial record; 404 on unknown id.
//! - `DELETE /api/data/:id`: delete; returns `{ "success": true }`.
//! - `GET|PUT /api/admin/data`: admin aliases of list / whole-array replace.
//! - `PUT    /api/admin/data/:id`: merge, appending when the id is unknown.
//! - `DELETE /api/admin/data/:id`: delete.
//! - `GET    /api/version`, `PUT /api/admin/version`: site version document.
//! - `GET|POST|DELETE /api/favorites`: server-side favorites.
//! - `GET    /health`: `{ "ok": true, "backend": ... }`.
//!
//! Errors are `{ "error": message }` with the status from
//! [`ApiError::status_code`]. Bodies are parsed by hand so malformed JSON is a
//! 400 rather than axum's default rejection.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use minifig_catalog::api::{self, RecordApi};
//! use minifig_catalog::store::MemoryStore;
//!
//! let api = Arc::new(RecordApi::new(Arc::new(MemoryStore::new())));
//! api::serve(api, "0.0.0.0:3000").await?;
//! ```

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::ApiError;
use super::service::RecordApi;
use crate::record::Record;
use crate::{favorites, version};

type ApiState = State<Arc<RecordApi>>;

/// Build an axum `Router` serving the catalog API.
pub fn router(api: Arc<RecordApi>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/data",
            get(list_handler).post(create_handler).put(replace_handler),
        )
        .route(
            "/api/data/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .route("/api/admin/data", get(list_handler).put(replace_handler))
        .route(
            "/api/admin/data/:id",
            put(upsert_handler).delete(delete_handler),
        )
        .route("/api/version", get(version_handler))
        .route("/api/admin/version", put(bump_version_handler))
        .route(
            "/api/favorites",
            get(favorites_handler)
                .post(add_favorite_handler)
                .delete(remove_favorite_handler),
        )
        .with_state(api)
}

/// Serve the API over HTTP at the given address (e.g. `"0.0.0.0:3000"`).
pub async fn serve(api: Arc<RecordApi>, addr: &str) -> Result<(), std::io::Error> {
    let app = router(api);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "catalog API listening");
    axum::serve(listener, app).await
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// JSON response that intermediaries must not cache; lists change under
/// clients that poll for their own writes.
fn uncached<T: Serialize>(value: T) -> Response {
    (
        [(
            header::CACHE_CONTROL,
            "no-store, no-cache, must-revalidate, proxy-revalidate",
        )],
        Json(value),
    )
        .into_response()
}

fn success() -> Response {
    Json(json!({ "success": true })).into_response()
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    Ok(serde_json::from_slice(body)?)
}

#[derive(Deserialize)]
struct FavoriteBody {
    id: String,
}

/// `GET /health`
async fn health_handler(State(api): ApiState) -> impl IntoResponse {
    Json(json!({ "ok": true, "backend": api.store().backend() }))
}

/// `GET /api/data`
async fn list_handler(State(api): ApiState) -> Result<Response, ApiError> {
    Ok(uncached(api.list().await?))
}

/// `GET /api/data/:id`
async fn get_handler(
    State(api): ApiState,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    Ok(uncached(api.get(&id).await?))
}

/// `POST /api/data`
async fn create_handler(State(api): ApiState, body: Bytes) -> Result<Response, ApiError> {
    let payload: Value = parse_body(&body)?;
    Ok(Json(api.create(payload).await?).into_response())
}

/// `PUT /api/data`: whole-array replace.
async fn replace_handler(State(api): ApiState, body: Bytes) -> Result<Response, ApiError> {
    let records: Vec<Record> = parse_body(&body)?;
    api.replace_all(records).await?;
    Ok(success())
}

/// `PUT /api/data/:id`: per-id merge.
async fn update_handler(
    State(api): ApiState,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let patch: Value = parse_body(&body)?;
    Ok(Json(api.update(&id, patch).await?).into_response())
}

/// `PUT /api/admin/data/:id`: merge or append.
async fn upsert_handler(
    State(api): ApiState,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let payload: Value = parse_body(&body)?;
    api.upsert(&id, payload).await?;
    Ok(success())
}

/// `DELETE /api/data/:id`
async fn delete_handler(
    State(api): ApiState,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    api.delete(&id).await?;
    Ok(success())
}

/// `GET /api/version`
async fn version_handler(State(api): ApiState) -> Result<Response, ApiError> {
    Ok(uncached(version::current(api.store().as_ref()).await?))
}

/// `PUT /api/admin/version`
async fn bump_version_handler(State(api): ApiState) -> Result<Response, ApiError> {
    Ok(Json(version::bump(api.store().as_ref()).await?).into_response())
}

/// `GET /api/favorites`
async fn favorites_handler(State(api): ApiState) -> Result<Response, ApiError> {
    Ok(uncached(favorites::list(api.store().as_ref()).await?))
}

/// `POST /api/favorites` with `{ "id": ... }`
async fn add_favorite_handler(State(api): ApiState, body: Bytes) -> Result<Response, ApiError> {
    let FavoriteBody { id } = parse_body(&body)?;
    favorites::add(api.store().as_ref(), &id).await?;
    Ok(success())
}

/// `DELETE /api/favorites` with `{ "id": ... }`
async fn remove_favorite_handler(
    State(api): ApiState,
    body: Bytes,
) -> Result<Response, ApiError> {
    let FavoriteBody { id } = parse_body(&body)?;
    favorites::remove(api.store().as_ref(), &id).await?;
    Ok(success())
}
