//! api: request handlers over the record store.
//!
//! [`RecordApi`] turns list/get/create/update/replace/delete requests into
//! whole-document operations on an injected [`DocumentStore`]. Two update
//! shapes are offered side by side:
//!
//! - **per-id merge** ([`RecordApi::update`]): locate by id, shallow-merge,
//!   keep `id` and `subItems`; unknown id is `NotFound`.
//! - **whole-array replace** ([`RecordApi::replace_all`]): the client sends
//!   the full post-mutation array and the server persists it as-is.
//!   [`RecordApi::upsert`] is the per-record companion of this shape and
//!   appends unknown ids instead of failing.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use minifig_catalog::api::RecordApi;
//! use minifig_catalog::store::MemoryStore;
//! use serde_json::json;
//!
//! let api = RecordApi::new(Arc::new(MemoryStore::new()));
//! let created = api.create(json!({ "name": "Sherman", "manufacturer": "Airfix" })).await?;
//! api.update(&created.id, json!({ "scale": "1/72" })).await?;
//!
//! // HTTP transport (requires "http" feature)
//! // minifig_catalog::api::serve(Arc::new(api), "0.0.0.0:3000").await?;
//! ```
//!
//! [`DocumentStore`]: crate::store::DocumentStore

mod error;
mod service;

pub use error::ApiError;
pub use service::RecordApi;

// HTTP transport (requires "http" feature)
#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::{router, serve};
