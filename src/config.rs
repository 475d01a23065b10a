//! Startup configuration: which backend to run and where it lives.
//!
//! Every option can come from a flag or an environment variable, so the same
//! binary runs on a workstation (file backend), on a single ephemeral
//! instance (memory backend seeded from `STORED_DATA`), or against a bucket.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::error::StoreError;
use crate::store::{DocumentStore, FileStore, MemoryStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// JSON files on local disk.
    File,
    /// Process memory, optionally seeded from a snapshot.
    Memory,
    /// An object-storage bucket.
    Object,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("object backend requires {0}")]
    MissingObjectSetting(&'static str),
    #[error("object backend is not compiled in (enable the `remote` feature)")]
    RemoteDisabled,
    #[error("invalid seed snapshot: {0}")]
    Seed(#[from] StoreError),
}

#[derive(Debug, Clone, Parser)]
#[command(name = "minifig-catalog", version, about = "Serve the miniature figure catalog API")]
pub struct Config {
    /// Storage backend.
    #[arg(long, env = "CATALOG_BACKEND", value_enum, default_value = "file")]
    pub backend: Backend,

    /// Address to listen on.
    #[arg(long, env = "CATALOG_BIND", default_value = "0.0.0.0:3000")]
    pub bind: String,

    /// Directory holding the JSON documents (file backend).
    #[arg(long, env = "CATALOG_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Root of the per-record image folders (file backend).
    #[arg(long, env = "CATALOG_ASSETS_DIR", default_value = "public/data/images")]
    pub assets_dir: PathBuf,

    /// JSON array the memory backend starts with.
    #[arg(long, env = "STORED_DATA", hide_env_values = true)]
    pub seed: Option<String>,

    /// Object-storage base URL (object backend).
    #[arg(long, env = "CATALOG_OBJECT_URL")]
    pub object_url: Option<String>,

    /// Object-storage API key (object backend).
    #[arg(long, env = "CATALOG_OBJECT_KEY", hide_env_values = true)]
    pub object_key: Option<String>,

    /// Bucket holding the documents (object backend).
    #[arg(long, env = "CATALOG_BUCKET", default_value = "data")]
    pub bucket: String,
}

impl Config {
    /// Construct the configured backend. Called once at startup; the result
    /// is shared by every request handler.
    pub fn build_store(&self) -> Result<Arc<dyn DocumentStore>, ConfigError> {
        let store: Arc<dyn DocumentStore> = match self.backend {
            Backend::File => Arc::new(
                FileStore::new(&self.data_dir).with_assets(&self.assets_dir),
            ),
            Backend::Memory => match &self.seed {
                Some(seed) => Arc::new(MemoryStore::seeded(seed)?),
                None => Arc::new(MemoryStore::new()),
            },
            Backend::Object => self.object_store()?,
        };
        tracing::info!(backend = store.backend(), "store configured");
        Ok(store)
    }

    #[cfg(feature = "remote")]
    fn object_store(&self) -> Result<Arc<dyn DocumentStore>, ConfigError> {
        let url = self
            .object_url
            .as_deref()
            .ok_or(ConfigError::MissingObjectSetting("--object-url / CATALOG_OBJECT_URL"))?;
        let key = self
            .object_key
            .as_deref()
            .ok_or(ConfigError::MissingObjectSetting("--object-key / CATALOG_OBJECT_KEY"))?;
        Ok(Arc::new(crate::store::ObjectStore::new(
            url,
            key,
            self.bucket.as_str(),
        )))
    }

    #[cfg(not(feature = "remote"))]
    fn object_store(&self) -> Result<Arc<dyn DocumentStore>, ConfigError> {
        Err(ConfigError::RemoteDisabled)
    }
}
