//! FileStore: JSON documents on local disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::DocumentStore;
use crate::error::StoreError;

/// Local-disk document store.
///
/// Documents live as `<root>/<key>`. Writes go to a hidden temp file in the
/// same directory and are renamed into place, so readers never observe a
/// half-written document. Read-after-write is immediate.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    assets: Option<PathBuf>,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            assets: None,
        }
    }

    /// Attach the image-asset tree whose `<assets>/<folder>` directories are
    /// removed when a record is deleted.
    pub fn with_assets(mut self, assets: impl Into<PathBuf>) -> Self {
        self.assets = Some(assets.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn assets(&self) -> Option<&Path> {
        self.assets.as_deref()
    }

    fn document_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

fn write_failed(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::WriteFailed(format!("{}: {}", path.display(), e))
}

/// A folder name is only acted on when it names a single child directory.
fn is_plain_folder(folder: &str) -> bool {
    let folder = folder.trim();
    !folder.is_empty()
        && folder != "."
        && folder != ".."
        && !folder.contains(|c: char| c == '/' || c == '\\')
}

#[async_trait]
impl DocumentStore for FileStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.document_path(key);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Unavailable(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| write_failed(&self.root, e))?;

        let target = self.document_path(key);
        let tmp = self
            .root
            .join(format!(".{}-{:08x}.tmp", key, rand::random::<u32>()));

        fs::write(&tmp, &bytes)
            .await
            .map_err(|e| write_failed(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &target).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(write_failed(&target, e));
        }

        tracing::debug!(path = %target.display(), bytes = bytes.len(), "document written");
        Ok(())
    }

    async fn remove_assets(&self, folder: &str) {
        let Some(assets) = &self.assets else {
            return;
        };
        if folder.trim().is_empty() {
            tracing::debug!("record has no asset folder, nothing to remove");
            return;
        }
        if !is_plain_folder(folder) {
            tracing::warn!(folder, "refusing to remove asset folder with unsafe name");
            return;
        }

        let path = assets.join(folder.trim());
        match fs::remove_dir_all(&path).await {
            Ok(()) => tracing::info!(path = %path.display(), "removed asset folder"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove asset folder")
            }
        }
    }
}
