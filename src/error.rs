use thiserror::Error;

/// Failure of a document backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The medium could not be read (missing bucket, permissions, network).
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// The document could not be written.
    #[error("store write failed: {0}")]
    WriteFailed(String),
    /// The stored document is not the JSON shape we expect.
    #[error("document {key} is malformed: {message}")]
    Malformed { key: String, message: String },
    /// A lock guarding process-local state was poisoned.
    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),
}
