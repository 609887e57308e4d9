//! Error types for coordination-store operations.

use thiserror::Error;

use crate::Version;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Connection or session-level fault. Transient: the operation may
    /// succeed if retried.
    #[error("coordination store unavailable: {0}")]
    Unavailable(String),

    /// Optimistic-write precondition failed: the object is no longer at the
    /// version the caller expected.
    #[error("version precondition failed (expected version {expected})")]
    VersionConflict { expected: Version },

    /// The object, or a parent needed for a create, does not exist.
    #[error("object not found")]
    NotFound,

    /// Create lost a race with another writer.
    #[error("object already exists")]
    AlreadyExists,

    /// Caller error; never retried.
    #[error("malformed path: {0:?}")]
    MalformedPath(String),
}

impl StoreError {
    /// Whether retrying the same operation can plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
