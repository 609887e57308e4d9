//! Error types for the election engine.

use thiserror::Error;

use helm_store::StoreError;

#[derive(Debug, Error)]
pub enum ElectionError {
    /// Store-level failure surfaced to the caller. Inside the election and
    /// renewal loops transient store errors are retried, never surfaced.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// `become_leader` was called while an election is already in flight.
    #[error("an election is already in progress")]
    AlreadyRunning,
}

pub type Result<T> = std::result::Result<T, ElectionError>;
