//! Versioned coordination-store abstraction.
//!
//! Leader election in Helm runs against a hierarchical key-value store in
//! which every object carries a store-assigned version number that increases
//! on each successful write. [`CoordStore`] is the narrow seam the election
//! engine needs: conditional writes (optimistic concurrency), existence
//! semantics on create, and ordered child listings. Adapters for concrete
//! backends (ZooKeeper, etcd, ...) implement this trait; [`MemoryStore`] is
//! a complete in-process implementation used for tests and single-process
//! deployments.

use async_trait::async_trait;
use bytes::Bytes;

mod error;
mod memory;
pub mod path;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;

/// Store-assigned object version. Starts at 1 on create and increases by
/// one on every successful write.
pub type Version = i64;

/// Sentinel for "no version observed yet".
pub const UNKNOWN_VERSION: Version = -1;

/// Precondition for a conditional write.
///
/// `Any` is the unconditional upsert-style write (ZooKeeper's version -1
/// convention); `Version(v)` fails with [`StoreError::VersionConflict`]
/// unless the object is still at exactly `v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    Any,
    Version(Version),
}

/// One entry returned by [`CoordStore::list_children`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntry {
    /// Leaf name of the child (no path separators).
    pub name: String,
    pub value: Bytes,
    pub version: Version,
}

/// Narrow interface onto the external coordination store.
///
/// All operations validate the path and report caller errors as
/// [`StoreError::MalformedPath`]. Transient connection/session faults
/// surface as [`StoreError::Unavailable`]; retrying them is the caller's
/// decision, never this layer's.
#[async_trait]
pub trait CoordStore: Send + Sync {
    /// Read an object's payload and current version.
    async fn read(&self, path: &str) -> Result<(Bytes, Version)>;

    /// Create an object that must not already exist.
    ///
    /// Fails with [`StoreError::NotFound`] when the parent is missing (the
    /// caller owns ancestor creation) and [`StoreError::AlreadyExists`]
    /// when another writer won the create race.
    async fn create(&self, path: &str, value: Bytes) -> Result<Version>;

    /// Overwrite an existing object, subject to `precondition`.
    async fn write(&self, path: &str, value: Bytes, precondition: Precondition) -> Result<Version>;

    /// Remove an object and everything beneath it.
    async fn remove(&self, path: &str) -> Result<()>;

    /// List the direct children of `path`, lexically ordered by name.
    async fn list_children(&self, path: &str) -> Result<Vec<ChildEntry>>;
}
