//! In-process [`CoordStore`] implementation.
//!
//! Backs the election test suites and single-process deployments. Versioning
//! matches the external stores the trait abstracts: 1 on create, +1 per
//! successful write, never reused.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use crate::{path, ChildEntry, CoordStore, Precondition, Result, StoreError, Version};

#[derive(Debug)]
struct Node {
    value: Bytes,
    version: Version,
}

/// Hierarchical versioned key-value store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: Mutex<BTreeMap<String, Node>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CoordStore for MemoryStore {
    async fn read(&self, path: &str) -> Result<(Bytes, Version)> {
        let path = path::validate(path)?;
        let nodes = self.nodes.lock();
        nodes
            .get(&path)
            .map(|node| (node.value.clone(), node.version))
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, path: &str, value: Bytes) -> Result<Version> {
        let path = path::validate(path)?;
        let mut nodes = self.nodes.lock();
        if nodes.contains_key(&path) {
            return Err(StoreError::AlreadyExists);
        }
        if let Some(parent) = path::parent(&path) {
            if !nodes.contains_key(parent) {
                return Err(StoreError::NotFound);
            }
        }
        nodes.insert(path, Node { value, version: 1 });
        Ok(1)
    }

    async fn write(&self, path: &str, value: Bytes, precondition: Precondition) -> Result<Version> {
        let path = path::validate(path)?;
        let mut nodes = self.nodes.lock();
        let node = nodes.get_mut(&path).ok_or(StoreError::NotFound)?;
        if let Precondition::Version(expected) = precondition {
            if node.version != expected {
                return Err(StoreError::VersionConflict { expected });
            }
        }
        node.value = value;
        node.version += 1;
        Ok(node.version)
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let path = path::validate(path)?;
        let mut nodes = self.nodes.lock();
        if nodes.remove(&path).is_none() {
            return Err(StoreError::NotFound);
        }
        // Take the subtree with it.
        let prefix = format!("{path}/");
        let descendants: Vec<String> = nodes
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in descendants {
            nodes.remove(&key);
        }
        Ok(())
    }

    async fn list_children(&self, path: &str) -> Result<Vec<ChildEntry>> {
        let path = path::validate(path)?;
        let nodes = self.nodes.lock();
        if !nodes.contains_key(&path) {
            return Err(StoreError::NotFound);
        }
        let prefix = format!("{path}/");
        let children = nodes
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter(|(key, _)| !key[prefix.len()..].contains('/'))
            .map(|(key, node)| ChildEntry {
                name: key[prefix.len()..].to_string(),
                value: node.value.clone(),
                version: node.version,
            })
            .collect();
        Ok(children)
    }
}
