//! Object path validation.
//!
//! Paths are `/`-separated names with non-empty segments. A leading slash
//! is accepted and normalized away so that `"/config/leader"` and
//! `"config/leader"` name the same object.

use crate::{Result, StoreError};

/// Validate `path` and return its normalized (no leading slash) form.
pub fn validate(path: &str) -> Result<String> {
    let normalized = path.strip_prefix('/').unwrap_or(path);
    if normalized.is_empty() || normalized.split('/').any(|segment| segment.is_empty()) {
        return Err(StoreError::MalformedPath(path.to_string()));
    }
    Ok(normalized.to_string())
}

/// Parent of a normalized path, or `None` for a top-level object.
pub fn parent(path: &str) -> Option<&str> {
    path.rfind('/').map(|idx| &path[..idx])
}
