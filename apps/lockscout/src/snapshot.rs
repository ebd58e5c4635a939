//! # Snapshot Loading
//!
//! Reads the JSON data file once at startup and turns it into a
//! [`NodeStore`].
//!
//! The file is an object with optional `buildings`, `locks`, `groups` and
//! `media` arrays. A missing array leaves that collection absent, so the
//! first search reports the data as not loaded.

use lockscout_core::{NodeStore, SearchError, Snapshot, primitives::MAX_SNAPSHOT_SIZE};
use std::path::{Path, PathBuf};

// =============================================================================
// PATH VALIDATION
// =============================================================================

/// Canonicalize `path` and ensure it names a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, SearchError> {
    let canonical = path.canonicalize().map_err(|e| {
        SearchError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(SearchError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Reject files larger than `max_size` before reading them.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), SearchError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| SearchError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(SearchError::InvalidSnapshot(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

// =============================================================================
// LOADING
// =============================================================================

/// Parse snapshot JSON into a node store.
pub fn parse_snapshot(data: &[u8]) -> Result<NodeStore, SearchError> {
    let snapshot: Snapshot = serde_json::from_slice(data)
        .map_err(|e| SearchError::DeserializationError(format!("Snapshot JSON: {}", e)))?;
    NodeStore::from_snapshot(snapshot)
}

/// Load the snapshot file at `path`.
pub fn load_snapshot(path: &Path) -> Result<NodeStore, SearchError> {
    let canonical = validate_file_path(path)?;
    validate_file_size(&canonical, MAX_SNAPSHOT_SIZE)?;

    let data = std::fs::read(&canonical)
        .map_err(|e| SearchError::IoError(format!("Read snapshot: {}", e)))?;
    let store = parse_snapshot(&data)?;

    tracing::info!(
        path = %canonical.display(),
        nodes = store.node_count(),
        loaded = store.is_loaded(),
        "Snapshot loaded"
    );
    Ok(store)
}

// =============================================================================
// TESTS
// =============================================================================
