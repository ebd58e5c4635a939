//! # Snapshot Digest
//!
//! Fingerprints of the loaded data, for operators checking which snapshot a
//! running instance serves.
//!
//! The digest covers node kinds, identifiers and field values in collection
//! order. Scores are excluded, so ranking never changes it.
//!
//! Canonical bytes are produced with postcard. Two fingerprints are offered:
//! - `snapshot_checksum`: fast rotate-xor fold, for change detection
//! - `snapshot_crypto_hash`: BLAKE3 (feature `crypto-hash`), collision resistant

use crate::{Field, NodeKind, NodeStore, SearchError};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct CanonicalNode<'a> {
    id: &'a str,
    fields: Vec<(Field, &'a str)>,
}

#[derive(Debug, Serialize)]
struct CanonicalCollection<'a> {
    kind: NodeKind,
    nodes: Option<Vec<CanonicalNode<'a>>>,
}

/// Encode the store content into canonical bytes.
pub fn canonical_bytes(store: &NodeStore) -> Result<Vec<u8>, SearchError> {
    let collections: Vec<CanonicalCollection<'_>> = NodeKind::ALL
        .iter()
        .map(|&kind| CanonicalCollection {
            kind,
            nodes: store.collection(kind).map(|nodes| {
                nodes
                    .iter()
                    .map(|node| CanonicalNode {
                        id: node.id.as_str(),
                        fields: node
                            .present_fields()
                            .filter(|(field, _)| *field != Field::Id)
                            .collect(),
                    })
                    .collect()
            }),
        })
        .collect();

    postcard::to_allocvec(&collections)
        .map_err(|e| SearchError::SerializationError(format!("canonical encoding: {}", e)))
}

/// Fast non-cryptographic checksum of the store content.
pub fn snapshot_checksum(store: &NodeStore) -> Result<u64, SearchError> {
    let bytes = canonical_bytes(store)?;
    let mut hash: u64 = bytes.len() as u64;
    for (i, byte) in bytes.iter().enumerate() {
        hash = hash.rotate_left(5) ^ u64::from(*byte) ^ (i as u64).rotate_left(29);
    }
    Ok(hash)
}

/// BLAKE3 hash of the canonical bytes, as 64 hex characters.
///
/// # Requires
///
/// This function is only available with the `crypto-hash` feature enabled.
#[cfg(feature = "crypto-hash")]
pub fn snapshot_crypto_hash(store: &NodeStore) -> Result<String, SearchError> {
    let bytes = canonical_bytes(store)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

// =============================================================================
// TESTS
// =============================================================================
