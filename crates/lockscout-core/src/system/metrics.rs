//! # Store Metrics
//!
//! Collection sizes and referential health of a [`NodeStore`].
//!
//! An orphan is an acceptor whose foreign key names no existing donor. Orphans
//! are legal (they simply never receive transitive weight) but are worth
//! surfacing when a snapshot is loaded.

use crate::{Field, NodeKind, NodeStore, Relation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Size of one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMetrics {
    pub kind: NodeKind,
    /// `None` if the collection was never loaded.
    pub count: Option<usize>,
}

/// Orphan count for one relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanMetrics {
    pub relation: Relation,
    /// Acceptors with a foreign key value that resolves to no donor.
    pub orphans: usize,
    /// Acceptors with no foreign key value at all.
    pub unlinked: usize,
}

/// Metrics for a whole store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMetrics {
    pub collections: Vec<CollectionMetrics>,
    pub node_count: usize,
    pub loaded: bool,
    pub orphans: Vec<OrphanMetrics>,
}

impl StoreMetrics {
    /// Compute metrics for `store`.
    ///
    /// Relations whose donor or acceptor collection is absent are skipped.
    #[must_use]
    pub fn from_store(store: &NodeStore) -> Self {
        let collections = NodeKind::ALL
            .iter()
            .map(|&kind| CollectionMetrics {
                kind,
                count: store.collection(kind).map(<[_]>::len),
            })
            .collect();

        let orphans = Relation::ALL
            .iter()
            .filter_map(|&relation| orphan_metrics(store, relation))
            .collect();

        Self {
            collections,
            node_count: store.node_count(),
            loaded: store.is_loaded(),
            orphans,
        }
    }

    /// Count for `kind`, `None` if not loaded.
    #[must_use]
    pub fn count(&self, kind: NodeKind) -> Option<usize> {
        self.collections
            .iter()
            .find(|c| c.kind == kind)
            .and_then(|c| c.count)
    }

    /// Total orphans across relations.
    #[must_use]
    pub fn total_orphans(&self) -> usize {
        self.orphans.iter().map(|o| o.orphans).sum()
    }
}

fn orphan_metrics(store: &NodeStore, relation: Relation) -> Option<OrphanMetrics> {
    let donors = store.collection(relation.donor())?;
    let acceptors = store.collection(relation.acceptor())?;
    let known: BTreeSet<&str> = donors.iter().map(|d| d.id.as_str()).collect();
    let fk: Field = relation.default_foreign_key();

    let mut orphans = 0;
    let mut unlinked = 0;
    for acceptor in acceptors {
        match acceptor.field(fk).ok().flatten() {
            Some(key) if known.contains(key) => {}
            Some(_) => orphans += 1,
            None => unlinked += 1,
        }
    }

    Some(OrphanMetrics {
        relation,
        orphans,
        unlinked,
    })
}

// =============================================================================
// TESTS
// =============================================================================
