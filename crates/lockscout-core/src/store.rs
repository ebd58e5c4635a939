//! # Node Store
//!
//! The four typed node collections, owned by a single writer.
//!
//! A collection that was never loaded is `None`, which is different from an
//! empty collection: ranking refuses to run on a store with an absent
//! collection (`DataNotLoaded`).
//!
//! The store is populated once from a [`Snapshot`] and afterwards only node
//! scores change.

use crate::{Field, Node, NodeId, NodeKind, SearchError};
use serde::{Deserialize, Serialize};

// =============================================================================
// SNAPSHOT RECORDS
// =============================================================================

/// One node as it appears in the snapshot file.
///
/// Keys are camelCase. Unknown keys (including any stored `weight`) are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: String,
    #[serde(default)]
    pub building_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default, rename = "type")]
    pub node_type: Option<String>,
    #[serde(default)]
    pub short_cut: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default)]
    pub room_number: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

impl NodeRecord {
    /// Turn the record into a node of `kind` with a zero score.
    ///
    /// Values for fields the kind does not carry are dropped, so a lock record
    /// with a stray `owner` key never becomes searchable by owner.
    fn into_node(self, kind: NodeKind) -> Result<Node, SearchError> {
        if self.id.is_empty() {
            return Err(SearchError::InvalidSnapshot(format!(
                "a record in '{}' has an empty id",
                kind.collection()
            )));
        }

        let keep = |field: Field, value: Option<String>| value.filter(|_| kind.carries(field));

        Ok(Node {
            id: NodeId(self.id),
            kind,
            building_id: keep(Field::BuildingId, self.building_id),
            group_id: keep(Field::GroupId, self.group_id),
            node_type: keep(Field::Type, self.node_type),
            short_cut: keep(Field::ShortCut, self.short_cut),
            name: keep(Field::Name, self.name),
            description: keep(Field::Description, self.description),
            serial_number: keep(Field::SerialNumber, self.serial_number),
            floor: keep(Field::Floor, self.floor),
            room_number: keep(Field::RoomNumber, self.room_number),
            owner: keep(Field::Owner, self.owner),
            score: 0,
        })
    }
}

/// The snapshot supplied by the ingestion side, one optional list per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub buildings: Option<Vec<NodeRecord>>,
    #[serde(default)]
    pub locks: Option<Vec<NodeRecord>>,
    #[serde(default)]
    pub groups: Option<Vec<NodeRecord>>,
    #[serde(default)]
    pub media: Option<Vec<NodeRecord>>,
}

// =============================================================================
// NODE STORE
// =============================================================================

/// The in-memory node collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStore {
    buildings: Option<Vec<Node>>,
    locks: Option<Vec<Node>>,
    groups: Option<Vec<Node>>,
    media: Option<Vec<Node>>,
}

impl NodeStore {
    /// Order in which collections are concatenated for selection.
    ///
    /// Fixed so that equal scores always come back in the same order.
    pub const SELECTION_ORDER: [NodeKind; 4] = [
        NodeKind::Building,
        NodeKind::Lock,
        NodeKind::Medium,
        NodeKind::Group,
    ];

    /// Create a store with no collections loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot.
    ///
    /// Absent collections stay absent. Every record must carry a non-empty id.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, SearchError> {
        let convert = |records: Option<Vec<NodeRecord>>, kind: NodeKind| {
            records
                .map(|records| {
                    records
                        .into_iter()
                        .map(|record| record.into_node(kind))
                        .collect::<Result<Vec<_>, _>>()
                })
                .transpose()
        };

        Ok(Self {
            buildings: convert(snapshot.buildings, NodeKind::Building)?,
            locks: convert(snapshot.locks, NodeKind::Lock)?,
            groups: convert(snapshot.groups, NodeKind::Group)?,
            media: convert(snapshot.media, NodeKind::Medium)?,
        })
    }

    /// Install a collection, replacing any previous one.
    ///
    /// Every node must be of `kind`.
    pub fn set_collection(&mut self, kind: NodeKind, nodes: Vec<Node>) -> Result<(), SearchError> {
        if let Some(stray) = nodes.iter().find(|node| node.kind != kind) {
            return Err(SearchError::InvalidSnapshot(format!(
                "node '{}' of kind '{}' placed in '{}'",
                stray.id,
                stray.kind,
                kind.collection()
            )));
        }
        *self.slot_mut(kind) = Some(nodes);
        Ok(())
    }

    /// Builder form of [`NodeStore::set_collection`].
    pub fn with_collection(mut self, kind: NodeKind, nodes: Vec<Node>) -> Result<Self, SearchError> {
        self.set_collection(kind, nodes)?;
        Ok(self)
    }

    fn slot(&self, kind: NodeKind) -> &Option<Vec<Node>> {
        match kind {
            NodeKind::Building => &self.buildings,
            NodeKind::Lock => &self.locks,
            NodeKind::Group => &self.groups,
            NodeKind::Medium => &self.media,
        }
    }

    fn slot_mut(&mut self, kind: NodeKind) -> &mut Option<Vec<Node>> {
        match kind {
            NodeKind::Building => &mut self.buildings,
            NodeKind::Lock => &mut self.locks,
            NodeKind::Group => &mut self.groups,
            NodeKind::Medium => &mut self.media,
        }
    }

    /// The collection for `kind`, or `None` if it was never loaded.
    #[must_use]
    pub fn collection(&self, kind: NodeKind) -> Option<&[Node]> {
        self.slot(kind).as_deref()
    }

    /// The collection for `kind`, or `DataNotLoaded`.
    pub fn require(&self, kind: NodeKind) -> Result<&[Node], SearchError> {
        self.collection(kind).ok_or(SearchError::DataNotLoaded(kind))
    }

    /// Mutable access to the collection for `kind`, or `DataNotLoaded`.
    pub fn require_mut(&mut self, kind: NodeKind) -> Result<&mut [Node], SearchError> {
        self.slot_mut(kind)
            .as_deref_mut()
            .ok_or(SearchError::DataNotLoaded(kind))
    }

    /// Check that all four collections are present.
    pub fn ensure_loaded(&self) -> Result<(), SearchError> {
        for kind in NodeKind::ALL {
            self.require(kind)?;
        }
        Ok(())
    }

    /// Whether all four collections are present.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.ensure_loaded().is_ok()
    }

    /// Total number of nodes across loaded collections.
    #[must_use]
    pub fn node_count(&self) -> usize {
        NodeKind::ALL
            .iter()
            .filter_map(|kind| self.collection(*kind))
            .map(<[Node]>::len)
            .sum()
    }

    /// Find a node by kind and identifier.
    #[must_use]
    pub fn get(&self, kind: NodeKind, id: &str) -> Option<&Node> {
        self.collection(kind)?
            .iter()
            .find(|node| node.id.as_str() == id)
    }

    /// Set every score in every loaded collection to zero.
    pub fn reset_scores(&mut self) {
        for kind in NodeKind::ALL {
            if let Some(nodes) = self.slot_mut(kind) {
                nodes.iter_mut().for_each(Node::reset_score);
            }
        }
    }

    /// Iterate all nodes in [`NodeStore::SELECTION_ORDER`].
    ///
    /// Fails with `DataNotLoaded` if any collection is absent.
    pub fn iter_selection_order(&self) -> Result<impl Iterator<Item = &Node>, SearchError> {
        let [first, second, third, fourth] = Self::SELECTION_ORDER.map(|kind| self.require(kind));
        Ok(first?
            .iter()
            .chain(second?.iter())
            .chain(third?.iter())
            .chain(fourth?.iter()))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> NodeRecord {
        NodeRecord {
            id: id.to_string(),
            ..NodeRecord::default()
        }
    }

    fn full_snapshot() -> Snapshot {
        Snapshot {
            buildings: Some(vec![record("b1")]),
            locks: Some(vec![NodeRecord {
                building_id: Some("b1".to_string()),
                name: Some("Main entrance".to_string()),
                ..record("l1")
            }]),
            groups: Some(vec![record("g1")]),
            media: Some(vec![]),
        }
    }

    #[test]
    fn new_store_is_not_loaded() {
        let store = NodeStore::new();
        assert!(!store.is_loaded());
        assert!(matches!(
            store.ensure_loaded(),
            Err(SearchError::DataNotLoaded(NodeKind::Building))
        ));
    }

    #[test]
    fn snapshot_with_all_collections_is_loaded() {
        let store = NodeStore::from_snapshot(full_snapshot()).expect("valid snapshot");
        assert!(store.is_loaded());
        assert_eq!(store.node_count(), 3);
        let lock = store.get(NodeKind::Lock, "l1").expect("lock present");
        assert_eq!(lock.kind, NodeKind::Lock);
        assert_eq!(lock.field(Field::BuildingId).expect("carried"), Some("b1"));
    }

    #[test]
    fn empty_collection_differs_from_absent() {
        let mut snapshot = full_snapshot();
        snapshot.media = None;
        let store = NodeStore::from_snapshot(snapshot).expect("valid snapshot");
        assert!(matches!(
            store.ensure_loaded(),
            Err(SearchError::DataNotLoaded(NodeKind::Medium))
        ));
        assert!(store.require(NodeKind::Group).is_ok());
    }

    #[test]
    fn empty_id_rejected() {
        let mut snapshot = full_snapshot();
        snapshot.groups = Some(vec![record("")]);
        assert!(matches!(
            NodeStore::from_snapshot(snapshot),
            Err(SearchError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn uncarried_record_values_dropped() {
        let mut snapshot = full_snapshot();
        snapshot.buildings = Some(vec![NodeRecord {
            owner: Some("Alice".to_string()),
            name: Some("Tower".to_string()),
            ..record("b1")
        }]);
        let store = NodeStore::from_snapshot(snapshot).expect("valid snapshot");
        let building = store.get(NodeKind::Building, "b1").expect("present");
        assert_eq!(building.owner, None);
        assert_eq!(building.name.as_deref(), Some("Tower"));
    }

    #[test]
    fn set_collection_rejects_wrong_kind() {
        let mut store = NodeStore::new();
        let result = store.set_collection(NodeKind::Lock, vec![Node::new(NodeKind::Group, "g1")]);
        assert!(result.is_err());
        assert!(store.collection(NodeKind::Lock).is_none());
    }

    #[test]
    fn reset_scores_zeroes_everything() {
        let mut store = NodeStore::from_snapshot(full_snapshot()).expect("valid snapshot");
        for node in store.require_mut(NodeKind::Lock).expect("loaded") {
            node.add_score(42);
        }
        store.reset_scores();
        let total: u64 = store
            .iter_selection_order()
            .expect("loaded")
            .map(|n| n.score)
            .sum();
        assert_eq!(total, 0);
    }

    #[test]
    fn selection_order_is_buildings_locks_media_groups() {
        let store = NodeStore::new()
            .with_collection(NodeKind::Group, vec![Node::new(NodeKind::Group, "g")])
            .and_then(|s| s.with_collection(NodeKind::Medium, vec![Node::new(NodeKind::Medium, "m")]))
            .and_then(|s| s.with_collection(NodeKind::Lock, vec![Node::new(NodeKind::Lock, "l")]))
            .and_then(|s| {
                s.with_collection(NodeKind::Building, vec![Node::new(NodeKind::Building, "b")])
            })
            .expect("valid collections");

        let ids: Vec<&str> = store
            .iter_selection_order()
            .expect("loaded")
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "l", "m", "g"]);
    }
}
