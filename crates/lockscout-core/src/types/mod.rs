//! # Core Type Definitions
//!
//! This module contains all core types for the Lockscout ranking engine:
//! - Node identifiers and kinds (`NodeId`, `NodeKind`)
//! - The closed field schema (`Field`)
//! - The ranked record itself (`Node`)
//! - Foreign-key relations between kinds (`Relation`)
//! - Error types (`SearchError`)
//!
//! ## Closed Schema
//!
//! Every field a weight table may reference is a variant of [`Field`], and
//! every [`NodeKind`] declares which of those fields it carries. Field access
//! is an explicit `match`, so an unsupported field on a kind is reported as
//! [`SearchError::SchemaMismatch`] instead of being looked up at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// NODE IDENTIFIER
// =============================================================================

/// Identifier of a node as it appears in the snapshot.
///
/// Foreign keys are compared against this representation with plain string
/// equality, so ids are case-sensitive: `AB-12` and `ab-12` are different
/// nodes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a new node identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// NODE KIND
// =============================================================================

/// The four node collections of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Building,
    Lock,
    Group,
    Medium,
}

impl NodeKind {
    /// All kinds, in declaration order.
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Building,
        NodeKind::Lock,
        NodeKind::Group,
        NodeKind::Medium,
    ];

    /// Lowercase singular name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Building => "building",
            NodeKind::Lock => "lock",
            NodeKind::Group => "group",
            NodeKind::Medium => "medium",
        }
    }

    /// Name of the snapshot collection holding this kind.
    #[must_use]
    pub fn collection(&self) -> &'static str {
        match self {
            NodeKind::Building => "buildings",
            NodeKind::Lock => "locks",
            NodeKind::Group => "groups",
            NodeKind::Medium => "media",
        }
    }

    /// Fields carried by nodes of this kind.
    #[must_use]
    pub fn fields(&self) -> &'static [Field] {
        match self {
            NodeKind::Building => &[Field::Id, Field::ShortCut, Field::Name, Field::Description],
            NodeKind::Lock => &[
                Field::Id,
                Field::BuildingId,
                Field::Type,
                Field::Name,
                Field::SerialNumber,
                Field::Floor,
                Field::RoomNumber,
                Field::Description,
            ],
            NodeKind::Group => &[Field::Id, Field::Name, Field::Description],
            NodeKind::Medium => &[
                Field::Id,
                Field::GroupId,
                Field::Type,
                Field::Owner,
                Field::SerialNumber,
                Field::Description,
            ],
        }
    }

    /// Check whether nodes of this kind carry `field`.
    #[must_use]
    pub fn carries(&self, field: Field) -> bool {
        self.fields().contains(&field)
    }

    /// Return `Ok(())` if this kind carries `field`, `SchemaMismatch` otherwise.
    pub fn require(&self, field: Field) -> Result<(), SearchError> {
        if self.carries(field) {
            Ok(())
        } else {
            Err(SearchError::SchemaMismatch { kind: *self, field })
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// FIELD
// =============================================================================

/// Every named field a node may carry.
///
/// The wire name (see [`Field::as_str`]) is the camelCase key used in the
/// snapshot and in weight configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "buildingId")]
    BuildingId,
    #[serde(rename = "groupId")]
    GroupId,
    #[serde(rename = "type")]
    Type,
    #[serde(rename = "shortCut")]
    ShortCut,
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "description")]
    Description,
    #[serde(rename = "serialNumber")]
    SerialNumber,
    #[serde(rename = "floor")]
    Floor,
    #[serde(rename = "roomNumber")]
    RoomNumber,
    #[serde(rename = "owner")]
    Owner,
}

impl Field {
    /// All fields, in declaration order.
    pub const ALL: [Field; 11] = [
        Field::Id,
        Field::BuildingId,
        Field::GroupId,
        Field::Type,
        Field::ShortCut,
        Field::Name,
        Field::Description,
        Field::SerialNumber,
        Field::Floor,
        Field::RoomNumber,
        Field::Owner,
    ];

    /// The camelCase wire name of the field.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::BuildingId => "buildingId",
            Field::GroupId => "groupId",
            Field::Type => "type",
            Field::ShortCut => "shortCut",
            Field::Name => "name",
            Field::Description => "description",
            Field::SerialNumber => "serialNumber",
            Field::Floor => "floor",
            Field::RoomNumber => "roomNumber",
            Field::Owner => "owner",
        }
    }

    /// Whether this field references another node's identifier.
    #[must_use]
    pub fn is_foreign_key(&self) -> bool {
        matches!(self, Field::BuildingId | Field::GroupId)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a field name is not part of the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown field name: {0}")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

// =============================================================================
// NODE
// =============================================================================

/// A rankable record: one building, lock, group or medium.
///
/// `score` is the only field the ranking engine mutates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub building_id: Option<String>,
    pub group_id: Option<String>,
    pub node_type: Option<String>,
    pub short_cut: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub serial_number: Option<String>,
    pub floor: Option<String>,
    pub room_number: Option<String>,
    pub owner: Option<String>,
    pub score: u64,
}

impl Node {
    /// Create a node with only an identifier; every other field is absent.
    #[must_use]
    pub fn new(kind: NodeKind, id: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(id),
            kind,
            building_id: None,
            group_id: None,
            node_type: None,
            short_cut: None,
            name: None,
            description: None,
            serial_number: None,
            floor: None,
            room_number: None,
            owner: None,
            score: 0,
        }
    }

    /// Builder-style setter used by tests and loaders.
    ///
    /// Setting a field the kind does not carry is a `SchemaMismatch`.
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Result<Self, SearchError> {
        self.kind.require(field)?;
        let value = value.into();
        match field {
            Field::Id => self.id = NodeId(value),
            Field::BuildingId => self.building_id = Some(value),
            Field::GroupId => self.group_id = Some(value),
            Field::Type => self.node_type = Some(value),
            Field::ShortCut => self.short_cut = Some(value),
            Field::Name => self.name = Some(value),
            Field::Description => self.description = Some(value),
            Field::SerialNumber => self.serial_number = Some(value),
            Field::Floor => self.floor = Some(value),
            Field::RoomNumber => self.room_number = Some(value),
            Field::Owner => self.owner = Some(value),
        }
        Ok(self)
    }

    /// Read a field value.
    ///
    /// Returns `SchemaMismatch` if this node's kind does not carry `field`,
    /// and `Ok(None)` if the field is carried but has no value.
    pub fn field(&self, field: Field) -> Result<Option<&str>, SearchError> {
        self.kind.require(field)?;
        let value = match field {
            Field::Id => Some(self.id.as_str()),
            Field::BuildingId => self.building_id.as_deref(),
            Field::GroupId => self.group_id.as_deref(),
            Field::Type => self.node_type.as_deref(),
            Field::ShortCut => self.short_cut.as_deref(),
            Field::Name => self.name.as_deref(),
            Field::Description => self.description.as_deref(),
            Field::SerialNumber => self.serial_number.as_deref(),
            Field::Floor => self.floor.as_deref(),
            Field::RoomNumber => self.room_number.as_deref(),
            Field::Owner => self.owner.as_deref(),
        };
        Ok(value)
    }

    /// Iterate the carried fields that have a value, in schema order.
    pub fn present_fields(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        self.kind
            .fields()
            .iter()
            .filter_map(|&field| match self.field(field) {
                Ok(Some(value)) => Some((field, value)),
                _ => None,
            })
    }

    /// Add to the score using saturating arithmetic.
    pub fn add_score(&mut self, amount: u64) {
        self.score = self.score.saturating_add(amount);
    }

    /// Reset the score to zero.
    pub fn reset_score(&mut self) {
        self.score = 0;
    }
}

// =============================================================================
// RELATION
// =============================================================================

/// The foreign-key relations along which weight propagates.
///
/// Both are many-to-one: many locks per building, many media per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Building (donor) → Lock (acceptor).
    BuildingLock,
    /// Group (donor) → Medium (acceptor).
    GroupMedium,
}

impl Relation {
    /// All relations, in propagation order.
    pub const ALL: [Relation; 2] = [Relation::BuildingLock, Relation::GroupMedium];

    /// The parent kind whose matching fields donate weight.
    #[must_use]
    pub fn donor(&self) -> NodeKind {
        match self {
            Relation::BuildingLock => NodeKind::Building,
            Relation::GroupMedium => NodeKind::Group,
        }
    }

    /// The child kind that receives weight.
    #[must_use]
    pub fn acceptor(&self) -> NodeKind {
        match self {
            Relation::BuildingLock => NodeKind::Lock,
            Relation::GroupMedium => NodeKind::Medium,
        }
    }

    /// The acceptor field holding the donor's identifier.
    #[must_use]
    pub fn default_foreign_key(&self) -> Field {
        match self {
            Relation::BuildingLock => Field::BuildingId,
            Relation::GroupMedium => Field::GroupId,
        }
    }

    /// Configuration key of the relation.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Relation::BuildingLock => "building_lock",
            Relation::GroupMedium => "group_medium",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.donor(), self.acceptor())
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Lockscout system.
///
/// - No silent failures
/// - Use `Result<T, SearchError>` for fallible operations
/// - Ranking errors are deterministic: retrying cannot change the outcome
#[derive(Debug, Error)]
pub enum SearchError {
    /// A node collection was never loaded.
    #[error("The initial data was not loaded: collection '{}' is absent", .0.collection())]
    DataNotLoaded(NodeKind),

    /// A weight table references a field the node kind does not carry.
    #[error("Node kind '{kind}' does not have a field '{field}'")]
    SchemaMismatch { kind: NodeKind, field: Field },

    /// A relation's foreign key is not a foreign-key field of the acceptor kind.
    #[error("Relation {relation} is misconfigured: '{foreign_key}' is not a foreign key of '{}'", .relation.acceptor())]
    RelationshipMisconfigured { relation: Relation, foreign_key: Field },

    /// The search query was rejected before ranking.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The snapshot contents are unusable.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<UnknownField> for SearchError {
    fn from(err: UnknownField) -> Self {
        SearchError::DeserializationError(err.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_wire_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(field.as_str().parse::<Field>(), Ok(field));
        }
    }

    #[test]
    fn unknown_field_name_rejected() {
        assert!("weight".parse::<Field>().is_err());
        assert!("Name".parse::<Field>().is_err());
    }

    #[test]
    fn every_kind_carries_id() {
        for kind in NodeKind::ALL {
            assert!(kind.carries(Field::Id), "{kind} must carry id");
        }
    }

    #[test]
    fn field_access_on_uncarried_field_is_schema_mismatch() {
        let building = Node::new(NodeKind::Building, "b1");
        let result = building.field(Field::Owner);
        assert!(matches!(
            result,
            Err(SearchError::SchemaMismatch {
                kind: NodeKind::Building,
                field: Field::Owner
            })
        ));
    }

    #[test]
    fn absent_value_is_none_not_error() {
        let lock = Node::new(NodeKind::Lock, "l1");
        assert_eq!(lock.field(Field::Floor).expect("carried"), None);
        assert_eq!(lock.field(Field::Id).expect("carried"), Some("l1"));
    }

    #[test]
    fn with_rejects_uncarried_field() {
        let result = Node::new(NodeKind::Group, "g1").with(Field::SerialNumber, "X");
        assert!(result.is_err());
    }

    #[test]
    fn present_fields_skips_absent_values() {
        let lock = Node::new(NodeKind::Lock, "l1")
            .with(Field::Name, "Front door")
            .and_then(|n| n.with(Field::Floor, "2"))
            .expect("valid fields");

        let fields: Vec<_> = lock.present_fields().collect();
        assert_eq!(
            fields,
            vec![
                (Field::Id, "l1"),
                (Field::Name, "Front door"),
                (Field::Floor, "2")
            ]
        );
    }

    #[test]
    fn score_saturates() {
        let mut node = Node::new(NodeKind::Medium, "m1");
        node.score = u64::MAX - 1;
        node.add_score(10);
        assert_eq!(node.score, u64::MAX);
        node.reset_score();
        assert_eq!(node.score, 0);
    }

    #[test]
    fn relation_endpoints() {
        assert_eq!(Relation::BuildingLock.donor(), NodeKind::Building);
        assert_eq!(Relation::BuildingLock.acceptor(), NodeKind::Lock);
        assert_eq!(Relation::GroupMedium.default_foreign_key(), Field::GroupId);
        for relation in Relation::ALL {
            assert!(relation.acceptor().carries(relation.default_foreign_key()));
        }
    }

    #[test]
    fn error_messages_name_the_problem() {
        let err = SearchError::DataNotLoaded(NodeKind::Medium);
        assert!(err.to_string().contains("media"));

        let err = SearchError::SchemaMismatch {
            kind: NodeKind::Group,
            field: Field::Owner,
        };
        assert_eq!(err.to_string(), "Node kind 'group' does not have a field 'owner'");
    }
}
