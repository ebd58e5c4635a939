//! # Weight Tables
//!
//! Static configuration mapping each node kind to `field → base weight`, plus
//! one `donor field → weight` table per [`Relation`] for transitive
//! propagation.
//!
//! The tables are pure data. [`WeightTable::validate`] checks them against the
//! schema; the ranking engine calls it before every ranking operation.

use crate::{Field, NodeKind, Relation, SearchError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field → non-negative base weight.
pub type FieldWeights = BTreeMap<Field, u32>;

/// Transitive propagation rule for one relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitiveRule {
    /// The acceptor field compared against the donor's identifier.
    pub foreign_key: Field,
    /// Donor field → weight. Unrelated to the donor's direct weights.
    pub weights: FieldWeights,
}

impl TransitiveRule {
    /// Create a rule using the relation's default foreign key.
    #[must_use]
    pub fn new(relation: Relation, weights: FieldWeights) -> Self {
        Self {
            foreign_key: relation.default_foreign_key(),
            weights,
        }
    }
}

/// The complete, immutable weight configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightTable {
    direct: BTreeMap<NodeKind, FieldWeights>,
    transitive: BTreeMap<Relation, TransitiveRule>,
}

impl Default for WeightTable {
    /// The stock weights shipped with Lockscout.
    fn default() -> Self {
        let building = weights(&[
            (Field::Id, 0),
            (Field::ShortCut, 7),
            (Field::Name, 9),
            (Field::Description, 5),
        ]);
        let lock = weights(&[
            (Field::Id, 0),
            (Field::BuildingId, 0),
            (Field::Type, 3),
            (Field::Name, 10),
            (Field::SerialNumber, 8),
            (Field::Floor, 6),
            (Field::RoomNumber, 6),
            (Field::Description, 6),
        ]);
        let group = weights(&[(Field::Name, 9), (Field::Description, 5)]);
        let medium = weights(&[
            (Field::Id, 0),
            (Field::GroupId, 0),
            (Field::Type, 3),
            (Field::Owner, 10),
            (Field::SerialNumber, 8),
            (Field::Description, 6),
        ]);

        let lock_transitive = weights(&[(Field::Name, 8), (Field::ShortCut, 5)]);
        let medium_transitive = weights(&[(Field::Name, 8)]);

        Self::empty()
            .with_direct(NodeKind::Building, building)
            .with_direct(NodeKind::Lock, lock)
            .with_direct(NodeKind::Group, group)
            .with_direct(NodeKind::Medium, medium)
            .with_transitive(
                Relation::BuildingLock,
                TransitiveRule::new(Relation::BuildingLock, lock_transitive),
            )
            .with_transitive(
                Relation::GroupMedium,
                TransitiveRule::new(Relation::GroupMedium, medium_transitive),
            )
    }
}

fn weights(entries: &[(Field, u32)]) -> FieldWeights {
    entries.iter().copied().collect()
}

impl WeightTable {
    /// A table with no weights at all. Nothing ever matches.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            direct: BTreeMap::new(),
            transitive: BTreeMap::new(),
        }
    }

    /// Replace the direct table for `kind`.
    #[must_use]
    pub fn with_direct(mut self, kind: NodeKind, weights: FieldWeights) -> Self {
        self.direct.insert(kind, weights);
        self
    }

    /// Replace the transitive rule for `relation`.
    #[must_use]
    pub fn with_transitive(mut self, relation: Relation, rule: TransitiveRule) -> Self {
        self.transitive.insert(relation, rule);
        self
    }

    /// Direct weights for `kind`. A kind without a table has no weighted fields.
    #[must_use]
    pub fn weights_for(&self, kind: NodeKind) -> &FieldWeights {
        static EMPTY: FieldWeights = BTreeMap::new();
        self.direct.get(&kind).unwrap_or(&EMPTY)
    }

    /// Transitive rule for `relation`, if one is configured.
    #[must_use]
    pub fn transitive_rule(&self, relation: Relation) -> Option<&TransitiveRule> {
        self.transitive.get(&relation)
    }

    /// Transitive weights for `relation`. Empty if the relation is not configured.
    #[must_use]
    pub fn transitive_weights_for(&self, relation: Relation) -> &FieldWeights {
        static EMPTY: FieldWeights = BTreeMap::new();
        self.transitive_rule(relation)
            .map_or(&EMPTY, |rule| &rule.weights)
    }

    /// Iterate configured transitive rules in propagation order.
    pub fn transitive_rules(&self) -> impl Iterator<Item = (Relation, &TransitiveRule)> {
        self.transitive.iter().map(|(relation, rule)| (*relation, rule))
    }

    /// Check every table against the node schema.
    ///
    /// - A direct field the kind does not carry → `SchemaMismatch`
    /// - A transitive field the donor does not carry → `SchemaMismatch`
    /// - A foreign key that is not a foreign-key field of the acceptor →
    ///   `RelationshipMisconfigured`
    pub fn validate(&self) -> Result<(), SearchError> {
        for (kind, table) in &self.direct {
            for field in table.keys() {
                kind.require(*field)?;
            }
        }

        for (relation, rule) in &self.transitive {
            let fk = rule.foreign_key;
            if !fk.is_foreign_key() || !relation.acceptor().carries(fk) {
                return Err(SearchError::RelationshipMisconfigured {
                    relation: *relation,
                    foreign_key: fk,
                });
            }
            for field in rule.weights.keys() {
                relation.donor().require(*field)?;
            }
        }

        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_valid() {
        WeightTable::default().validate().expect("stock weights valid");
    }

    #[test]
    fn default_direct_weights() {
        let table = WeightTable::default();
        assert_eq!(table.weights_for(NodeKind::Lock).get(&Field::Name), Some(&10));
        assert_eq!(
            table.weights_for(NodeKind::Building).get(&Field::ShortCut),
            Some(&7)
        );
        assert_eq!(table.weights_for(NodeKind::Medium).get(&Field::Owner), Some(&10));
        assert_eq!(table.weights_for(NodeKind::Group).len(), 2);
    }

    #[test]
    fn default_transitive_weights() {
        let table = WeightTable::default();
        let lock = table.transitive_weights_for(Relation::BuildingLock);
        assert_eq!(lock.get(&Field::Name), Some(&8));
        assert_eq!(lock.get(&Field::ShortCut), Some(&5));
        let medium = table.transitive_weights_for(Relation::GroupMedium);
        assert_eq!(medium.get(&Field::Name), Some(&8));
        assert_eq!(medium.len(), 1);
    }

    #[test]
    fn transitive_rule_lookup() {
        let table = WeightTable::default();
        let rule = table
            .transitive_rule(Relation::BuildingLock)
            .expect("configured");
        assert_eq!(rule.foreign_key, Field::BuildingId);
        assert!(WeightTable::empty().transitive_rule(Relation::BuildingLock).is_none());
    }

    #[test]
    fn missing_kind_has_no_weights() {
        let table = WeightTable::empty();
        assert!(table.weights_for(NodeKind::Building).is_empty());
        assert!(table.transitive_weights_for(Relation::GroupMedium).is_empty());
    }

    #[test]
    fn direct_field_absent_from_kind_rejected() {
        let table = WeightTable::empty().with_direct(NodeKind::Group, weights(&[(Field::Owner, 4)]));
        assert!(matches!(
            table.validate(),
            Err(SearchError::SchemaMismatch {
                kind: NodeKind::Group,
                field: Field::Owner
            })
        ));
    }

    #[test]
    fn transitive_field_absent_from_donor_rejected() {
        let rule = TransitiveRule::new(Relation::GroupMedium, weights(&[(Field::Floor, 3)]));
        let table = WeightTable::empty().with_transitive(Relation::GroupMedium, rule);
        assert!(matches!(
            table.validate(),
            Err(SearchError::SchemaMismatch {
                kind: NodeKind::Group,
                field: Field::Floor
            })
        ));
    }

    #[test]
    fn foreign_key_missing_on_acceptor_rejected() {
        let rule = TransitiveRule {
            foreign_key: Field::GroupId,
            weights: weights(&[(Field::Name, 8)]),
        };
        let table = WeightTable::empty().with_transitive(Relation::BuildingLock, rule);
        assert!(matches!(
            table.validate(),
            Err(SearchError::RelationshipMisconfigured {
                relation: Relation::BuildingLock,
                foreign_key: Field::GroupId
            })
        ));
    }

    #[test]
    fn non_key_foreign_key_rejected() {
        let rule = TransitiveRule {
            foreign_key: Field::Owner,
            weights: weights(&[(Field::Name, 8)]),
        };
        let table = WeightTable::empty().with_transitive(Relation::GroupMedium, rule);
        assert!(matches!(
            table.validate(),
            Err(SearchError::RelationshipMisconfigured { .. })
        ));
    }
}
