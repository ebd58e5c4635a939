//! # Ranking Engine
//!
//! Scores every node in a [`NodeStore`] against a query.
//!
//! One ranking operation is:
//! 1. Validation: all collections loaded, weight tables consistent with the schema
//! 2. Reset: every score set to zero
//! 3. Direct pass: each node's weighted fields matched against the query
//! 4. Transitive pass: each donor's matching fields boost the acceptors that
//!    reference it by foreign key
//!
//! Matching is case-insensitive substring containment. A field whose value
//! equals the query contributes `EXACT_MATCH_MULTIPLIER` times its weight.
//! Absent values behave as the empty string.
//!
//! Validation happens before any score is touched, so a failing operation
//! leaves scores from the previous operation untouched.

use crate::primitives::EXACT_MATCH_MULTIPLIER;
use crate::weights::{FieldWeights, TransitiveRule, WeightTable};
use crate::{Node, NodeKind, NodeStore, Relation, SearchError};
use std::collections::BTreeMap;

// =============================================================================
// FIELD MATCHING
// =============================================================================

/// How a field value matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The value contains the query as a proper substring.
    Partial,
    /// The value equals the query.
    Exact,
}

impl MatchKind {
    /// Compare a field value against an already-lowercased query.
    ///
    /// The value is lowercased here on every comparison; `None` is treated
    /// as the empty string.
    #[must_use]
    pub fn of(value: Option<&str>, query: &str) -> Option<Self> {
        let value = value.unwrap_or_default().to_lowercase();
        if value == query {
            Some(MatchKind::Exact)
        } else if value.contains(query) {
            Some(MatchKind::Partial)
        } else {
            None
        }
    }

    /// The score contribution of a match on a field with `weight`.
    #[must_use]
    pub fn contribution(self, weight: u32) -> u64 {
        let weight = u64::from(weight);
        match self {
            MatchKind::Partial => weight,
            MatchKind::Exact => weight.saturating_mul(EXACT_MATCH_MULTIPLIER),
        }
    }
}

/// Sum of contributions of every weighted field of `node` matching `query`.
///
/// Returns the total and the number of matching fields. A match on a
/// zero-weight field adds nothing and is not counted.
fn node_contribution(
    node: &Node,
    weights: &FieldWeights,
    query: &str,
) -> Result<(u64, usize), SearchError> {
    let mut total: u64 = 0;
    let mut matches = 0;
    for (&field, &weight) in weights {
        let Some(kind) = MatchKind::of(node.field(field)?, query) else {
            continue;
        };
        let contribution = kind.contribution(weight);
        if contribution > 0 {
            total = total.saturating_add(contribution);
            matches += 1;
        }
    }
    Ok((total, matches))
}

// =============================================================================
// RANK SUMMARY
// =============================================================================

/// Counters describing one ranking operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankSummary {
    /// Field matches found by the direct pass.
    pub direct_matches: usize,
    /// Score additions made by the transitive pass (one per donor field per acceptor).
    pub transitive_boosts: usize,
    /// Nodes with a non-zero score afterwards.
    pub scored_nodes: usize,
}

// =============================================================================
// RANKING ENGINE
// =============================================================================

/// The ranking engine. Holds the weight configuration; the store is passed in.
#[derive(Debug, Clone, Default)]
pub struct RankingEngine {
    weights: WeightTable,
}

impl RankingEngine {
    /// Create an engine, validating the weight tables against the schema.
    pub fn new(weights: WeightTable) -> Result<Self, SearchError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    /// The weight configuration in use.
    #[must_use]
    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// Rank every node in `store` against `query`.
    ///
    /// The query is lowercased before matching. On error no score is changed.
    pub fn rank(&self, store: &mut NodeStore, query: &str) -> Result<RankSummary, SearchError> {
        store.ensure_loaded()?;
        self.weights.validate()?;

        let query = query.to_lowercase();
        let mut summary = RankSummary::default();

        store.reset_scores();

        for kind in NodeKind::ALL {
            summary.direct_matches += self.direct_pass(store, kind, &query)?;
        }

        for (relation, rule) in self.weights.transitive_rules() {
            summary.transitive_boosts += Self::transitive_pass(store, relation, rule, &query)?;
        }

        summary.scored_nodes = store
            .iter_selection_order()?
            .filter(|node| node.score > 0)
            .count();

        Ok(summary)
    }

    /// Add direct contributions to every node of `kind`. Returns the match count.
    fn direct_pass(
        &self,
        store: &mut NodeStore,
        kind: NodeKind,
        query: &str,
    ) -> Result<usize, SearchError> {
        let weights = self.weights.weights_for(kind);
        let mut matches = 0;
        for node in store.require_mut(kind)? {
            let (contribution, found) = node_contribution(node, weights, query)?;
            node.add_score(contribution);
            matches += found;
        }
        Ok(matches)
    }

    /// Propagate donor matches along `relation`. Returns the boost count.
    ///
    /// Each donor field is scored exactly like the direct pass, using the
    /// rule's own weights. Every matching field with a non-zero contribution
    /// is added to every acceptor whose foreign key equals the donor's id.
    fn transitive_pass(
        store: &mut NodeStore,
        relation: Relation,
        rule: &TransitiveRule,
        query: &str,
    ) -> Result<usize, SearchError> {
        // donor id → individual field contributions
        let mut donations: BTreeMap<String, Vec<u64>> = BTreeMap::new();
        for donor in store.require(relation.donor())? {
            for (&field, &weight) in &rule.weights {
                let Some(kind) = MatchKind::of(donor.field(field)?, query) else {
                    continue;
                };
                let contribution = kind.contribution(weight);
                if contribution == 0 {
                    continue;
                }
                donations
                    .entry(donor.id.as_str().to_string())
                    .or_default()
                    .push(contribution);
            }
        }

        if donations.is_empty() {
            return Ok(0);
        }

        let mut boosts = 0;
        for acceptor in store.require_mut(relation.acceptor())? {
            let Some(key) = acceptor.field(rule.foreign_key)? else {
                continue;
            };
            if let Some(contributions) = donations.get(key) {
                for contribution in contributions {
                    acceptor.add_score(*contribution);
                    boosts += 1;
                }
            }
        }
        Ok(boosts)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Field;

    fn node(kind: NodeKind, id: &str, fields: &[(Field, &str)]) -> Node {
        fields
            .iter()
            .try_fold(Node::new(kind, id), |n, (field, value)| n.with(*field, *value))
            .expect("valid test fields")
    }

    fn store(buildings: Vec<Node>, locks: Vec<Node>, groups: Vec<Node>, media: Vec<Node>) -> NodeStore {
        NodeStore::new()
            .with_collection(NodeKind::Building, buildings)
            .and_then(|s| s.with_collection(NodeKind::Lock, locks))
            .and_then(|s| s.with_collection(NodeKind::Group, groups))
            .and_then(|s| s.with_collection(NodeKind::Medium, media))
            .expect("valid store")
    }

    fn score(store: &NodeStore, kind: NodeKind, id: &str) -> u64 {
        store.get(kind, id).expect("node present").score
    }

    #[test]
    fn match_kind_classification() {
        assert_eq!(MatchKind::of(Some("Logist"), "logist"), Some(MatchKind::Exact));
        assert_eq!(MatchKind::of(Some("Logistics"), "logist"), Some(MatchKind::Partial));
        assert_eq!(MatchKind::of(Some("Central"), "logist"), None);
        assert_eq!(MatchKind::of(None, "logist"), None);
    }

    #[test]
    fn empty_query_matches_absent_value_exactly() {
        assert_eq!(MatchKind::of(None, ""), Some(MatchKind::Exact));
    }

    #[test]
    fn contribution_applies_multiplier_once() {
        assert_eq!(MatchKind::Partial.contribution(7), 7);
        assert_eq!(MatchKind::Exact.contribution(7), 70);
        assert_eq!(MatchKind::Exact.contribution(0), 0);
    }

    #[test]
    fn direct_partial_and_exact_matches() {
        let mut store = store(
            vec![],
            vec![
                node(NodeKind::Lock, "l1", &[(Field::Name, "Logist Door")]),
                node(NodeKind::Lock, "l2", &[(Field::Name, "LOGIST")]),
            ],
            vec![],
            vec![],
        );
        let engine = RankingEngine::default();

        let summary = engine.rank(&mut store, "logist").expect("rank");

        assert_eq!(score(&store, NodeKind::Lock, "l1"), 10);
        assert_eq!(score(&store, NodeKind::Lock, "l2"), 100);
        assert_eq!(summary.direct_matches, 2);
        assert_eq!(summary.scored_nodes, 2);
    }

    #[test]
    fn multiple_fields_accumulate() {
        let mut store = store(
            vec![],
            vec![],
            vec![],
            vec![node(
                NodeKind::Medium,
                "m1",
                &[
                    (Field::Owner, "Anna Key"),
                    (Field::Description, "key card for anna"),
                    (Field::Type, "Transponder"),
                ],
            )],
        );

        RankingEngine::default().rank(&mut store, "anna").expect("rank");

        // owner 10 + description 6
        assert_eq!(score(&store, NodeKind::Medium, "m1"), 16);
    }

    #[test]
    fn query_is_lowercased() {
        let mut store = store(
            vec![node(NodeKind::Building, "b1", &[(Field::ShortCut, "HQ")])],
            vec![],
            vec![],
            vec![],
        );

        RankingEngine::default().rank(&mut store, "HQ").expect("rank");

        assert_eq!(score(&store, NodeKind::Building, "b1"), 70);
    }

    #[test]
    fn transitive_boost_reaches_every_child() {
        let mut store = store(
            vec![node(NodeKind::Building, "b1", &[(Field::Name, "Logist")])],
            vec![
                node(NodeKind::Lock, "l1", &[(Field::BuildingId, "b1")]),
                node(NodeKind::Lock, "l2", &[(Field::BuildingId, "b1")]),
                node(NodeKind::Lock, "l3", &[(Field::BuildingId, "b2")]),
                node(NodeKind::Lock, "l4", &[]),
            ],
            vec![],
            vec![],
        );

        let summary = RankingEngine::default().rank(&mut store, "logist").expect("rank");

        // exact match on the donor name: 8 × 10
        assert_eq!(score(&store, NodeKind::Lock, "l1"), 80);
        assert_eq!(score(&store, NodeKind::Lock, "l2"), 80);
        assert_eq!(score(&store, NodeKind::Lock, "l3"), 0);
        assert_eq!(score(&store, NodeKind::Lock, "l4"), 0);
        // the building itself: name 9 × 10
        assert_eq!(score(&store, NodeKind::Building, "b1"), 90);
        assert_eq!(summary.transitive_boosts, 2);
    }

    #[test]
    fn donor_matching_several_fields_donates_each() {
        let mut store = store(
            vec![node(
                NodeKind::Building,
                "b1",
                &[(Field::Name, "North Wing"), (Field::ShortCut, "north")],
            )],
            vec![node(NodeKind::Lock, "l1", &[(Field::BuildingId, "b1")])],
            vec![],
            vec![],
        );

        let summary = RankingEngine::default().rank(&mut store, "north").expect("rank");

        // name partial 8 + shortCut exact 5 × 10
        assert_eq!(score(&store, NodeKind::Lock, "l1"), 58);
        assert_eq!(summary.transitive_boosts, 2);
    }

    #[test]
    fn transitive_field_need_not_be_direct() {
        let weights = WeightTable::empty().with_transitive(
            Relation::GroupMedium,
            TransitiveRule::new(Relation::GroupMedium, [(Field::Name, 4)].into_iter().collect()),
        );
        let engine = RankingEngine::new(weights).expect("valid weights");
        let mut store = store(
            vec![],
            vec![],
            vec![node(NodeKind::Group, "g1", &[(Field::Name, "Cleaning staff")])],
            vec![node(NodeKind::Medium, "m1", &[(Field::GroupId, "g1")])],
        );

        engine.rank(&mut store, "clean").expect("rank");

        assert_eq!(score(&store, NodeKind::Group, "g1"), 0);
        assert_eq!(score(&store, NodeKind::Medium, "m1"), 4);
    }

    #[test]
    fn zero_weight_matches_are_not_counted() {
        let mut store = store(
            vec![node(NodeKind::Building, "1", &[(Field::Name, "Central Tower")])],
            vec![node(NodeKind::Lock, "10", &[(Field::BuildingId, "1")])],
            vec![],
            vec![],
        );

        let summary = RankingEngine::default().rank(&mut store, "1").expect("rank");

        assert_eq!(
            summary,
            RankSummary {
                direct_matches: 0,
                transitive_boosts: 0,
                scored_nodes: 0,
            }
        );
    }

    #[test]
    fn foreign_key_comparison_is_case_sensitive() {
        let mut store = store(
            vec![node(NodeKind::Building, "ab-12", &[(Field::Name, "Depot")])],
            vec![
                node(NodeKind::Lock, "l1", &[(Field::BuildingId, "ab-12")]),
                node(NodeKind::Lock, "l2", &[(Field::BuildingId, "AB-12")]),
            ],
            vec![],
            vec![],
        );

        RankingEngine::default().rank(&mut store, "depot").expect("rank");

        assert_eq!(score(&store, NodeKind::Lock, "l1"), 80);
        assert_eq!(score(&store, NodeKind::Lock, "l2"), 0);
    }

    #[test]
    fn rank_resets_previous_scores() {
        let mut store = store(
            vec![node(NodeKind::Building, "b1", &[(Field::Name, "Tower")])],
            vec![],
            vec![],
            vec![],
        );
        let engine = RankingEngine::default();

        engine.rank(&mut store, "tower").expect("first");
        assert_eq!(score(&store, NodeKind::Building, "b1"), 90);

        engine.rank(&mut store, "garage").expect("second");
        assert_eq!(score(&store, NodeKind::Building, "b1"), 0);
    }

    #[test]
    fn missing_collection_fails_without_touching_scores() {
        let mut store = NodeStore::new()
            .with_collection(
                NodeKind::Building,
                vec![node(NodeKind::Building, "b1", &[(Field::Name, "Tower")])],
            )
            .expect("valid");
        for b in store.require_mut(NodeKind::Building).expect("loaded") {
            b.add_score(5);
        }

        let result = RankingEngine::default().rank(&mut store, "tower");

        assert!(matches!(
            result,
            Err(SearchError::DataNotLoaded(NodeKind::Lock))
        ));
        assert_eq!(score(&store, NodeKind::Building, "b1"), 5);
    }

    #[test]
    fn new_rejects_inconsistent_weights() {
        let weights = WeightTable::empty()
            .with_direct(NodeKind::Building, [(Field::Floor, 1)].into_iter().collect());
        assert!(matches!(
            RankingEngine::new(weights),
            Err(SearchError::SchemaMismatch { .. })
        ));
    }
}
