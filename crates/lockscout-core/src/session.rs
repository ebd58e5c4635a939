//! # Session Module
//!
//! A [`SearchSession`] owns the node store together with the ranking engine
//! and exposes search as one operation: validate, rank, select.
//!
//! `search` takes `&mut self`, so a session can only run one search at a time.
//! Callers sharing a session across threads wrap it in a single lock and hold
//! the write side for the whole search; read-only inspection (metrics,
//! digests) can share the read side.

use crate::primitives::MAX_QUERY_LENGTH;
use crate::ranking::{RankSummary, RankingEngine};
use crate::selector::top_k_owned;
use crate::{Node, NodeStore, SearchError, WeightTable};

/// The result of one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// The lowercased query that was ranked.
    pub query: String,
    /// Counters from the ranking operation.
    pub summary: RankSummary,
    /// The best nodes, highest score first.
    pub hits: Vec<Node>,
}

/// Validate a raw query at the boundary.
///
/// A query must be non-empty and at most `MAX_QUERY_LENGTH` bytes.
pub fn validate_query(query: &str) -> Result<(), SearchError> {
    if query.is_empty() {
        return Err(SearchError::InvalidQuery("query must not be empty".to_string()));
    }
    if query.len() > MAX_QUERY_LENGTH {
        return Err(SearchError::InvalidQuery(format!(
            "query length {} exceeds maximum {} bytes",
            query.len(),
            MAX_QUERY_LENGTH
        )));
    }
    Ok(())
}

/// A node store paired with the engine that ranks it.
#[derive(Debug, Clone)]
pub struct SearchSession {
    store: NodeStore,
    engine: RankingEngine,
}

impl SearchSession {
    /// Create a session over `store` using the stock weights.
    #[must_use]
    pub fn new(store: NodeStore) -> Self {
        Self {
            store,
            engine: RankingEngine::default(),
        }
    }

    /// Create a session with custom weights. The weights are validated here.
    pub fn with_weights(store: NodeStore, weights: WeightTable) -> Result<Self, SearchError> {
        Ok(Self {
            store,
            engine: RankingEngine::new(weights)?,
        })
    }

    /// The node store, with scores from the most recent search.
    #[must_use]
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// The ranking engine.
    #[must_use]
    pub fn engine(&self) -> &RankingEngine {
        &self.engine
    }

    /// Rank the store against `query` and return the `k` best nodes.
    ///
    /// The query is validated and lowercased first.
    pub fn search(&mut self, query: &str, k: usize) -> Result<SearchOutcome, SearchError> {
        validate_query(query)?;
        let query = query.to_lowercase();

        let summary = self.engine.rank(&mut self.store, &query)?;
        let hits = top_k_owned(&self.store, k)?;

        Ok(SearchOutcome {
            query,
            summary,
            hits,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Field, NodeKind};

    fn loaded_store() -> NodeStore {
        let building = Node::new(NodeKind::Building, "1")
            .with(Field::Name, "Central Tower")
            .expect("valid");
        let lock = Node::new(NodeKind::Lock, "10")
            .with(Field::BuildingId, "1")
            .and_then(|n| n.with(Field::Name, "Logist Door"))
            .expect("valid");

        NodeStore::new()
            .with_collection(NodeKind::Building, vec![building])
            .and_then(|s| s.with_collection(NodeKind::Lock, vec![lock]))
            .and_then(|s| s.with_collection(NodeKind::Group, vec![]))
            .and_then(|s| s.with_collection(NodeKind::Medium, vec![]))
            .expect("valid store")
    }

    #[test]
    fn search_returns_best_hit() {
        let mut session = SearchSession::new(loaded_store());

        let outcome = session.search("Logist", 1).expect("search");

        assert_eq!(outcome.query, "logist");
        assert_eq!(outcome.hits.len(), 1);
        assert_eq!(outcome.hits[0].id.as_str(), "10");
        assert_eq!(outcome.hits[0].score, 10);
    }

    #[test]
    fn empty_query_rejected() {
        let mut session = SearchSession::new(loaded_store());
        assert!(matches!(
            session.search("", 10),
            Err(SearchError::InvalidQuery(_))
        ));
    }

    #[test]
    fn oversized_query_rejected() {
        let mut session = SearchSession::new(loaded_store());
        let query = "x".repeat(MAX_QUERY_LENGTH + 1);
        assert!(matches!(
            session.search(&query, 10),
            Err(SearchError::InvalidQuery(_))
        ));
    }

    #[test]
    fn with_weights_validates() {
        let weights = WeightTable::empty()
            .with_direct(NodeKind::Group, [(Field::Owner, 1)].into_iter().collect());
        assert!(SearchSession::with_weights(loaded_store(), weights).is_err());
    }

    #[test]
    fn unloaded_store_fails_search() {
        let mut session = SearchSession::new(NodeStore::new());
        assert!(matches!(
            session.search("tower", 10),
            Err(SearchError::DataNotLoaded(_))
        ));
    }
}
