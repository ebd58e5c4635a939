//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use lockscout_core::{
    Field, FieldWeights, Node, NodeKind, SearchOutcome, StoreMetrics, WeightTable,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Snapshot status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// All four collections are present.
    pub loaded: bool,
    pub node_count: usize,
    pub collections: Vec<CollectionStatus>,
    pub orphans: Vec<OrphanStatus>,
}

/// One collection in a [`StatusResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionStatus {
    pub collection: String,
    pub loaded: bool,
    pub count: usize,
}

/// Foreign-key health of one relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrphanStatus {
    pub relation: String,
    /// Children whose parent id resolves to nothing.
    pub orphans: usize,
    /// Children with no parent id at all.
    pub unlinked: usize,
}

impl From<&StoreMetrics> for StatusResponse {
    fn from(metrics: &StoreMetrics) -> Self {
        Self {
            loaded: metrics.loaded,
            node_count: metrics.node_count,
            collections: metrics
                .collections
                .iter()
                .map(|c| CollectionStatus {
                    collection: c.kind.collection().to_string(),
                    loaded: c.count.is_some(),
                    count: c.count.unwrap_or(0),
                })
                .collect(),
            orphans: metrics
                .orphans
                .iter()
                .map(|o| OrphanStatus {
                    relation: o.relation.name().to_string(),
                    orphans: o.orphans,
                    unlinked: o.unlinked,
                })
                .collect(),
        }
    }
}

// =============================================================================
// SEARCH REQUEST/RESPONSE
// =============================================================================

/// `POST /search` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// `GET /search/{query}` query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// A ranked node as returned to clients.
///
/// Only fields with a value are present; their keys use the snapshot's
/// camelCase names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeJson {
    pub id: String,
    pub kind: NodeKind,
    pub score: u64,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl From<&Node> for NodeJson {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.to_string(),
            kind: node.kind,
            score: node.score,
            fields: node
                .present_fields()
                .filter(|(field, _)| *field != Field::Id)
                .map(|(field, value)| (field.as_str().to_string(), value.to_string()))
                .collect(),
        }
    }
}

/// Search response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    pub count: usize,
    pub results: Vec<NodeJson>,
    pub error: Option<String>,
}

impl SearchResponse {
    /// Build a response from a completed search.
    pub fn success(outcome: &SearchOutcome) -> Self {
        let results: Vec<NodeJson> = outcome.hits.iter().map(NodeJson::from).collect();
        Self {
            success: true,
            query: outcome.query.clone(),
            count: results.len(),
            results,
            error: None,
        }
    }

    /// Build an error response.
    pub fn error(query: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            success: false,
            query: query.into(),
            count: 0,
            results: vec![],
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// HASH RESPONSE
// =============================================================================

/// Snapshot digest response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashResponse {
    pub success: bool,
    pub checksum: Option<u64>,
    /// BLAKE3 hex digest of the canonical snapshot bytes.
    pub hash: Option<String>,
    pub error: Option<String>,
}

impl HashResponse {
    pub fn success(checksum: u64, hash: String) -> Self {
        Self {
            success: true,
            checksum: Some(checksum),
            hash: Some(hash),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            checksum: None,
            hash: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// WEIGHTS RESPONSE
// =============================================================================

/// The effective weight tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightsResponse {
    /// Per kind (singular name), field → weight.
    pub direct: BTreeMap<String, BTreeMap<String, u32>>,
    /// Per relation name.
    pub transitive: BTreeMap<String, TransitiveJson>,
}

/// One transitive rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitiveJson {
    pub donor: NodeKind,
    pub acceptor: NodeKind,
    pub foreign_key: String,
    pub weights: BTreeMap<String, u32>,
}

impl From<&WeightTable> for WeightsResponse {
    fn from(table: &WeightTable) -> Self {
        let named = |weights: &FieldWeights| {
            weights
                .iter()
                .map(|(field, weight)| (field.as_str().to_string(), *weight))
                .collect::<BTreeMap<_, _>>()
        };

        Self {
            direct: NodeKind::ALL
                .iter()
                .map(|kind| (kind.name().to_string(), named(table.weights_for(*kind))))
                .collect(),
            transitive: table
                .transitive_rules()
                .map(|(relation, rule)| {
                    (
                        relation.name().to_string(),
                        TransitiveJson {
                            donor: relation.donor(),
                            acceptor: relation.acceptor(),
                            foreign_key: rule.foreign_key.as_str().to_string(),
                            weights: named(&rule.weights),
                        },
                    )
                })
                .collect(),
        }
    }
}
