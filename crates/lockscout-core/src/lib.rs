//! # lockscout-core
//!
//! The deterministic ranking engine for Lockscout - THE ENGINE.
//!
//! Lockscout answers free-text queries against a fixed-schema dataset of
//! buildings, locks, groups and media. Every node's weighted fields are
//! matched against the query, parents pass weight down to their children
//! along foreign keys, and the best K nodes come back in a stable order.
//!
//! ## Pipeline
//!
//! ```text
//! query ──► RankingEngine::rank ──► NodeStore (scores) ──► top_k ──► hits
//!              ▲
//!          WeightTable
//! ```
//!
//! ## Architectural Constraints
//!
//! - No async, no network, no logging dependency (pure Rust)
//! - Integer scores only, saturating arithmetic
//! - Closed schema: kinds, fields and relations are enums

// =============================================================================
// MODULES
// =============================================================================

pub mod digest;
pub mod primitives;
pub mod ranking;
pub mod selector;
pub mod session;
pub mod store;
pub mod system;
pub mod types;
pub mod weights;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Field, Node, NodeId, NodeKind, Relation, SearchError, UnknownField};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use ranking::{MatchKind, RankSummary, RankingEngine};
pub use selector::{top_k, top_k_owned};
pub use session::{SearchOutcome, SearchSession, validate_query};
pub use store::{NodeRecord, NodeStore, Snapshot};
pub use weights::{FieldWeights, TransitiveRule, WeightTable};

// =============================================================================
// RE-EXPORTS: Digest and metrics
// =============================================================================

#[cfg(feature = "crypto-hash")]
pub use digest::snapshot_crypto_hash;
pub use digest::{canonical_bytes, snapshot_checksum};
pub use system::{CollectionMetrics, OrphanMetrics, StoreMetrics};
