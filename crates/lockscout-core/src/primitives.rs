//! # Ranking Primitives
//!
//! Hardcoded runtime constants for the Lockscout engine.
//!
//! These values are compiled into the binary. Weight tables are configurable;
//! the constants here are not.

/// Multiplier applied to a field's weight when its value equals the query.
///
/// A proper-substring match contributes the base weight; an exact match
/// contributes `EXACT_MATCH_MULTIPLIER × weight`. Never applied twice.
pub const EXACT_MATCH_MULTIPLIER: u64 = 10;

/// Number of results returned when the caller does not ask for a count.
pub const DEFAULT_TOP_K: usize = 10;

/// Upper bound on the result count a single request may ask for.
pub const MAX_TOP_K: usize = 100;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length of a search query in bytes.
///
/// Queries longer than this are rejected before ranking starts.
pub const MAX_QUERY_LENGTH: usize = 256;

/// Maximum size of a snapshot file (64 MB).
pub const MAX_SNAPSHOT_SIZE: u64 = 64 * 1024 * 1024;
