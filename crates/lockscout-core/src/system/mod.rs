//! # System Module
//!
//! Store metrics for status reporting.
//!
//! Metrics are informational only: nothing in ranking or selection reads
//! them.

mod metrics;

pub use metrics::*;
