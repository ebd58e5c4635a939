//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, NodeJson, StatusResponse, WeightsResponse};
use crate::config::AppConfig;
use crate::snapshot::load_snapshot;
use lockscout_core::{
    NodeKind, SearchError, SearchSession, StoreMetrics, snapshot_checksum, snapshot_crypto_hash,
};
use std::path::Path;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Load the configuration file, apply environment overrides and the
/// `--data` flag.
pub fn load_config(config_path: &Path, data: Option<&Path>) -> Result<AppConfig, SearchError> {
    let mut config = AppConfig::load(config_path)?.with_env_overrides();
    if let Some(data) = data {
        config.search.data = data.to_path_buf();
    }
    Ok(config)
}

/// Load the snapshot and pair it with the configured weights.
pub fn load_session(config: &AppConfig) -> Result<SearchSession, SearchError> {
    let weights = config.weight_table()?;
    let store = load_snapshot(&config.search.data)?;
    SearchSession::with_weights(store, weights)
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), SearchError> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate()?;
    let session = load_session(&config)?;

    println!("Lockscout Search Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", config.server.host);
    println!("  Port:     {}", config.server.port);
    println!("  Data:     {:?}", config.search.data);
    println!("  Top K:    {} (max {})", config.search.top_k, config.search.max_top_k);
    println!();
    println!("Endpoints:");
    println!("  GET  /search/{{query}} - Search (query in path)");
    println!("  POST /search         - Search (query in body)");
    println!("  GET  /status         - Snapshot status");
    println!("  GET  /weights        - Weight tables");
    println!("  GET  /hash           - Snapshot hash");
    println!("  GET  /health         - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = config.bind_addr();
    api::run_server(&addr, session, &config.server, config.search.clone()).await
}

// =============================================================================
// SEARCH COMMAND
// =============================================================================

/// Run one search and print the hits.
pub fn cmd_search(
    config: &AppConfig,
    json_mode: bool,
    query: &str,
    limit: Option<usize>,
) -> Result<(), SearchError> {
    let mut session = load_session(config)?;
    let k = config.search.resolve_limit(limit);
    let outcome = session.search(query, k)?;

    if json_mode {
        let results: Vec<NodeJson> = outcome.hits.iter().map(NodeJson::from).collect();
        print_json(&serde_json::json!({
            "query": outcome.query,
            "count": results.len(),
            "direct_matches": outcome.summary.direct_matches,
            "transitive_boosts": outcome.summary.transitive_boosts,
            "scored_nodes": outcome.summary.scored_nodes,
            "results": results,
        }));
        return Ok(());
    }

    println!("Search: \"{}\" (top {})", outcome.query, k);
    println!(
        "{} direct matches, {} transitive boosts, {} scored nodes",
        outcome.summary.direct_matches,
        outcome.summary.transitive_boosts,
        outcome.summary.scored_nodes
    );
    println!();

    for (rank, node) in outcome.hits.iter().enumerate() {
        let label = node
            .name
            .as_deref()
            .or(node.owner.as_deref())
            .unwrap_or("-");
        println!(
            "{:>3}. [{:<8}] {:>6}  {}  ({})",
            rank + 1,
            node.kind.name(),
            node.score,
            label,
            node.id
        );
    }

    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show snapshot status.
pub fn cmd_status(config: &AppConfig, json_mode: bool) -> Result<(), SearchError> {
    let store = load_snapshot(&config.search.data)?;
    let metrics = StoreMetrics::from_store(&store);

    if json_mode {
        let status = StatusResponse::from(&metrics);
        print_json(&serde_json::json!({
            "data": config.search.data.to_string_lossy(),
            "status": status,
        }));
        return Ok(());
    }

    println!("Lockscout Snapshot Status");
    println!("=========================");
    println!("Data: {:?}", config.search.data);
    println!();
    for collection in &metrics.collections {
        match collection.count {
            Some(count) => println!("{:<10} {}", collection.kind.collection(), count),
            None => println!("{:<10} not loaded", collection.kind.collection()),
        }
    }
    println!("{:<10} {}", "total", metrics.node_count);
    println!();
    for orphan in &metrics.orphans {
        println!(
            "{}: {} orphaned, {} unlinked",
            orphan.relation, orphan.orphans, orphan.unlinked
        );
    }

    Ok(())
}

// =============================================================================
// VALIDATE COMMAND
// =============================================================================

/// Check the configuration and the snapshot.
///
/// Fails if the weights do not fit the schema or a collection is missing;
/// orphaned foreign keys are only reported.
pub fn cmd_validate(config: &AppConfig, json_mode: bool) -> Result<(), SearchError> {
    config.validate()?;
    let store = load_snapshot(&config.search.data)?;
    let metrics = StoreMetrics::from_store(&store);

    let missing: Vec<&'static str> = NodeKind::ALL
        .iter()
        .filter(|kind| metrics.count(**kind).is_none())
        .map(|kind| kind.collection())
        .collect();

    if json_mode {
        print_json(&serde_json::json!({
            "valid": missing.is_empty(),
            "missing_collections": missing,
            "orphans": metrics.total_orphans(),
            "node_count": metrics.node_count,
        }));
    } else {
        println!("Configuration: ok");
        if missing.is_empty() {
            println!("Snapshot:      ok ({} nodes)", metrics.node_count);
        } else {
            println!("Snapshot:      missing {}", missing.join(", "));
        }
        if metrics.total_orphans() > 0 {
            println!(
                "Warning:       {} nodes reference a parent that does not exist",
                metrics.total_orphans()
            );
        }
    }

    store.ensure_loaded()
}

// =============================================================================
// WEIGHTS COMMAND
// =============================================================================

/// Show the effective weight tables.
pub fn cmd_weights(config: &AppConfig, json_mode: bool) -> Result<(), SearchError> {
    let table = config.weight_table()?;
    let response = WeightsResponse::from(&table);

    if json_mode {
        print_json(&serde_json::to_value(&response).unwrap_or_default());
        return Ok(());
    }

    println!("Direct Weights");
    println!("==============");
    for (kind, weights) in &response.direct {
        println!("{}:", kind);
        for (field, weight) in weights {
            println!("  {:<14} {}", field, weight);
        }
    }
    println!();
    println!("Transitive Weights");
    println!("==================");
    for (relation, rule) in &response.transitive {
        println!(
            "{} ({} -> {} via {}):",
            relation,
            rule.donor.name(),
            rule.acceptor.name(),
            rule.foreign_key
        );
        for (field, weight) in &rule.weights {
            println!("  {:<14} {}", field, weight);
        }
    }

    Ok(())
}

// =============================================================================
// HASH COMMAND
// =============================================================================

/// Compute checksum and BLAKE3 hash of the snapshot.
pub fn cmd_hash(config: &AppConfig, json_mode: bool) -> Result<(), SearchError> {
    let store = load_snapshot(&config.search.data)?;
    let checksum = snapshot_checksum(&store)?;
    let hash = snapshot_crypto_hash(&store)?;

    if json_mode {
        print_json(&serde_json::json!({
            "checksum": checksum,
            "hash": hash,
            "algorithm": "blake3",
        }));
        return Ok(());
    }

    println!("Checksum: {}", checksum);
    println!("BLAKE3:   {}", hash);
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
