//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Search takes the session's write lock for the whole rank + select step;
//! everything else only reads.

use super::{
    AppState,
    types::{
        HashResponse, HealthResponse, SearchParams, SearchRequest, SearchResponse, StatusResponse,
        WeightsResponse,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use lockscout_core::{SearchError, StoreMetrics, snapshot_checksum, snapshot_crypto_hash};
use std::time::Instant;

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Collection counts and foreign-key health of the loaded snapshot.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    let metrics = StoreMetrics::from_store(session.store());

    (StatusCode::OK, Json(StatusResponse::from(&metrics)))
}

// =============================================================================
// WEIGHTS HANDLER
// =============================================================================

/// The weight tables in effect.
pub async fn weights_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    let response = WeightsResponse::from(session.engine().weights());

    (StatusCode::OK, Json(response))
}

// =============================================================================
// HASH HANDLER
// =============================================================================

/// Checksum and BLAKE3 hash of the snapshot content.
pub async fn hash_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    let store = session.store();

    let digest = snapshot_checksum(store)
        .and_then(|checksum| snapshot_crypto_hash(store).map(|hash| (checksum, hash)));

    match digest {
        Ok((checksum, hash)) => (StatusCode::OK, Json(HashResponse::success(checksum, hash))),
        Err(e) => {
            tracing::error!("Hash computation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HashResponse::error(format!("Hash failed: {}", e))),
            )
        }
    }
}

// =============================================================================
// SEARCH HANDLERS
// =============================================================================

/// `GET /search/{query}?limit=N`
pub async fn search_path_handler(
    State(state): State<AppState>,
    Path(query): Path<String>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    run_search(&state, query, params.limit).await
}

/// `POST /search` with a JSON body.
pub async fn search_handler(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> impl IntoResponse {
    run_search(&state, request.query, request.limit).await
}

/// HTTP status for an engine error.
///
/// Only a rejected query is the caller's fault; everything else is a data or
/// configuration problem on the server side.
pub fn error_status(err: &SearchError) -> StatusCode {
    match err {
        SearchError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn run_search(
    state: &AppState,
    query: String,
    limit: Option<usize>,
) -> (StatusCode, Json<SearchResponse>) {
    let k = state.search.resolve_limit(limit);
    let started = Instant::now();

    let mut session = state.session.write().await;
    match session.search(&query, k) {
        Ok(outcome) => {
            tracing::debug!(
                query_len = query.len(),
                k,
                direct_matches = outcome.summary.direct_matches,
                transitive_boosts = outcome.summary.transitive_boosts,
                scored_nodes = outcome.summary.scored_nodes,
                hits = outcome.hits.len(),
                elapsed_us = started.elapsed().as_micros() as u64,
                "Search completed"
            );
            (StatusCode::OK, Json(SearchResponse::success(&outcome)))
        }
        Err(e) => {
            let status = error_status(&e);
            if status.is_server_error() {
                tracing::error!("Search failed: {}", e);
            } else {
                tracing::debug!("Search rejected: {}", e);
            }
            (status, Json(SearchResponse::error(query, e.to_string())))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
