//! # Lockscout HTTP API Module
//!
//! This module implements the HTTP search server using axum.
//!
//! ## Endpoints
//!
//! - `GET /search/{query}?limit=N` - Search with the query in the path
//! - `POST /search` - Search with `{query, limit?}` in the body
//! - `GET /status` - Collection counts and orphan counts
//! - `GET /weights` - Effective weight tables
//! - `GET /hash` - Checksum and BLAKE3 hash of the snapshot
//! - `GET /health` - Health check
//!
//! ## Security Configuration
//!
//! - `[server] cors_origins` / `LOCKSCOUT_CORS_ORIGINS`: allowed origins, or
//!   `*` for all (default: localhost only)
//! - `[server] rate_limit` / `LOCKSCOUT_RATE_LIMIT`: requests per second
//!   (default: 100, 0 to disable)
//! - `LOCKSCOUT_API_KEY`: if set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::{get_api_key_from_env, keys_match};
pub use handlers::{
    error_status, hash_handler, health_handler, search_handler, search_path_handler,
    status_handler, weights_handler,
};
pub use middleware::create_rate_limiter;
pub use types::{
    CollectionStatus, HashResponse, HealthResponse, NodeJson, OrphanStatus, SearchParams,
    SearchRequest, SearchResponse, StatusResponse, TransitiveJson, WeightsResponse,
};

use crate::config::{SearchConfig, ServerConfig};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use lockscout_core::{SearchError, SearchSession};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request body limit (2 MiB).
const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    /// The search session. Searches take the write guard.
    pub session: Arc<RwLock<SearchSession>>,
    /// Result-count defaults and bounds.
    pub search: Arc<SearchConfig>,
}

impl AppState {
    /// Create state with the default result-count settings.
    #[must_use]
    pub fn new(session: SearchSession) -> Self {
        Self::with_search_config(session, SearchConfig::default())
    }

    /// Create state with explicit result-count settings.
    #[must_use]
    pub fn with_search_config(session: SearchSession, search: SearchConfig) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
            search: Arc::new(search),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer.
///
/// - `None` or an empty/invalid list: localhost only
/// - a list containing `*`: all origins
/// - otherwise: exactly the listed origins
fn build_cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let Some(origins) = origins else {
        tracing::info!("CORS: No origins configured, defaulting to localhost only");
        return build_localhost_cors();
    };

    if origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
        return CorsLayer::permissive();
    }

    let allowed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(hv) => {
                tracing::info!("CORS: Allowing origin: {}", origin);
                Some(hv)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    if allowed_origins.is_empty() {
        tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
        return build_localhost_cors();
    }

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate limiting (if enabled)
/// 5. Authentication (if `LOCKSCOUT_API_KEY` is set)
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let cors = build_cors_layer(server.cors_origins.as_deref());

    let rate_limiter = create_rate_limiter(server.rate_limit);
    match &rate_limiter {
        Some(_) => tracing::info!(
            "Rate limiting enabled: {} requests/second",
            server.rate_limit
        ),
        None => tracing::info!("Rate limiting disabled"),
    }

    let api_key = get_api_key_from_env();
    if api_key.is_some() {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible! \
             Set LOCKSCOUT_API_KEY to enable authentication."
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/weights", get(handlers::weights_handler))
        .route("/hash", get(handlers::hash_handler))
        .route("/search", post(handlers::search_handler))
        .route("/search/{query}", get(handlers::search_path_handler));

    if let Some(key) = api_key {
        let key: auth::ApiKey = Arc::from(key);
        router = router.layer(axum_middleware::from_fn_with_state(
            key,
            auth::api_key_auth_middleware,
        ));
    }

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Bind `addr` and serve until the process is stopped.
pub async fn run_server(
    addr: &str,
    session: SearchSession,
    server: &ServerConfig,
    search: SearchConfig,
) -> Result<(), SearchError> {
    let state = AppState::with_search_config(session, search);
    let router = create_router(state, server);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| SearchError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Lockscout HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| SearchError::IoError(format!("Server error: {}", e)))
}
