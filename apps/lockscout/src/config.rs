//! # Configuration Module
//!
//! Loads `lockscout.toml` and applies environment overrides.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! rate_limit = 100          # requests per second, 0 disables
//! cors_origins = ["http://localhost:3000"]
//!
//! [search]
//! data = "lockscout.json"
//! top_k = 10
//! max_top_k = 100
//!
//! [weights.lock]            # replaces the whole lock table
//! name = 10
//! serialNumber = 8
//!
//! [weights.transitive.building_lock]
//! foreign_key = "buildingId"
//! weights = { name = 8, shortCut = 5 }
//! ```
//!
//! ## Environment Overrides
//!
//! - `LOCKSCOUT_CORS_ORIGINS`: comma-separated origins, or `*`
//! - `LOCKSCOUT_RATE_LIMIT`: requests per second
//!
//! `LOCKSCOUT_API_KEY` and `LOCKSCOUT_LOG_FORMAT` are read by the API and
//! the binary directly and never stored in the config.

use lockscout_core::{
    Field, FieldWeights, NodeKind, Relation, SearchError, TransitiveRule, WeightTable,
    primitives::{DEFAULT_TOP_K, MAX_TOP_K},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const DEFAULT_CONFIG_PATH: &str = "lockscout.toml";

/// Default snapshot file name.
pub const DEFAULT_DATA_PATH: &str = "lockscout.json";

/// Maximum size of the configuration file (1 MiB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// CONFIG STRUCTURE
// =============================================================================

/// The complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub weights: WeightsConfig,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests per second; 0 disables rate limiting.
    pub rate_limit: u32,
    /// Allowed CORS origins. `None` means localhost only.
    pub cors_origins: Option<Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            rate_limit: 100,
            cors_origins: None,
        }
    }
}

/// `[search]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Path of the JSON snapshot.
    pub data: PathBuf,
    /// Result count when a request names none.
    pub top_k: usize,
    /// Upper bound for a requested result count.
    pub max_top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            data: PathBuf::from(DEFAULT_DATA_PATH),
            top_k: DEFAULT_TOP_K,
            max_top_k: MAX_TOP_K,
        }
    }
}

impl SearchConfig {
    /// Resolve a requested result count: default when absent, capped at
    /// `max_top_k`.
    #[must_use]
    pub fn resolve_limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.top_k).min(self.max_top_k)
    }
}

/// `[weights]` section. Field names use their camelCase wire form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeightsConfig {
    pub building: Option<BTreeMap<String, u32>>,
    pub lock: Option<BTreeMap<String, u32>>,
    pub group: Option<BTreeMap<String, u32>>,
    pub medium: Option<BTreeMap<String, u32>>,
    pub transitive: TransitiveConfig,
}

/// `[weights.transitive]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransitiveConfig {
    pub building_lock: Option<TransitiveRuleConfig>,
    pub group_medium: Option<TransitiveRuleConfig>,
}

/// One transitive rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransitiveRuleConfig {
    /// Acceptor field holding the donor id. Defaults to the relation's own key.
    pub foreign_key: Option<String>,
    pub weights: BTreeMap<String, u32>,
}

// =============================================================================
// LOADING
// =============================================================================

impl AppConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, SearchError> {
        toml::from_str(content)
            .map_err(|e| SearchError::DeserializationError(format!("Invalid config: {}", e)))
    }

    /// Load the configuration file at `path`.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SearchError> {
        if !path.exists() {
            tracing::info!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let metadata = std::fs::metadata(path)
            .map_err(|e| SearchError::IoError(format!("Cannot read config metadata: {}", e)))?;
        if !metadata.is_file() {
            return Err(SearchError::IoError(format!(
                "Config path '{}' is not a regular file",
                path.display()
            )));
        }
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(SearchError::IoError(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SearchError::IoError(format!("Read config: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Apply `LOCKSCOUT_CORS_ORIGINS` and `LOCKSCOUT_RATE_LIMIT`.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var("LOCKSCOUT_CORS_ORIGINS").ok(),
            std::env::var("LOCKSCOUT_RATE_LIMIT").ok(),
        )
    }

    /// Apply override values as they would appear in the environment.
    ///
    /// An unparsable rate limit is ignored with a warning.
    #[must_use]
    pub fn with_overrides(mut self, cors_origins: Option<String>, rate_limit: Option<String>) -> Self {
        if let Some(origins) = cors_origins {
            let list: Vec<String> = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            self.server.cors_origins = Some(list);
        }

        if let Some(raw) = rate_limit {
            match raw.trim().parse::<u32>() {
                Ok(rps) => self.server.rate_limit = rps,
                Err(_) => tracing::warn!("Ignoring invalid LOCKSCOUT_RATE_LIMIT '{}'", raw),
            }
        }

        self
    }

    /// Build the effective weight table and validate it against the schema.
    pub fn weight_table(&self) -> Result<WeightTable, SearchError> {
        let mut table = WeightTable::default();

        let overrides = [
            (NodeKind::Building, &self.weights.building),
            (NodeKind::Lock, &self.weights.lock),
            (NodeKind::Group, &self.weights.group),
            (NodeKind::Medium, &self.weights.medium),
        ];
        for (kind, entries) in overrides {
            if let Some(entries) = entries {
                table = table.with_direct(kind, parse_weights(entries)?);
            }
        }

        let rules = [
            (Relation::BuildingLock, &self.weights.transitive.building_lock),
            (Relation::GroupMedium, &self.weights.transitive.group_medium),
        ];
        for (relation, rule) in rules {
            if let Some(rule) = rule {
                table = table.with_transitive(relation, parse_rule(relation, rule)?);
            }
        }

        table.validate()?;
        Ok(table)
    }

    /// Check everything that can be checked without the snapshot.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.search.max_top_k == 0 {
            return Err(SearchError::DeserializationError(
                "search.max_top_k must be at least 1".to_string(),
            ));
        }
        if self.search.top_k > self.search.max_top_k {
            return Err(SearchError::DeserializationError(format!(
                "search.top_k {} exceeds search.max_top_k {}",
                self.search.top_k, self.search.max_top_k
            )));
        }
        self.weight_table().map(|_| ())
    }

    /// `host:port` for the listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_weights(entries: &BTreeMap<String, u32>) -> Result<FieldWeights, SearchError> {
    entries
        .iter()
        .map(|(name, weight)| -> Result<(Field, u32), SearchError> {
            Ok((name.parse::<Field>()?, *weight))
        })
        .collect()
}

fn parse_rule(
    relation: Relation,
    rule: &TransitiveRuleConfig,
) -> Result<TransitiveRule, SearchError> {
    let mut parsed = TransitiveRule::new(relation, parse_weights(&rule.weights)?);
    if let Some(name) = &rule.foreign_key {
        parsed.foreign_key = name.parse::<Field>()?;
    }
    Ok(parsed)
}

// =============================================================================
// TESTS
// =============================================================================
