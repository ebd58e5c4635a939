//! # Lockscout CLI Module
//!
//! This module implements the CLI interface for Lockscout.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `search` - Run one search against the snapshot
//! - `status` - Show collection counts and orphans
//! - `validate` - Check configuration and snapshot
//! - `weights` - Show the effective weight tables
//! - `hash` - Compute checksum and BLAKE3 hash of the snapshot

mod commands;

use crate::config::DEFAULT_CONFIG_PATH;
use clap::{Parser, Subcommand};
use lockscout_core::SearchError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Lockscout - weighted search over buildings, locks, groups and media.
#[derive(Parser, Debug)]
#[command(name = "lockscout")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Path to the JSON snapshot (overrides `[search] data`)
    #[arg(short = 'D', long, global = true)]
    pub data: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides `[server] host`)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides `[server] port`)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run a single search
    Search {
        /// Free-text query
        query: String,

        /// Number of results (defaults to `[search] top_k`)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show snapshot status
    Status,

    /// Validate configuration and snapshot
    Validate,

    /// Show the effective weight tables
    Weights,

    /// Compute checksum and BLAKE3 hash of the snapshot
    Hash,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), SearchError> {
    let config = load_config(&cli.config, cli.data.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(config, host, port).await,
        Some(Commands::Search { query, limit }) => cmd_search(&config, json_mode, &query, limit),
        Some(Commands::Status) => cmd_status(&config, json_mode),
        Some(Commands::Validate) => cmd_validate(&config, json_mode),
        Some(Commands::Weights) => cmd_weights(&config, json_mode),
        Some(Commands::Hash) => cmd_hash(&config, json_mode),
        None => {
            // No subcommand - show status by default
            cmd_status(&config, json_mode)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
