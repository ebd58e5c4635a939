//! # Lockscout - Search Server
//!
//! The main binary for the Lockscout weighted search engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                apps/lockscout (THE BINARY)           │
//! │                                                      │
//! │   ┌─────────────┐   ┌─────────────┐   ┌──────────┐   │
//! │   │    CLI      │   │  HTTP API   │   │  Config  │   │
//! │   │   (clap)    │   │   (axum)    │   │  (toml)  │   │
//! │   └──────┬──────┘   └──────┬──────┘   └────┬─────┘   │
//! │          └─────────────────┼───────────────┘         │
//! │                            ▼                         │
//! │                   ┌────────────────┐                 │
//! │                   │ lockscout-core │                 │
//! │                   │  (THE ENGINE)  │                 │
//! │                   └────────────────┘                 │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! lockscout --data site.json server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! lockscout status
//! lockscout search "main door" --limit 5
//! lockscout validate
//! ```

use clap::Parser;
use lockscout::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // LOCKSCOUT_LOG_FORMAT=json switches to machine-parseable output.
    let log_format = std::env::var("LOCKSCOUT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lockscout=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  _                _                        _
 | |    ___   ___ | | __ ___   ___  ___  _  _| |_
 | |__ / _ \ / __|| |/ // __| / __|/ _ \| || |  _|
 |____|\___/ \___||_|\_\\__ \ \___|\___/ \_,_|\__|
                         |___/

  Lockscout Search Server v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
