//! # lockscout
//!
//! Server and CLI around `lockscout-core`.
//!
//! - [`api`]: axum HTTP API
//! - [`cli`]: clap command-line interface
//! - [`config`]: TOML configuration with environment overrides
//! - [`snapshot`]: JSON snapshot loading

pub mod api;
pub mod cli;
pub mod config;
pub mod snapshot;
