//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for cinesync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Cinesync - movies catalog to Elasticsearch synchronizer
#[derive(Parser, Debug)]
#[command(name = "cinesync")]
#[command(version, about, long_about = None)]
#[command(author = "Cinesync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "cinesync.toml", env = "CINESYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CINESYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the sync loop continuously
    Run(commands::run::RunArgs),

    /// Run a single sync pass and exit
    Sync(commands::sync::SyncArgs),

    /// Show per-index watermarks
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),

    /// Bulk-load the legacy SQLite catalog into PostgreSQL
    Migrate(commands::migrate::MigrateArgs),
}
