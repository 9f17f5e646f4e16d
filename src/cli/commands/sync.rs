//! Sync command implementation
//!
//! Runs exactly one pass over the configured indexes and exits; useful for
//! cron-style scheduling and for inspecting what a cycle would do.

use crate::cli::commands::build_driver;
use crate::config::load_config;
use clap::Args;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Extract and transform, but skip index writes and watermark advances
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting single sync pass");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if self.dry_run {
            config.application.dry_run = true;
        }

        let driver = match build_driver(&config).await {
            Ok(d) => d,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize pipeline");
                eprintln!("Failed to initialize pipeline: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        let outcome = match driver.run_pass().await {
            Ok(o) => o,
            Err(e) => {
                tracing::error!(error = %e, "Sync pass failed");
                eprintln!("Sync pass failed: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        println!();
        println!("📊 Sync Summary:");
        println!("  Indexes synced: {}", outcome.synced);
        println!("  Documents loaded: {}", outcome.documents);
        println!(
            "  Caught up: {}",
            if outcome.caught_up { "yes" } else { "no" }
        );
        println!();

        Ok(0)
    }
}
