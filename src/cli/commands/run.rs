//! Run command implementation
//!
//! The continuous sync loop: passes repeat until a shutdown signal arrives,
//! sleeping between passes once every index is caught up.

use crate::cli::commands::build_driver;
use crate::config::load_config;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Extract and transform, but skip index writes and watermark advances
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting sync loop");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if config.application.dry_run {
            println!("🔍 DRY RUN MODE - No data will be written to the search index");
            println!();
        }

        let driver = match build_driver(&config).await {
            Ok(d) => d,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize pipeline");
                eprintln!("Failed to initialize pipeline: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        println!("🚀 Sync loop started (Ctrl+C to stop)");
        println!();

        match driver.run(shutdown_signal).await {
            Ok(()) => {
                println!("✅ Sync loop stopped cleanly");
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Sync loop failed");
                eprintln!("Sync loop failed: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }
}
