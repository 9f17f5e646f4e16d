//! Status command implementation
//!
//! Prints the per-index watermarks from the durable store. A stalled
//! watermark here is the externally observable sign of a failing pipeline.

use crate::config::load_config;
use crate::core::state::{parse_watermark, watermark_key, FileWatermarkStore, WatermarkStore};
use crate::domain::SearchIndex;
use chrono::Utc;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Show only this index
    #[arg(long)]
    pub index: Option<SearchIndex>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking sync status");

        println!("📊 Sync Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let store = match FileWatermarkStore::open(&config.state.path) {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to open watermark store");
                println!("   Error: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        let indexes: Vec<SearchIndex> = match self.index {
            Some(index) => vec![index],
            None => config.sync.indexes.clone(),
        };

        println!("{:<12} {:<35} {:<15}", "Index", "Watermark", "Lag");
        println!("{}", "-".repeat(62));

        for index in indexes {
            let value = match store.get(&watermark_key(index)).await {
                Ok(v) => v,
                Err(e) => {
                    println!("❌ Failed to read watermark for {index}: {e}");
                    return Ok(5);
                }
            };

            match value {
                Some(raw) => {
                    let lag = match parse_watermark(&raw) {
                        Ok(time) => {
                            let seconds = (Utc::now() - time).num_seconds().max(0);
                            format!("{seconds}s")
                        }
                        Err(_) => "corrupt".to_string(),
                    };
                    println!("{:<12} {:<35} {:<15}", index.to_string(), raw, lag);
                }
                None => {
                    println!("{:<12} {:<35} {:<15}", index.to_string(), "never synced", "-");
                }
            }
        }

        println!();
        Ok(0)
    }
}
