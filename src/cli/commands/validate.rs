//! Validate config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates after parsing, so a returned config is valid
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                println!();
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!(
            "  PostgreSQL: {}",
            config
                .postgres
                .connection_string
                .split('@')
                .next_back()
                .unwrap_or("***")
        );
        println!("  Elasticsearch: {}", config.elasticsearch.base_url);
        println!("  Watermark Store: {}", config.state.path);
        println!(
            "  Indexes: {:?}",
            config
                .sync
                .indexes
                .iter()
                .map(|i| i.as_str())
                .collect::<Vec<_>>()
        );
        println!("  Window Step: {}s", config.sync.step_seconds);
        println!("  Fetch Size: {}", config.sync.fetch_size);
        println!("  Id Chunk Size: {}", config.sync.id_chunk_size);
        println!("  Repeat Interval: {}s", config.sync.repeat_seconds);
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_config_is_a_config_error() {
        let args = ValidateArgs {};
        let code = args.execute("/nonexistent/cinesync.toml").await.unwrap();
        assert_eq!(code, 2);
    }
}
