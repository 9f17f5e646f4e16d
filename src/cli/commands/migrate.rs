//! Migrate command implementation
//!
//! One-time bulk load of the legacy SQLite catalog into PostgreSQL. The
//! target tables are truncated first, so this asks for confirmation unless
//! `--yes` is passed.

use crate::adapters::postgres::CatalogClient;
use crate::config::load_config;
use crate::core::migrate::migrate_catalog;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Path of the legacy SQLite catalog
    #[arg(long, default_value = "db.sqlite")]
    pub sqlite_path: String,

    /// Rows per insert batch
    #[arg(long, default_value_t = 100)]
    pub chunk_size: usize,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl MigrateArgs {
    /// Execute the migrate command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(sqlite_path = %self.sqlite_path, "Starting catalog migration");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if !self.yes {
            println!("Migration Configuration:");
            println!("  Source: {}", self.sqlite_path);
            println!(
                "  Target: {}",
                config
                    .postgres
                    .connection_string
                    .split('@')
                    .next_back()
                    .unwrap_or("***")
            );
            println!("  Chunk size: {}", self.chunk_size);
            println!();
            println!("⚠️  The content.* tables will be TRUNCATED before loading.");
            print!("Proceed with migration? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Migration cancelled.");
                return Ok(0);
            }
        }

        let client = match CatalogClient::new(&config.postgres).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to PostgreSQL");
                eprintln!("Failed to connect to PostgreSQL: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        if let Err(e) = client.test_connection().await {
            tracing::error!(error = %e, "PostgreSQL connection test failed");
            eprintln!("PostgreSQL connection test failed: {e}");
            return Ok(4);
        }

        println!("🚀 Starting migration...");
        println!();

        let summary =
            match migrate_catalog(PathBuf::from(&self.sqlite_path), &client, self.chunk_size).await
            {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Migration failed");
                    eprintln!("Migration failed: {e}");
                    return Ok(5); // Fatal error exit code
                }
            };

        println!("📊 Migration Summary:");
        println!("  film_work: {}", summary.film_works);
        println!("  genre: {}", summary.genres);
        println!("  person: {}", summary.persons);
        println!("  genre_film_work: {}", summary.genre_film_works);
        println!("  person_film_work: {}", summary.person_film_works);
        println!("  Total rows: {}", summary.total());
        println!();
        println!("✅ Migration completed successfully!");

        Ok(0)
    }
}
