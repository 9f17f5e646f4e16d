// Cinesync - Movies catalog to Elasticsearch ETL
// Copyright (c) 2025 Cinesync Contributors
// Licensed under the MIT License

//! # Cinesync - incremental catalog-to-search-index synchronizer
//!
//! Cinesync keeps Elasticsearch search indexes (`movies`, `genres`,
//! `persons`) synchronized with a PostgreSQL movies catalog. It is a polling
//! batch pipeline: each cycle scans a bounded time window of the catalog for
//! changed rows, denormalizes the affected entities, upserts them into the
//! search index, and checkpoints a durable watermark so restarts neither
//! reprocess the whole catalog nor skip updates.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (extract, sync loop, state, retry, migrate)
//! - [`adapters`] - External integrations (PostgreSQL, Elasticsearch)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Sync cycle
//!
//! Per index, per cycle:
//!
//! 1. **Read watermark** from the durable store; when absent, bootstrap from
//!    the earliest `updated_at` across the catalog.
//! 2. **Compute window**: a half-open `[watermark, watermark + step)`
//!    boundary via [`core::extract::compute_boundary`].
//! 3. **Extract** the dirty-id set: ids changed in the base table, plus ids
//!    reachable from changed related rows through their join tables.
//! 4. **Transform** the ids in bounded batches into denormalized documents.
//! 5. **Load** the documents with idempotent bulk upserts.
//! 6. **Checkpoint**: only after a successful load, persist the window end
//!    as the new watermark.
//!
//! A failed cycle leaves the watermark untouched, so the same window is
//! reprocessed on the next attempt; idempotent upserts make that safe.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use cinesync::adapters::elasticsearch::{SearchClient, SearchLoader};
//! use cinesync::adapters::postgres::CatalogClient;
//! use cinesync::config::load_config;
//! use cinesync::core::extract::build_orchestrator;
//! use cinesync::core::state::FileWatermarkStore;
//! use cinesync::core::sync::{SyncDriver, SyncSettings};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("cinesync.toml")?;
//!
//! let catalog = Arc::new(CatalogClient::new(&config.postgres).await?);
//! let search = SearchClient::new(&config.elasticsearch)?;
//! let loader = SearchLoader::new(search, config.sync.indexes.clone(), config.retry.clone());
//! loader.ensure_indexes().await?;
//!
//! let orchestrator = build_orchestrator(catalog, &config.sync, &config.retry);
//! let store = FileWatermarkStore::open(&config.state.path)?;
//!
//! let driver = SyncDriver::new(
//!     orchestrator,
//!     loader,
//!     store,
//!     SyncSettings::from_config(&config.sync, config.application.dry_run),
//!     config.retry.clone(),
//! );
//! let outcome = driver.run_pass().await?;
//! println!("synced {} indexes", outcome.synced);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
