//! CLI command implementations

pub mod init;
pub mod migrate;
pub mod run;
pub mod status;
pub mod sync;
pub mod validate;

use crate::adapters::elasticsearch::{SearchClient, SearchLoader};
use crate::adapters::postgres::CatalogClient;
use crate::config::CinesyncConfig;
use crate::core::extract::{build_orchestrator, SyncOrchestrator};
use crate::core::state::FileWatermarkStore;
use crate::core::sync::{SyncDriver, SyncSettings};
use crate::domain::Result;
use std::sync::Arc;

pub(crate) type Driver = SyncDriver<SyncOrchestrator, SearchLoader, FileWatermarkStore>;

/// Wire up the full pipeline from configuration
///
/// Connections are verified and missing search indexes created before the
/// driver is handed back, so a misconfigured environment fails here rather
/// than mid-cycle.
pub(crate) async fn build_driver(config: &CinesyncConfig) -> Result<Driver> {
    let catalog = Arc::new(CatalogClient::new(&config.postgres).await?);
    catalog.test_connection().await?;

    let search = SearchClient::new(&config.elasticsearch)?;
    search.ping().await?;

    let loader = SearchLoader::new(search, config.sync.indexes.clone(), config.retry.clone());
    loader.ensure_indexes().await?;

    let orchestrator = build_orchestrator(catalog, &config.sync, &config.retry);
    let store = FileWatermarkStore::open(&config.state.path)?;

    Ok(SyncDriver::new(
        orchestrator,
        loader,
        store,
        SyncSettings::from_config(&config.sync, config.application.dry_run),
        config.retry.clone(),
    ))
}
