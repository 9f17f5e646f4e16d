//! One-time SQLite to PostgreSQL catalog migration
//!
//! The legacy catalog ships as an embedded SQLite database. [`migrate_catalog`]
//! reads its five tables and bulk-loads them into the `content` schema:
//! each target table is truncated, then rows are inserted in chunks with
//! conflicting ids ignored. This is a plain one-shot load; the incremental
//! pipeline takes over afterwards.

pub mod saver;
pub mod sqlite;

pub use saver::{CatalogSaver, MigrationSummary};
pub use sqlite::{CatalogDump, SqliteCatalog};

use crate::adapters::postgres::CatalogClient;
use crate::domain::{CinesyncError, Result};
use std::path::PathBuf;

/// Copy the whole SQLite catalog into PostgreSQL
///
/// Reads happen on a blocking thread (the SQLite driver is synchronous);
/// writes go through the pooled catalog client, `chunk_size` rows per
/// insert batch.
pub async fn migrate_catalog(
    sqlite_path: PathBuf,
    client: &CatalogClient,
    chunk_size: usize,
) -> Result<MigrationSummary> {
    let dump = tokio::task::spawn_blocking(move || -> Result<CatalogDump> {
        let catalog = SqliteCatalog::open(&sqlite_path)?;
        catalog.dump()
    })
    .await
    .map_err(|e| CinesyncError::Other(format!("SQLite read task failed: {e}")))??;

    tracing::info!(
        film_works = dump.film_works.len(),
        genres = dump.genres.len(),
        persons = dump.persons.len(),
        genre_film_works = dump.genre_film_works.len(),
        person_film_works = dump.person_film_works.len(),
        "Read legacy catalog"
    );

    let saver = CatalogSaver::new(client, chunk_size);
    saver.save_all(&dump).await
}
