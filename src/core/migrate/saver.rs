//! PostgreSQL side of the catalog migration
//!
//! Each target table is truncated first (cascading to the join tables), then
//! rows go in chunk by chunk with `ON CONFLICT (id) DO NOTHING`, so a
//! re-run after a partial failure converges instead of erroring on the rows
//! that already landed.

use crate::adapters::postgres::CatalogClient;
use crate::core::migrate::sqlite::{
    CatalogDump, FilmWorkRow, GenreFilmWorkRow, GenreRow, PersonFilmWorkRow, PersonRow,
};
use crate::domain::Result;

/// Per-table row counts of a completed migration
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MigrationSummary {
    pub film_works: u64,
    pub genres: u64,
    pub persons: u64,
    pub genre_film_works: u64,
    pub person_film_works: u64,
}

impl MigrationSummary {
    pub fn total(&self) -> u64 {
        self.film_works
            + self.genres
            + self.persons
            + self.genre_film_works
            + self.person_film_works
    }
}

/// Writes a [`CatalogDump`] into the `content` schema
pub struct CatalogSaver<'a> {
    client: &'a CatalogClient,
    chunk_size: usize,
}

impl<'a> CatalogSaver<'a> {
    pub fn new(client: &'a CatalogClient, chunk_size: usize) -> Self {
        Self { client, chunk_size }
    }

    /// Load every table; entity tables go first so the join tables never
    /// reference missing rows.
    pub async fn save_all(&self, dump: &CatalogDump) -> Result<MigrationSummary> {
        let summary = MigrationSummary {
            film_works: self.save_film_works(&dump.film_works).await?,
            genres: self.save_genres(&dump.genres).await?,
            persons: self.save_persons(&dump.persons).await?,
            genre_film_works: self.save_genre_film_works(&dump.genre_film_works).await?,
            person_film_works: self.save_person_film_works(&dump.person_film_works).await?,
        };

        tracing::info!(total = summary.total(), "Catalog migration complete");
        Ok(summary)
    }

    async fn save_film_works(&self, rows: &[FilmWorkRow]) -> Result<u64> {
        if !self.prepare_table("content.film_work", rows.len()).await? {
            return Ok(0);
        }

        let mut inserted = 0;
        for chunk in rows.chunks(self.chunk_size) {
            for row in chunk {
                inserted += self
                    .client
                    .execute(
                        "INSERT INTO content.film_work \
                         (id, title, description, creation_date, file_path, rating, type, \
                          created_at, updated_at) \
                         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
                         ON CONFLICT (id) DO NOTHING",
                        &[
                            &row.id,
                            &row.title,
                            &row.description,
                            &row.creation_date,
                            &row.file_path,
                            &row.rating,
                            &row.kind,
                            &row.created_at,
                            &row.updated_at,
                        ],
                    )
                    .await?;
            }
            tracing::debug!(table = "content.film_work", inserted, "Migrated chunk");
        }

        self.finish_table("content.film_work", inserted);
        Ok(inserted)
    }

    async fn save_genres(&self, rows: &[GenreRow]) -> Result<u64> {
        if !self.prepare_table("content.genre", rows.len()).await? {
            return Ok(0);
        }

        let mut inserted = 0;
        for chunk in rows.chunks(self.chunk_size) {
            for row in chunk {
                inserted += self
                    .client
                    .execute(
                        "INSERT INTO content.genre \
                         (id, name, description, created_at, updated_at) \
                         VALUES ($1, $2, $3, $4, $5) \
                         ON CONFLICT (id) DO NOTHING",
                        &[
                            &row.id,
                            &row.name,
                            &row.description,
                            &row.created_at,
                            &row.updated_at,
                        ],
                    )
                    .await?;
            }
            tracing::debug!(table = "content.genre", inserted, "Migrated chunk");
        }

        self.finish_table("content.genre", inserted);
        Ok(inserted)
    }

    async fn save_persons(&self, rows: &[PersonRow]) -> Result<u64> {
        if !self.prepare_table("content.person", rows.len()).await? {
            return Ok(0);
        }

        let mut inserted = 0;
        for chunk in rows.chunks(self.chunk_size) {
            for row in chunk {
                inserted += self
                    .client
                    .execute(
                        "INSERT INTO content.person (id, full_name, created_at, updated_at) \
                         VALUES ($1, $2, $3, $4) \
                         ON CONFLICT (id) DO NOTHING",
                        &[&row.id, &row.full_name, &row.created_at, &row.updated_at],
                    )
                    .await?;
            }
            tracing::debug!(table = "content.person", inserted, "Migrated chunk");
        }

        self.finish_table("content.person", inserted);
        Ok(inserted)
    }

    async fn save_genre_film_works(&self, rows: &[GenreFilmWorkRow]) -> Result<u64> {
        if !self
            .prepare_table("content.genre_film_work", rows.len())
            .await?
        {
            return Ok(0);
        }

        let mut inserted = 0;
        for chunk in rows.chunks(self.chunk_size) {
            for row in chunk {
                inserted += self
                    .client
                    .execute(
                        "INSERT INTO content.genre_film_work \
                         (id, film_work_id, genre_id, created_at) \
                         VALUES ($1, $2, $3, $4) \
                         ON CONFLICT (id) DO NOTHING",
                        &[&row.id, &row.film_work_id, &row.genre_id, &row.created_at],
                    )
                    .await?;
            }
            tracing::debug!(table = "content.genre_film_work", inserted, "Migrated chunk");
        }

        self.finish_table("content.genre_film_work", inserted);
        Ok(inserted)
    }

    async fn save_person_film_works(&self, rows: &[PersonFilmWorkRow]) -> Result<u64> {
        if !self
            .prepare_table("content.person_film_work", rows.len())
            .await?
        {
            return Ok(0);
        }

        let mut inserted = 0;
        for chunk in rows.chunks(self.chunk_size) {
            for row in chunk {
                inserted += self
                    .client
                    .execute(
                        "INSERT INTO content.person_film_work \
                         (id, film_work_id, person_id, role, created_at) \
                         VALUES ($1, $2, $3, $4, $5) \
                         ON CONFLICT (id) DO NOTHING",
                        &[
                            &row.id,
                            &row.film_work_id,
                            &row.person_id,
                            &row.role,
                            &row.created_at,
                        ],
                    )
                    .await?;
            }
            tracing::debug!(table = "content.person_film_work", inserted, "Migrated chunk");
        }

        self.finish_table("content.person_film_work", inserted);
        Ok(inserted)
    }

    /// Truncate the target table; returns false when there is nothing to
    /// load (the table is then left as it was).
    async fn prepare_table(&self, table: &str, row_count: usize) -> Result<bool> {
        if row_count == 0 {
            tracing::info!(table = table, "No rows to migrate");
            return Ok(false);
        }

        // Table names come from the static list above, never from input.
        self.client
            .execute(&format!("TRUNCATE {table} CASCADE"), &[])
            .await?;
        Ok(true)
    }

    fn finish_table(&self, table: &str, rows: u64) {
        tracing::info!(table = table, rows = rows, "Migrated table");
    }
}
