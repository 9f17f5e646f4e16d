//! Per-entity extraction and transformation
//!
//! An [`EntityReceiver`] is bound to one entity kind: its query planner, its
//! positional row mapper, and the target index its records feed. It finds
//! the ids dirtied inside an extraction window (directly or through a
//! related table) and denormalizes them into index-ready documents.

use crate::adapters::postgres::CatalogClient;
use crate::config::RetryConfig;
use crate::core::extract::boundary::TimeBoundary;
use crate::core::extract::planner::QueryPlanner;
use crate::core::retry::with_retries;
use crate::domain::{CatalogTable, IndexDocument, Result, RowMapper, SearchIndex};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Extracts and denormalizes one entity kind for one search index
pub struct EntityReceiver {
    index: SearchIndex,
    planner: QueryPlanner,
    mapper: RowMapper,
    client: Arc<CatalogClient>,

    /// Streaming row-chunk size while collecting changed ids
    fetch_size: usize,

    /// Ids bound per transform query
    id_chunk_size: usize,

    retry: RetryConfig,
}

impl EntityReceiver {
    pub fn new(
        index: SearchIndex,
        planner: QueryPlanner,
        mapper: RowMapper,
        client: Arc<CatalogClient>,
        fetch_size: usize,
        id_chunk_size: usize,
        retry: RetryConfig,
    ) -> Self {
        Self {
            index,
            planner,
            mapper,
            client,
            fetch_size,
            id_chunk_size,
            retry,
        }
    }

    /// The search index this receiver feeds
    pub fn index(&self) -> SearchIndex {
        self.index
    }

    /// Collect the deduplicated set of base-entity ids that changed inside
    /// `boundary`, across the base table and every bound related table.
    ///
    /// Tables in `tables` that this entity kind has no binding for are
    /// skipped, so callers may pass the same superset of tables for every
    /// receiver. Rows are consumed in fixed-size chunks; only the id set is
    /// held in memory.
    pub async fn extract_changed_ids(
        &self,
        tables: &[CatalogTable],
        boundary: &TimeBoundary,
    ) -> Result<HashSet<Uuid>> {
        let mut changed = HashSet::new();
        let from = boundary.from_time;
        let till = boundary.till_time();

        for &table in tables {
            if !self.planner.binds(table) {
                tracing::debug!(
                    index = %self.index,
                    table = %table,
                    "No binding for table, skipping"
                );
                continue;
            }

            let sql = self.planner.extract_query(table)?;
            let ids = with_retries(&self.retry, "extract changed ids", || async {
                let mut collected: Vec<Uuid> = Vec::new();
                self.client
                    .query_chunked(&sql, &[&from, &till], self.fetch_size, |rows| {
                        for row in rows {
                            collected.push(row.try_get::<_, Uuid>(0)?);
                        }
                        Ok(())
                    })
                    .await?;
                Ok(collected)
            })
            .await?;

            tracing::debug!(
                index = %self.index,
                table = %table,
                count = ids.len(),
                "Collected changed ids"
            );

            changed.extend(ids);
        }

        Ok(changed)
    }

    /// Denormalize `ids` into index documents, `id_chunk_size` ids per
    /// transform query.
    ///
    /// Chunk order is preserved; row order within a chunk is whatever the
    /// store returns. Ids without a backing row simply produce no document.
    pub async fn transform_ids(&self, ids: &[Uuid]) -> Result<Vec<IndexDocument>> {
        let mut documents = Vec::with_capacity(ids.len());
        let sql = self.planner.transform_query();

        for chunk in ids.chunks(self.id_chunk_size) {
            let chunk_ids = chunk.to_vec();
            let rows = with_retries(&self.retry, "transform ids", || async {
                self.client.query(sql, &[&chunk_ids]).await
            })
            .await?;

            for row in &rows {
                documents.push((self.mapper)(row)?);
            }
        }

        Ok(documents)
    }

    /// Extract the dirty-id set for `boundary` and denormalize it
    pub async fn changed_records(
        &self,
        tables: &[CatalogTable],
        boundary: &TimeBoundary,
    ) -> Result<Vec<IndexDocument>> {
        let changed = self.extract_changed_ids(tables, boundary).await?;
        if changed.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = changed.into_iter().collect();
        let documents = self.transform_ids(&ids).await?;

        tracing::info!(
            index = %self.index,
            changed = ids.len(),
            documents = documents.len(),
            window = %boundary,
            "Transformed changed entities"
        );

        Ok(documents)
    }

    /// Minimum `updated_at` in the base table, or `None` when it is empty
    pub async fn earliest_update_time(&self) -> Result<Option<DateTime<Utc>>> {
        let sql = self.planner.earliest_update_query();
        let rows = with_retries(&self.retry, "earliest update time", || async {
            self.client.query(&sql, &[]).await
        })
        .await?;

        match rows.first() {
            Some(row) => Ok(row.try_get::<_, Option<DateTime<Utc>>>(0)?),
            None => Ok(None),
        }
    }
}
