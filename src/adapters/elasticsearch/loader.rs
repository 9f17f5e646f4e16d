//! Idempotent index loader
//!
//! [`SearchLoader`] is the [`DocumentSink`] the driver loads through. It
//! owns the configured index list: indexes are created once at startup, and
//! a load aimed at an index outside that list is a logged no-op rather than
//! an error.

use crate::adapters::elasticsearch::client::SearchClient;
use crate::adapters::elasticsearch::mappings;
use crate::config::RetryConfig;
use crate::core::retry::with_retries;
use crate::core::sync::DocumentSink;
use crate::domain::{IndexDocument, Result, SearchIndex};
use async_trait::async_trait;

/// Loads denormalized documents into the search cluster
pub struct SearchLoader {
    client: SearchClient,
    indexes: Vec<SearchIndex>,
    retry: RetryConfig,
}

impl SearchLoader {
    pub fn new(client: SearchClient, indexes: Vec<SearchIndex>, retry: RetryConfig) -> Self {
        Self {
            client,
            indexes,
            retry,
        }
    }

    /// Create every configured index that does not exist yet
    ///
    /// Runs once at startup, before any load. Existing indexes are left
    /// untouched, so mappings changes require an explicit reindex.
    pub async fn ensure_indexes(&self) -> Result<()> {
        for &index in &self.indexes {
            let exists = with_retries(&self.retry, "check index exists", || {
                self.client.has_index(index)
            })
            .await?;

            if exists {
                tracing::debug!(index = %index, "Search index already exists");
                continue;
            }

            let body = mappings::index_body(index);
            with_retries(&self.retry, "create index", || {
                self.client.create_index(index, &body)
            })
            .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl DocumentSink for SearchLoader {
    async fn load(&self, index: SearchIndex, documents: &[IndexDocument]) -> Result<()> {
        if !self.indexes.contains(&index) {
            tracing::error!(index = %index, "Refusing to load into unconfigured index");
            return Ok(());
        }

        if documents.is_empty() {
            tracing::debug!(index = %index, "No documents to load");
            return Ok(());
        }

        with_retries(&self.retry, "bulk upsert", || {
            self.client.bulk_upsert(index, documents)
        })
        .await?;

        tracing::info!(index = %index, count = documents.len(), "Loaded documents");
        Ok(())
    }
}
