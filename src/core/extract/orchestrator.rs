//! Receiver registry and cross-entity coordination

use crate::core::extract::boundary::TimeBoundary;
use crate::core::extract::receiver::EntityReceiver;
use crate::core::sync::RecordSource;
use crate::domain::{CatalogTable, IndexDocument, Result, SearchIndex};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Coordinates the configured entity receivers
///
/// Holds one receiver per target index and answers two questions: "what
/// changed for this index in this window" and "where does history begin"
/// for bootstrap.
pub struct SyncOrchestrator {
    receivers: Vec<EntityReceiver>,
}

impl SyncOrchestrator {
    pub fn new(receivers: Vec<EntityReceiver>) -> Self {
        Self { receivers }
    }

    fn receiver_for(&self, index: SearchIndex) -> Option<&EntityReceiver> {
        self.receivers.iter().find(|r| r.index() == index)
    }

    /// Fetch and denormalize everything dirtied for `index` inside
    /// `boundary`.
    ///
    /// Returns `Ok(None)` when no receiver is registered for `index`.
    pub async fn sync_index(
        &self,
        index: SearchIndex,
        tables: &[CatalogTable],
        boundary: &TimeBoundary,
    ) -> Result<Option<Vec<IndexDocument>>> {
        let Some(receiver) = self.receiver_for(index) else {
            tracing::info!(index = %index, "No receiver registered for index, skipping");
            return Ok(None);
        };

        receiver.changed_records(tables, boundary).await.map(Some)
    }

    /// Minimum earliest update time across all receivers
    ///
    /// Receivers over empty base tables are excluded; `None` means the
    /// whole catalog is empty.
    pub async fn min_earliest_update_time(&self) -> Result<Option<DateTime<Utc>>> {
        let mut times = Vec::with_capacity(self.receivers.len());
        for receiver in &self.receivers {
            times.push(receiver.earliest_update_time().await?);
        }

        Ok(fold_earliest(times))
    }
}

/// Minimum of the defined earliest times
///
/// An empty base table yields `None` and must be excluded from the
/// minimum, never treated as the smallest possible value.
fn fold_earliest(times: impl IntoIterator<Item = Option<DateTime<Utc>>>) -> Option<DateTime<Utc>> {
    times.into_iter().flatten().min()
}

#[async_trait]
impl RecordSource for SyncOrchestrator {
    async fn changed_documents(
        &self,
        index: SearchIndex,
        tables: &[CatalogTable],
        boundary: &TimeBoundary,
    ) -> Result<Option<Vec<IndexDocument>>> {
        self.sync_index(index, tables, boundary).await
    }

    async fn min_earliest_update_time(&self) -> Result<Option<DateTime<Utc>>> {
        SyncOrchestrator::min_earliest_update_time(self).await
    }
}
