//! Sync loop: the driver and the seams it coordinates over
//!
//! The driver only sees three traits: where changed documents come from
//! ([`RecordSource`]), where they go ([`DocumentSink`]), and where the
//! checkpoint lives ([`crate::core::state::WatermarkStore`]).

pub mod driver;

pub use driver::{PassOutcome, SyncDriver, SyncSettings};

use crate::core::extract::TimeBoundary;
use crate::domain::{CatalogTable, IndexDocument, Result, SearchIndex};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Source of changed, denormalized documents for a window
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Changed documents for `index` inside `boundary`
    ///
    /// Returns `Ok(None)` when no receiver is registered for `index`; an
    /// unconfigured index is a no-op, not a fault.
    async fn changed_documents(
        &self,
        index: SearchIndex,
        tables: &[CatalogTable],
        boundary: &TimeBoundary,
    ) -> Result<Option<Vec<IndexDocument>>>;

    /// Minimum earliest update time across all registered receivers,
    /// ignoring entities with empty base tables. `None` when every base
    /// table is empty.
    async fn min_earliest_update_time(&self) -> Result<Option<DateTime<Utc>>>;
}

/// Destination for denormalized documents
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Upsert `documents` into `index`, idempotent by document id
    async fn load(&self, index: SearchIndex, documents: &[IndexDocument]) -> Result<()>;
}
