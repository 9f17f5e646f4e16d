//! The sync driver loop
//!
//! Per index, per cycle: read the watermark, bootstrap from the earliest
//! catalog update when absent, compute the extraction window, fetch and
//! denormalize the dirty set, load it, and only then persist the window end
//! as the new watermark. A cycle that fails anywhere before the checkpoint
//! leaves the watermark untouched and the same window is reprocessed on the
//! next attempt.
//!
//! The watermark for an index must only ever be advanced by a single driver
//! process; concurrent drivers on the same index would race the
//! read-modify-write. That is an operational invariant (one active instance
//! per index), not enforced here.

use crate::config::{RetryConfig, SyncConfig};
use crate::core::extract::{compute_boundary, TimeBoundary};
use crate::core::retry::with_retries;
use crate::core::state::{format_watermark, parse_watermark, watermark_key, WatermarkStore};
use crate::core::sync::{DocumentSink, RecordSource};
use crate::domain::{CatalogTable, Result, SearchIndex};
use chrono::{DateTime, Duration, Utc};

/// Driver loop settings, derived from [`SyncConfig`] once at startup
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Indexes to synchronize, in cycle order
    pub indexes: Vec<SearchIndex>,

    /// Superset of tables every receiver is offered; each skips the ones it
    /// has no binding for
    pub tables: Vec<CatalogTable>,

    /// Width of each extraction window
    pub step: Duration,

    /// How close to "now" the laggiest window must reach before the loop
    /// sleeps instead of immediately starting the next pass
    pub freshness_margin: Duration,

    /// Sleep between passes once caught up
    pub repeat: std::time::Duration,

    /// Extract and transform, but skip index writes and watermark advances
    pub dry_run: bool,
}

impl SyncSettings {
    pub fn from_config(sync: &SyncConfig, dry_run: bool) -> Self {
        Self {
            indexes: sync.indexes.clone(),
            tables: CatalogTable::all().to_vec(),
            step: Duration::seconds(sync.step_seconds as i64),
            freshness_margin: Duration::seconds(sync.freshness_margin_seconds as i64),
            repeat: std::time::Duration::from_secs(sync.repeat_seconds),
            dry_run,
        }
    }
}

/// What one full pass over the configured indexes did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassOutcome {
    /// Indexes that completed a cycle (window synced and checkpointed)
    pub synced: usize,

    /// Documents handed to the sink across the pass
    pub documents: usize,

    /// Whether even the most-behind index has reached the freshness margin;
    /// indexes with nothing to sync count as caught up
    pub caught_up: bool,
}

enum CycleOutcome {
    /// Window synced; carries the window end that became the new watermark
    /// and the number of documents loaded
    Synced(DateTime<Utc>, usize),

    /// Nothing to do: unconfigured index, or bootstrap over an empty catalog
    Idle,
}

/// Coordinates extraction, loading and checkpointing for all indexes
pub struct SyncDriver<S, L, W> {
    source: S,
    sink: L,
    state: W,
    settings: SyncSettings,
    retry: RetryConfig,
}

impl<S, L, W> SyncDriver<S, L, W>
where
    S: RecordSource,
    L: DocumentSink,
    W: WatermarkStore,
{
    pub fn new(source: S, sink: L, state: W, settings: SyncSettings, retry: RetryConfig) -> Self {
        Self {
            source,
            sink,
            state,
            settings,
            retry,
        }
    }

    /// Run sync passes until `shutdown` flips to true
    ///
    /// After a pass that is caught up (every window end within the freshness
    /// margin of now) the loop sleeps `repeat` before the next pass;
    /// otherwise it continues immediately to catch up. A pass failing on a
    /// transient error is logged and the loop carries on; a non-transient
    /// error (misconfiguration) halts the loop instead of reproducing the
    /// same failure forever.
    pub async fn run(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) -> Result<()> {
        loop {
            if *shutdown.borrow() {
                tracing::info!("Shutdown requested, stopping sync loop");
                return Ok(());
            }

            let caught_up = match self.run_pass().await {
                Ok(outcome) => {
                    tracing::debug!(
                        synced = outcome.synced,
                        documents = outcome.documents,
                        caught_up = outcome.caught_up,
                        "Sync pass finished"
                    );
                    outcome.caught_up
                }
                Err(e) if e.is_transient() => {
                    tracing::error!(error = %e, "Sync pass failed, will retry next pass");
                    true
                }
                Err(e) => return Err(e),
            };

            // A dry run never advances watermarks, so it always sleeps to
            // avoid hot-looping over the same window.
            if caught_up || self.settings.dry_run {
                tokio::select! {
                    _ = tokio::time::sleep(self.settings.repeat) => {}
                    _ = shutdown.changed() => {}
                }
            }
        }
    }

    /// Run one pass over every configured index
    pub async fn run_pass(&self) -> Result<PassOutcome> {
        let mut synced = 0;
        let mut documents = 0;
        let mut laggiest_till: Option<DateTime<Utc>> = None;

        for &index in &self.settings.indexes {
            match self.run_cycle(index).await? {
                CycleOutcome::Synced(till, count) => {
                    synced += 1;
                    documents += count;
                    laggiest_till = Some(match laggiest_till {
                        Some(current) => current.min(till),
                        None => till,
                    });
                }
                CycleOutcome::Idle => {}
            }
        }

        // The sleep/continue decision looks at the most-behind index only:
        // catching up one index must not be starved by another being fresh.
        let caught_up = match laggiest_till {
            Some(till) => till > Utc::now() - self.settings.freshness_margin,
            None => true,
        };

        Ok(PassOutcome {
            synced,
            documents,
            caught_up,
        })
    }

    async fn run_cycle(&self, index: SearchIndex) -> Result<CycleOutcome> {
        let key = watermark_key(index);

        let stored = with_retries(&self.retry, "read watermark", || self.state.get(&key)).await?;
        let last = stored.as_deref().map(parse_watermark).transpose()?;

        let from_time = match last {
            Some(time) => time,
            None => match self.source.min_earliest_update_time().await? {
                Some(earliest) => {
                    tracing::info!(
                        index = %index,
                        earliest = %earliest,
                        "No watermark, bootstrapping from earliest catalog update"
                    );
                    earliest
                }
                None => {
                    // An empty catalog writes no watermark, so the first rows
                    // ever inserted are picked up by a later bootstrap.
                    tracing::info!(index = %index, "Catalog is empty, nothing to bootstrap");
                    return Ok(CycleOutcome::Idle);
                }
            },
        };

        let Some(boundary) = compute_boundary(Some(from_time), self.settings.step) else {
            return Ok(CycleOutcome::Idle);
        };

        // A window reaching past "now" has not fully happened yet; scanning
        // it early and committing its end would skip rows that land in it
        // afterwards. Wait for the window to close instead.
        if boundary.till_time() > Utc::now() {
            tracing::debug!(
                index = %index,
                window = %boundary,
                "Window extends past now, waiting for it to close"
            );
            return Ok(CycleOutcome::Idle);
        }

        let Some(records) = self
            .source
            .changed_documents(index, &self.settings.tables, &boundary)
            .await?
        else {
            return Ok(CycleOutcome::Idle);
        };

        let count = records.len();

        if self.settings.dry_run {
            tracing::info!(
                index = %index,
                documents = count,
                window = %boundary,
                "Dry run: skipping load and watermark advance"
            );
            return Ok(CycleOutcome::Synced(boundary.till_time(), count));
        }

        self.sink.load(index, &records).await?;
        self.advance_watermark(&key, &boundary).await?;

        Ok(CycleOutcome::Synced(boundary.till_time(), count))
    }

    async fn advance_watermark(&self, key: &str, boundary: &TimeBoundary) -> Result<()> {
        let value = format_watermark(boundary.till_time());
        with_retries(&self.retry, "write watermark", || {
            self.state.set(key, &value)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::MemoryWatermarkStore;
    use crate::domain::{CinesyncError, IndexDocument};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use uuid::Uuid;

    struct FakeSource {
        earliest: Option<DateTime<Utc>>,
        documents: Option<Vec<IndexDocument>>,
        windows: Mutex<Vec<TimeBoundary>>,
    }

    impl FakeSource {
        fn with_docs(earliest: Option<DateTime<Utc>>, count: usize) -> Self {
            let documents = (0..count)
                .map(|_| IndexDocument {
                    id: Uuid::new_v4(),
                    body: serde_json::json!({}),
                })
                .collect();
            Self {
                earliest,
                documents: Some(documents),
                windows: Mutex::new(Vec::new()),
            }
        }

        fn unconfigured() -> Self {
            Self {
                earliest: Some(ts("2021-01-01T00:00:00Z")),
                documents: None,
                windows: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RecordSource for FakeSource {
        async fn changed_documents(
            &self,
            _index: SearchIndex,
            _tables: &[CatalogTable],
            boundary: &TimeBoundary,
        ) -> Result<Option<Vec<IndexDocument>>> {
            self.windows.lock().unwrap().push(*boundary);
            Ok(self.documents.clone())
        }

        async fn min_earliest_update_time(&self) -> Result<Option<DateTime<Utc>>> {
            Ok(self.earliest)
        }
    }

    struct FakeSink {
        fail: AtomicBool,
        loads: Mutex<Vec<(SearchIndex, usize)>>,
    }

    impl FakeSink {
        fn ok() -> Self {
            Self {
                fail: AtomicBool::new(false),
                loads: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            let sink = Self::ok();
            sink.fail.store(true, Ordering::SeqCst);
            sink
        }
    }

    #[async_trait]
    impl DocumentSink for FakeSink {
        async fn load(&self, index: SearchIndex, documents: &[IndexDocument]) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(CinesyncError::Database("index unreachable".to_string()));
            }
            self.loads.lock().unwrap().push((index, documents.len()));
            Ok(())
        }
    }

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn settings() -> SyncSettings {
        SyncSettings {
            indexes: vec![SearchIndex::Movies],
            tables: CatalogTable::all().to_vec(),
            step: Duration::seconds(60),
            freshness_margin: Duration::seconds(60),
            repeat: std::time::Duration::from_secs(1),
            dry_run: false,
        }
    }

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_retries: 1,
            initial_delay_ms: 1,
            max_delay_ms: 1,
            backoff_multiplier: 1.0,
        }
    }

    fn driver(
        source: FakeSource,
        sink: FakeSink,
        settings: SyncSettings,
    ) -> SyncDriver<FakeSource, FakeSink, MemoryWatermarkStore> {
        SyncDriver::new(
            source,
            sink,
            MemoryWatermarkStore::new(),
            settings,
            fast_retry(),
        )
    }

    #[tokio::test]
    async fn test_bootstrap_starts_at_earliest_update() {
        let earliest = ts("2020-06-15T00:00:00Z");
        let d = driver(
            FakeSource::with_docs(Some(earliest), 2),
            FakeSink::ok(),
            settings(),
        );

        let outcome = d.run_pass().await.unwrap();
        assert_eq!(outcome.synced, 1);
        assert_eq!(outcome.documents, 2);

        let stored = d.state.get("movies_update").await.unwrap().unwrap();
        assert_eq!(parse_watermark(&stored).unwrap(), earliest + Duration::seconds(60));
    }

    #[tokio::test]
    async fn test_window_starts_at_stored_watermark() {
        let d = driver(
            FakeSource::with_docs(Some(ts("2020-01-01T00:00:00Z")), 1),
            FakeSink::ok(),
            settings(),
        );
        d.state
            .set("movies_update", "2021-03-01T12:00:00Z")
            .await
            .unwrap();

        d.run_pass().await.unwrap();

        let windows = d.source.windows.lock().unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].from_time, ts("2021-03-01T12:00:00Z"));
    }

    #[tokio::test]
    async fn test_failed_load_leaves_watermark_untouched() {
        let d = driver(
            FakeSource::with_docs(Some(ts("2021-01-01T00:00:00Z")), 1),
            FakeSink::failing(),
            settings(),
        );

        assert!(d.run_pass().await.is_err());
        assert_eq!(d.state.get("movies_update").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_restart_reprocesses_same_window() {
        let source = FakeSource::with_docs(Some(ts("2021-01-01T00:00:00Z")), 1);
        let d = driver(source, FakeSink::failing(), settings());

        assert!(d.run_pass().await.is_err());
        d.sink.fail.store(false, Ordering::SeqCst);
        d.run_pass().await.unwrap();

        let windows = d.source.windows.lock().unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0], windows[1]);
    }

    #[tokio::test]
    async fn test_unconfigured_index_is_idle() {
        let d = driver(FakeSource::unconfigured(), FakeSink::ok(), settings());

        let outcome = d.run_pass().await.unwrap();
        assert_eq!(outcome.synced, 0);
        assert!(outcome.caught_up);
        assert_eq!(d.state.get("movies_update").await.unwrap(), None);
        assert!(d.sink.loads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_catalog_writes_no_watermark() {
        let d = driver(FakeSource::with_docs(None, 0), FakeSink::ok(), settings());

        let outcome = d.run_pass().await.unwrap();
        assert_eq!(outcome.synced, 0);
        assert!(outcome.caught_up);
        assert_eq!(d.state.get("movies_update").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_dry_run_skips_load_and_checkpoint() {
        let mut s = settings();
        s.dry_run = true;
        let d = driver(
            FakeSource::with_docs(Some(ts("2021-01-01T00:00:00Z")), 3),
            FakeSink::ok(),
            s,
        );

        let outcome = d.run_pass().await.unwrap();
        assert_eq!(outcome.synced, 1);
        assert_eq!(outcome.documents, 3);
        assert!(d.sink.loads.lock().unwrap().is_empty());
        assert_eq!(d.state.get("movies_update").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_far_behind_pass_is_not_caught_up() {
        let d = driver(
            FakeSource::with_docs(Some(ts("2021-01-01T00:00:00Z")), 0),
            FakeSink::ok(),
            settings(),
        );

        let outcome = d.run_pass().await.unwrap();
        assert!(!outcome.caught_up);
    }

    #[tokio::test]
    async fn test_fresh_watermark_is_caught_up() {
        let d = driver(
            FakeSource::with_docs(Some(ts("2021-01-01T00:00:00Z")), 0),
            FakeSink::ok(),
            settings(),
        );
        let near_now = format_watermark(Utc::now());
        d.state.set("movies_update", &near_now).await.unwrap();

        let outcome = d.run_pass().await.unwrap();
        assert!(outcome.caught_up);
    }

    #[tokio::test]
    async fn test_open_window_is_not_scanned_early() {
        let d = driver(
            FakeSource::with_docs(Some(ts("2021-01-01T00:00:00Z")), 5),
            FakeSink::ok(),
            settings(),
        );
        // The window [now - 30s, now + 30s) has not closed yet
        let mid_window = format_watermark(Utc::now() - Duration::seconds(30));
        d.state.set("movies_update", &mid_window).await.unwrap();

        let outcome = d.run_pass().await.unwrap();
        assert_eq!(outcome.synced, 0);
        assert!(outcome.caught_up);
        assert!(d.source.windows.lock().unwrap().is_empty());
        // The watermark stays where it was until the window closes
        let stored = d.state.get("movies_update").await.unwrap().unwrap();
        assert_eq!(stored, mid_window);
    }

    #[tokio::test]
    async fn test_corrupt_watermark_surfaces() {
        let d = driver(
            FakeSource::with_docs(Some(ts("2021-01-01T00:00:00Z")), 0),
            FakeSink::ok(),
            settings(),
        );
        d.state.set("movies_update", "not a time").await.unwrap();

        assert!(d.run_pass().await.is_err());
    }
}
