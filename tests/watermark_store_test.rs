//! Integration tests for the durable watermark store
//!
//! The store must survive process restarts (modeled as re-opening the same
//! path) and keep independent keys for each index.

use cinesync::core::state::{
    format_watermark, parse_watermark, watermark_key, FileWatermarkStore, WatermarkStore,
};
use cinesync::domain::SearchIndex;
use chrono::{DateTime, Utc};
use tempfile::tempdir;

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_watermark_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("watermarks.json");

    {
        let store = FileWatermarkStore::open(&path).unwrap();
        store
            .set("movies_update", "2021-03-01T12:00:00Z")
            .await
            .unwrap();
    }

    // A fresh handle on the same path models a process restart
    let reopened = FileWatermarkStore::open(&path).unwrap();
    assert_eq!(
        reopened.get("movies_update").await.unwrap().as_deref(),
        Some("2021-03-01T12:00:00Z")
    );
}

#[tokio::test]
async fn test_indexes_have_independent_keys() {
    let dir = tempdir().unwrap();
    let store = FileWatermarkStore::open(dir.path().join("watermarks.json")).unwrap();

    store.set("movies_update", "2021-01-01T00:00:00Z").await.unwrap();
    store.set("genres_update", "2021-02-01T00:00:00Z").await.unwrap();

    assert_eq!(
        store.get("movies_update").await.unwrap().as_deref(),
        Some("2021-01-01T00:00:00Z")
    );
    assert_eq!(
        store.get("genres_update").await.unwrap().as_deref(),
        Some("2021-02-01T00:00:00Z")
    );
    assert_eq!(store.get("persons_update").await.unwrap(), None);
}

#[tokio::test]
async fn test_set_overwrites_previous_value() {
    let dir = tempdir().unwrap();
    let store = FileWatermarkStore::open(dir.path().join("watermarks.json")).unwrap();
    let key = watermark_key(SearchIndex::Movies);

    store.set(&key, "2021-01-01T00:00:00Z").await.unwrap();
    store.set(&key, "2021-01-01T00:01:00Z").await.unwrap();

    assert_eq!(
        store.get(&key).await.unwrap().as_deref(),
        Some("2021-01-01T00:01:00Z")
    );
}

#[tokio::test]
async fn test_missing_parent_directories_created() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("state").join("watermarks.json");

    let store = FileWatermarkStore::open(&path).unwrap();
    store.set("movies_update", "2021-01-01T00:00:00Z").await.unwrap();

    assert!(path.exists());
}

#[tokio::test]
async fn test_stored_value_round_trips_through_conventions() {
    let dir = tempdir().unwrap();
    let store = FileWatermarkStore::open(dir.path().join("watermarks.json")).unwrap();

    let till = ts("2021-06-16T20:15:09.221838Z");
    let key = watermark_key(SearchIndex::Persons);
    store.set(&key, &format_watermark(till)).await.unwrap();

    let raw = store.get(&key).await.unwrap().unwrap();
    assert_eq!(parse_watermark(&raw).unwrap(), till);
}

#[tokio::test]
async fn test_partial_write_leaves_previous_checkpoint() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("watermarks.json");
    let store = FileWatermarkStore::open(&path).unwrap();

    store.set("movies_update", "2021-01-01T00:00:00Z").await.unwrap();

    // A leftover temp file from a crashed write must not shadow the store
    std::fs::write(path.with_extension("tmp"), "garbage").unwrap();

    assert_eq!(
        store.get("movies_update").await.unwrap().as_deref(),
        Some("2021-01-01T00:00:00Z")
    );

    // And the next write still goes through
    store.set("movies_update", "2021-01-01T00:01:00Z").await.unwrap();
    assert_eq!(
        store.get("movies_update").await.unwrap().as_deref(),
        Some("2021-01-01T00:01:00Z")
    );
}
