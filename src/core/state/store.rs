//! Durable watermark storage
//!
//! The [`WatermarkStore`] trait is a plain key/value checkpoint contract.
//! The file-backed implementation keeps all watermarks in one JSON document
//! and replaces it atomically on every write, so a crash mid-write leaves
//! the previous checkpoint intact.

use crate::domain::{CinesyncError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Durable key/value checkpoint store
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Retrieve the value for `key`, `None` when never written
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Persist `value` under `key`
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// File-backed watermark store
///
/// All keys live in a single JSON object. Writes go through a temporary
/// file followed by a rename.
pub struct FileWatermarkStore {
    path: PathBuf,
}

impl FileWatermarkStore {
    /// Open (or prepare to create) the store at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CinesyncError::State(format!(
                        "failed to create state directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        Ok(Self { path })
    }

    async fn read_entries(&self) -> Result<HashMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                CinesyncError::State(format!(
                    "corrupt watermark file {}: {e}",
                    self.path.display()
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(CinesyncError::State(format!(
                "failed to read watermark file {}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn write_entries(&self, entries: &HashMap<String, String>) -> Result<()> {
        let contents = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.path.with_extension("tmp");

        tokio::fs::write(&tmp_path, contents).await.map_err(|e| {
            CinesyncError::State(format!(
                "failed to write watermark file {}: {e}",
                tmp_path.display()
            ))
        })?;

        tokio::fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            CinesyncError::State(format!(
                "failed to replace watermark file {}: {e}",
                self.path.display()
            ))
        })
    }
}

#[async_trait]
impl WatermarkStore for FileWatermarkStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries().await?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await?;

        tracing::info!(key = key, value = value, "Watermark persisted");
        Ok(())
    }
}

/// In-memory watermark store
///
/// Used by tests and dry runs; nothing survives the process.
#[derive(Default)]
pub struct MemoryWatermarkStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryWatermarkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WatermarkStore for MemoryWatermarkStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_get_set() {
        let store = MemoryWatermarkStore::new();
        assert_eq!(store.get("movies_update").await.unwrap(), None);

        store
            .set("movies_update", "2021-01-01T00:00:00Z")
            .await
            .unwrap();
        assert_eq!(
            store.get("movies_update").await.unwrap().as_deref(),
            Some("2021-01-01T00:00:00Z")
        );
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileWatermarkStore::open(dir.path().join("watermarks.json")).unwrap();
        assert_eq!(store.get("genres_update").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_set_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileWatermarkStore::open(dir.path().join("watermarks.json")).unwrap();

        store.set("movies_update", "a").await.unwrap();
        store.set("movies_update", "b").await.unwrap();
        assert_eq!(store.get("movies_update").await.unwrap().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watermarks.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileWatermarkStore::open(&path).unwrap();
        assert!(store.get("movies_update").await.is_err());
    }
}
