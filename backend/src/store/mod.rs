use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{fs, sync::Mutex};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("high score file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("high score file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Persistent home of the high score
#[async_trait]
pub trait HighScoreStore: Send + Sync {
    async fn get(&self) -> Result<u32, StoreError>;

    async fn set(&self, score: u32) -> Result<(), StoreError>;

    /// Store `score` if it beats the current value.
    /// Returns the high score after the call and whether it changed.
    async fn record_if_higher(&self, score: u32) -> Result<(u32, bool), StoreError> {
        let current = self.get().await?;
        if score > current {
            self.set(score).await?;
            Ok((score, true))
        } else {
            Ok((current, false))
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HighScoreRecord {
    high_score: u32,
    updated_at: Option<DateTime<Utc>>,
}

/// High score kept in a small JSON file
pub struct FileHighScoreStore {
    path: PathBuf,
    // Serializes read-compare-write across connections
    lock: Mutex<()>,
}

impl FileHighScoreStore {
    /// Open the store, creating the file with a score of 0 if it does not exist
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self {
            path: path.into(),
            lock: Mutex::new(()),
        };

        if fs::try_exists(&store.path).await? {
            // Fail early on a file we cannot understand
            store.read_record().await?;
        } else {
            if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await?;
            }
            store.write_record(&HighScoreRecord::default()).await?;
            tracing::info!("Initialized high score file at {}", store.path.display());
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_record(&self) -> Result<HighScoreRecord, StoreError> {
        let content = fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write to a sibling temp file and rename it into place
    async fn write_record(&self, record: &HighScoreRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(record)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).await?;
        fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl HighScoreStore for FileHighScoreStore {
    async fn get(&self) -> Result<u32, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_record().await?.high_score)
    }

    async fn set(&self, score: u32) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.write_record(&HighScoreRecord {
            high_score: score,
            updated_at: Some(Utc::now()),
        })
        .await
    }

    async fn record_if_higher(&self, score: u32) -> Result<(u32, bool), StoreError> {
        let _guard = self.lock.lock().await;
        let current = self.read_record().await?.high_score;
        if score <= current {
            return Ok((current, false));
        }

        self.write_record(&HighScoreRecord {
            high_score: score,
            updated_at: Some(Utc::now()),
        })
        .await?;
        tracing::info!("New high score {} (was {})", score, current);
        Ok((score, true))
    }
}

/// In-process store, used by tests
#[cfg(test)]
#[derive(Default)]
pub struct MemoryHighScoreStore {
    value: Mutex<u32>,
}

#[cfg(test)]
impl MemoryHighScoreStore {
    pub fn new(initial: u32) -> Self {
        Self {
            value: Mutex::new(initial),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl HighScoreStore for MemoryHighScoreStore {
    async fn get(&self) -> Result<u32, StoreError> {
        Ok(*self.value.lock().await)
    }

    async fn set(&self, score: u32) -> Result<(), StoreError> {
        *self.value.lock().await = score;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("letter-dash-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[tokio::test]
    async fn test_file_store_starts_at_zero() {
        let path = temp_path("high_score.json");
        let store = FileHighScoreStore::open(&path).await.unwrap();
        assert_eq!(store.get().await.unwrap(), 0);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let path = temp_path("high_score.json");
        {
            let store = FileHighScoreStore::open(&path).await.unwrap();
            store.set(4).await.unwrap();
        }

        let reopened = FileHighScoreStore::open(&path).await.unwrap();
        assert_eq!(reopened.get().await.unwrap(), 4);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_record_if_higher_never_lowers() {
        let store = FileHighScoreStore::open(temp_path("hs.json")).await.unwrap();

        assert_eq!(store.record_if_higher(3).await.unwrap(), (3, true));
        assert_eq!(store.record_if_higher(2).await.unwrap(), (3, false));
        assert_eq!(store.record_if_higher(3).await.unwrap(), (3, false));
        assert_eq!(store.record_if_higher(5).await.unwrap(), (5, true));
        assert_eq!(store.get().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_malformed_file_is_rejected() {
        let path = temp_path("broken.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not a number").unwrap();

        let result = FileHighScoreStore::open(&path).await;
        assert!(matches!(result, Err(StoreError::Malformed(_))));
    }

    #[test]
    fn test_memory_store_default_record_if_higher() {
        let store = MemoryHighScoreStore::new(2);
        tokio_test::block_on(async {
            assert_eq!(store.record_if_higher(1).await.unwrap(), (2, false));
            assert_eq!(store.record_if_higher(6).await.unwrap(), (6, true));
            assert_eq!(store.get().await.unwrap(), 6);
        });
    }
}
