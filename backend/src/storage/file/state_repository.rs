//! # File State Repository
//!
//! One YAML file per calendar day under `states/`. Writes go through a temp
//! file and rename so a crash never leaves a half-written day behind. Writes
//! hold a lock so two saves of the same day cannot share the temp file.

use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::connection::FileConnection;
use crate::domain::models::{DateId, StoredFeedingState};
use crate::storage::traits::FeedingStateStorage;
use crate::storage::StoreError;

#[derive(Clone)]
pub struct FileStateRepository {
    connection: FileConnection,
    write_lock: Arc<Mutex<()>>,
}

impl FileStateRepository {
    pub fn new(connection: FileConnection) -> Self {
        Self {
            connection,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Dates double as file names, so only well-formed ids are accepted
    fn checked_date(date: &str) -> Result<DateId> {
        date.parse::<DateId>()
            .map_err(|_| StoreError::Malformed(format!("'{}' is not a date id", date)).into())
    }

    fn load_state_file(&self, date: &str) -> Result<Option<StoredFeedingState>> {
        let path = self.connection.state_file_path(date);
        if !path.exists() {
            debug!("No state file for {}", date);
            return Ok(None);
        }

        let yaml_content = fs::read_to_string(&path).map_err(StoreError::from)?;
        let state: StoredFeedingState = serde_yaml::from_str(&yaml_content)
            .map_err(|e| StoreError::Malformed(format!("{}: {}", path.display(), e)))?;
        Ok(Some(state))
    }
}

#[async_trait]
impl FeedingStateStorage for FileStateRepository {
    async fn get_state(&self, date: &str) -> Result<Option<StoredFeedingState>> {
        Self::checked_date(date)?;
        self.load_state_file(date)
    }

    async fn latest_state(&self) -> Result<Option<StoredFeedingState>> {
        let mut latest: Option<DateId> = None;

        for entry in fs::read_dir(self.connection.states_directory()).map_err(StoreError::from)? {
            let path = entry.map_err(StoreError::from)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            let date = match path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<DateId>().ok())
            {
                Some(date) => date,
                None => continue,
            };
            if latest.map_or(true, |current| date > current) {
                latest = Some(date);
            }
        }

        match latest {
            Some(date) => self.load_state_file(&date.to_string()),
            None => Ok(None),
        }
    }

    async fn upsert_state(&self, state: &StoredFeedingState) -> Result<()> {
        Self::checked_date(&state.date)?;

        let path = self.connection.state_file_path(&state.date);
        let yaml_content = serde_yaml::to_string(state)?;
        let _guard = self.write_lock.lock().await;
        self.connection.write_atomically(&path, yaml_content.as_bytes())?;

        debug!("Saved state for {} to {:?}", state.date, path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{StoredSlots, StoredStatus};
    use tempfile::TempDir;

    fn setup() -> (FileStateRepository, FileConnection, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection = FileConnection::new(temp_dir.path()).expect("Failed to create connection");
        (FileStateRepository::new(connection.clone()), connection, temp_dir)
    }

    fn row(date: &str, morning_by: Option<&str>) -> StoredFeedingState {
        StoredFeedingState {
            date: date.to_string(),
            slots: StoredSlots {
                morning: Some(StoredStatus {
                    slot: Some("morning".to_string()),
                    done: morning_by.is_some(),
                    caretaker: morning_by.map(str::to_string),
                    timestamp: morning_by.map(|_| format!("{}T07:00:00.000Z", date)),
                }),
                evening: Some(StoredStatus {
                    slot: Some("evening".to_string()),
                    ..StoredStatus::default()
                }),
            },
            updated_at: format!("{}T07:00:00.000Z", date),
            owner: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_whole_row() {
        let (repo, _connection, _temp_dir) = setup();

        repo.upsert_state(&row("2024-01-01", Some("Leonyx"))).await.unwrap();
        repo.upsert_state(&row("2024-01-01", None)).await.unwrap();

        let stored = repo.get_state("2024-01-01").await.unwrap().unwrap();
        assert_eq!(stored, row("2024-01-01", None));
    }

    #[tokio::test]
    async fn test_latest_state_picks_greatest_date() {
        let (repo, connection, _temp_dir) = setup();

        repo.upsert_state(&row("2024-01-02", None)).await.unwrap();
        repo.upsert_state(&row("2023-12-30", None)).await.unwrap();
        fs::write(connection.states_directory().join("notes.yaml"), "junk").unwrap();

        let latest = repo.latest_state().await.unwrap().unwrap();
        assert_eq!(latest.date, "2024-01-02");
    }

    #[tokio::test]
    async fn test_latest_state_empty_directory() {
        let (repo, _connection, _temp_dir) = setup();
        assert!(repo.latest_state().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unparseable_file_is_an_error() {
        let (repo, connection, _temp_dir) = setup();
        fs::write(connection.state_file_path("2024-01-01"), "date: [unclosed").unwrap();

        assert!(repo.get_state("2024-01-01").await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_path_like_dates() {
        let (repo, _connection, _temp_dir) = setup();
        assert!(repo.get_state("../escape").await.is_err());
        assert!(repo.upsert_state(&row("../../x", None)).await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_of_same_day_all_succeed() {
        let (repo, connection, _temp_dir) = setup();
        let names = ["Africa", "Dani", "Garnet", "Leonyx", "Salem", "Siahh", "Tats", "Yose"];

        let mut handles = Vec::new();
        for _ in 0..4 {
            for name in names {
                let repo = repo.clone();
                handles.push(tokio::spawn(async move { repo.upsert_state(&row("2024-01-01", Some(name))).await }));
            }
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = repo.get_state("2024-01-01").await.unwrap().unwrap();
        let caretaker = stored.slots.morning.unwrap().caretaker.unwrap();
        assert!(names.contains(&caretaker.as_str()));
        assert!(!connection.states_directory().join("2024-01-01.tmp").exists());
    }

    #[tokio::test]
    async fn test_io_failure_is_reported_as_unavailable() {
        let (repo, connection, _temp_dir) = setup();
        fs::remove_dir_all(connection.states_directory()).unwrap();

        let err = repo.latest_state().await.unwrap_err();
        assert!(matches!(err.downcast_ref::<StoreError>(), Some(StoreError::Unavailable(_))));

        let err = repo.upsert_state(&row("2024-01-01", None)).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<StoreError>(), Some(StoreError::Unavailable(_))));
    }
}
