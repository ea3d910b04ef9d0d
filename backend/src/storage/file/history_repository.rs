//! # File History Repository
//!
//! History lives in a single `history.csv`, oldest row first, so appends
//! read naturally in a spreadsheet:
//!
//! ```csv
//! id,slot,caretaker,date,timestamp,created_at,owner
//! history::5f0c…,morning,Dani,2024-01-15,2024-01-15T12:30:00.000Z,2024-01-15T12:30:00.010Z,
//! ```
//!
//! Every mutation rewrites the file through a temp file and rename while
//! holding a lock, so concurrent requests in one process cannot interleave.

use anyhow::Result;
use async_trait::async_trait;
use csv::{ReaderBuilder, WriterBuilder};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::connection::{FileConnection, HISTORY_HEADER};
use crate::domain::models::StoredFeedingRecord;
use crate::storage::traits::FeedingHistoryStorage;
use crate::storage::StoreError;

#[derive(Clone)]
pub struct FileHistoryRepository {
    connection: FileConnection,
    write_lock: Arc<Mutex<()>>,
}

impl FileHistoryRepository {
    pub fn new(connection: FileConnection) -> Self {
        Self {
            connection,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Read every row in file order (oldest first), skipping rows that do not parse
    fn read_records(&self) -> Result<Vec<StoredFeedingRecord>> {
        self.connection.ensure_history_file_exists()?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(self.connection.history_file_path())
            .map_err(StoreError::from)?;

        let mut records = Vec::new();
        for (line, result) in reader.deserialize::<StoredFeedingRecord>().enumerate() {
            match result {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping malformed history row {}: {}", line + 1, e),
            }
        }
        Ok(records)
    }

    /// Replace the file contents with `records` (oldest first)
    fn write_records(&self, records: &[StoredFeedingRecord]) -> Result<()> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        writer.write_record(HISTORY_HEADER)?;
        for record in records {
            writer.serialize(record)?;
        }
        let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("Failed to flush history CSV: {}", e))?;

        self.connection
            .write_atomically(&self.connection.history_file_path(), &bytes)
    }
}

#[async_trait]
impl FeedingHistoryStorage for FileHistoryRepository {
    async fn list_records(&self, limit: Option<u32>) -> Result<Vec<StoredFeedingRecord>> {
        let records = self.read_records()?;
        let take = limit.map(|l| l as usize).unwrap_or(records.len());
        Ok(records.into_iter().rev().take(take).collect())
    }

    async fn insert_record(&self, record: &StoredFeedingRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_records()?;
        records.push(record.clone());
        self.write_records(&records)?;
        debug!("Appended history row {}", record.id);
        Ok(())
    }

    async fn delete_record(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_records()?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.write_records(&records)?;
        debug!("Deleted history row {}", id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (FileHistoryRepository, FileConnection, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection = FileConnection::new(temp_dir.path()).expect("Failed to create connection");
        (FileHistoryRepository::new(connection.clone()), connection, temp_dir)
    }

    fn row(id: &str, owner: Option<&str>) -> StoredFeedingRecord {
        StoredFeedingRecord {
            id: id.to_string(),
            slot: "evening".to_string(),
            caretaker: "Siahh, the elder".to_string(),
            date: "2024-01-01".to_string(),
            timestamp: "2024-01-01T23:00:00.000Z".to_string(),
            created_at: "2024-01-01T23:00:00.100Z".to_string(),
            owner: owner.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (repo, _connection, _temp_dir) = setup();
        repo.insert_record(&row("first", None)).await.unwrap();
        repo.insert_record(&row("second", Some("user-1"))).await.unwrap();

        let records = repo.list_records(None).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], row("second", Some("user-1")));
        assert_eq!(records[1], row("first", None));

        let limited = repo.list_records(Some(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, "second");
    }

    #[tokio::test]
    async fn test_delete_removes_only_matching_row() {
        let (repo, _connection, _temp_dir) = setup();
        repo.insert_record(&row("a", None)).await.unwrap();
        repo.insert_record(&row("b", None)).await.unwrap();

        assert!(repo.delete_record("a").await.unwrap());
        assert!(!repo.delete_record("missing").await.unwrap());

        let ids: Vec<String> = repo.list_records(None).await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[tokio::test]
    async fn test_malformed_rows_are_skipped() {
        let (repo, connection, _temp_dir) = setup();
        repo.insert_record(&row("good", None)).await.unwrap();

        let mut contents = fs::read_to_string(connection.history_file_path()).unwrap();
        contents.push_str("only,three,fields\n");
        fs::write(connection.history_file_path(), contents).unwrap();

        let records = repo.list_records(None).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "good");
    }

    #[tokio::test]
    async fn test_empty_history_file_lists_nothing() {
        let (repo, connection, _temp_dir) = setup();
        assert!(repo.list_records(None).await.unwrap().is_empty());
        assert!(connection.history_file_path().exists());
    }
}
