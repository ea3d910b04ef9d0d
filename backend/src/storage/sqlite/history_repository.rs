use anyhow::Result;
use async_trait::async_trait;
use sqlx::Row;

use super::connection::DbConnection;
use crate::domain::models::StoredFeedingRecord;
use crate::storage::traits::FeedingHistoryStorage;
use crate::storage::StoreError;

#[derive(Clone)]
pub struct SqliteHistoryRepository {
    db: DbConnection,
}

impl SqliteHistoryRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FeedingHistoryStorage for SqliteHistoryRepository {
    async fn list_records(&self, limit: Option<u32>) -> Result<Vec<StoredFeedingRecord>> {
        // LIMIT -1 is SQLite for "no limit"
        let limit = limit.map(i64::from).unwrap_or(-1);

        let rows = sqlx::query(
            r#"
            SELECT id, slot, caretaker, date, timestamp, created_at, owner
            FROM feeding_history
            ORDER BY created_at DESC, ROWID DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.db.pool())
        .await
        .map_err(StoreError::from)?;

        rows.iter()
            .map(|row| -> Result<StoredFeedingRecord> {
                Ok(StoredFeedingRecord {
                    id: row.try_get("id")?,
                    slot: row.try_get("slot")?,
                    caretaker: row.try_get("caretaker")?,
                    date: row.try_get("date")?,
                    timestamp: row.try_get("timestamp")?,
                    created_at: row.try_get("created_at")?,
                    owner: row.try_get("owner")?,
                })
            })
            .collect()
    }

    async fn insert_record(&self, record: &StoredFeedingRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO feeding_history (id, slot, caretaker, date, timestamp, created_at, owner)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.slot)
        .bind(&record.caretaker)
        .bind(&record.date)
        .bind(&record.timestamp)
        .bind(&record.created_at)
        .bind(&record.owner)
        .execute(self.db.pool())
        .await
        .map_err(StoreError::from)?;
        Ok(())
    }

    async fn delete_record(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM feeding_history WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await
            .map_err(StoreError::from)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test() -> SqliteHistoryRepository {
        let db = DbConnection::in_memory().await.expect("Failed to create test database");
        SqliteHistoryRepository::new(db)
    }

    fn row(id: &str, created_at: &str) -> StoredFeedingRecord {
        StoredFeedingRecord {
            id: id.to_string(),
            slot: "morning".to_string(),
            caretaker: "Africa".to_string(),
            date: "2024-01-01".to_string(),
            timestamp: created_at.to_string(),
            created_at: created_at.to_string(),
            owner: None,
        }
    }

    #[tokio::test]
    async fn test_list_orders_by_created_at_desc() {
        let repo = setup_test().await;
        repo.insert_record(&row("old", "2024-01-01T07:00:00.000Z")).await.unwrap();
        repo.insert_record(&row("new", "2024-01-02T07:00:00.000Z")).await.unwrap();
        repo.insert_record(&row("mid", "2024-01-01T19:00:00.000Z")).await.unwrap();

        let ids: Vec<String> = repo.list_records(None).await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);

        let limited = repo.list_records(Some(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, "new");
    }

    #[tokio::test]
    async fn test_same_created_at_falls_back_to_insert_order() {
        let repo = setup_test().await;
        repo.insert_record(&row("first", "2024-01-01T07:00:00.000Z")).await.unwrap();
        repo.insert_record(&row("second", "2024-01-01T07:00:00.000Z")).await.unwrap();

        let records = repo.list_records(None).await.unwrap();
        assert_eq!(records[0].id, "second");
    }

    #[tokio::test]
    async fn test_delete_record() {
        let repo = setup_test().await;
        repo.insert_record(&row("a", "2024-01-01T07:00:00.000Z")).await.unwrap();

        assert!(repo.delete_record("a").await.unwrap());
        assert!(!repo.delete_record("a").await.unwrap());
        assert!(repo.list_records(None).await.unwrap().is_empty());
    }
}
