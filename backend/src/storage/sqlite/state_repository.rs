use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::warn;

use super::connection::DbConnection;
use crate::domain::models::{StoredFeedingState, StoredSlots};
use crate::storage::traits::FeedingStateStorage;
use crate::storage::StoreError;

#[derive(Clone)]
pub struct SqliteStateRepository {
    db: DbConnection,
}

impl SqliteStateRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn state_from_row(row: &SqliteRow) -> Result<StoredFeedingState> {
        let date: String = row.try_get("date")?;
        let slots_json: String = row.try_get("slots")?;

        let slots = serde_json::from_str::<StoredSlots>(&slots_json).unwrap_or_else(|e| {
            warn!("Undecodable slots for {} ({}), loading blank slots", date, e);
            StoredSlots::default()
        });

        Ok(StoredFeedingState {
            date,
            slots,
            updated_at: row.try_get("updated_at")?,
            owner: row.try_get("owner")?,
        })
    }
}

#[async_trait]
impl FeedingStateStorage for SqliteStateRepository {
    async fn get_state(&self, date: &str) -> Result<Option<StoredFeedingState>> {
        let row = sqlx::query(
            r#"
            SELECT date, slots, updated_at, owner
            FROM feeding_states
            WHERE date = ?
            "#,
        )
        .bind(date)
        .fetch_optional(self.db.pool())
        .await
        .map_err(StoreError::from)?;

        row.as_ref().map(Self::state_from_row).transpose()
    }

    async fn latest_state(&self) -> Result<Option<StoredFeedingState>> {
        let row = sqlx::query(
            r#"
            SELECT date, slots, updated_at, owner
            FROM feeding_states
            ORDER BY date DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(self.db.pool())
        .await
        .map_err(StoreError::from)?;

        row.as_ref().map(Self::state_from_row).transpose()
    }

    async fn upsert_state(&self, state: &StoredFeedingState) -> Result<()> {
        let slots_json = serde_json::to_string(&state.slots)?;

        sqlx::query(
            r#"
            INSERT INTO feeding_states (date, slots, updated_at, owner)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(date) DO UPDATE SET
                slots = excluded.slots,
                updated_at = excluded.updated_at,
                owner = excluded.owner
            "#,
        )
        .bind(&state.date)
        .bind(slots_json)
        .bind(&state.updated_at)
        .bind(&state.owner)
        .execute(self.db.pool())
        .await
        .map_err(StoreError::from)?;
        Ok(())
    }
}
