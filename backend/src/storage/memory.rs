//! # In-Memory Storage
//!
//! Process-local storage for both feeding state and history. Used when no
//! durable backend is configured and as the default fake in tests. Clones
//! share the same underlying data.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::models::{StoredFeedingRecord, StoredFeedingState};
use crate::storage::traits::{FeedingHistoryStorage, FeedingStateStorage};

#[derive(Clone, Default)]
pub struct MemoryStorage {
    /// Keyed by date; BTreeMap ordering gives the latest date for free
    states: Arc<RwLock<BTreeMap<String, StoredFeedingState>>>,
    /// Newest first
    history: Arc<RwLock<Vec<StoredFeedingRecord>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedingStateStorage for MemoryStorage {
    async fn get_state(&self, date: &str) -> Result<Option<StoredFeedingState>> {
        Ok(self.states.read().await.get(date).cloned())
    }

    async fn latest_state(&self) -> Result<Option<StoredFeedingState>> {
        Ok(self.states.read().await.values().next_back().cloned())
    }

    async fn upsert_state(&self, state: &StoredFeedingState) -> Result<()> {
        debug!("Upserting in-memory state for {}", state.date);
        self.states.write().await.insert(state.date.clone(), state.clone());
        Ok(())
    }
}

#[async_trait]
impl FeedingHistoryStorage for MemoryStorage {
    async fn list_records(&self, limit: Option<u32>) -> Result<Vec<StoredFeedingRecord>> {
        let history = self.history.read().await;
        let take = limit.map(|l| l as usize).unwrap_or(history.len());
        Ok(history.iter().take(take).cloned().collect())
    }

    async fn insert_record(&self, record: &StoredFeedingRecord) -> Result<()> {
        self.history.write().await.insert(0, record.clone());
        Ok(())
    }

    async fn delete_record(&self, id: &str) -> Result<bool> {
        let mut history = self.history.write().await;
        match history.iter().position(|r| r.id == id) {
            Some(index) => {
                history.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
