//! Rolling feeding history.
//!
//! Wraps a [`FeedingHistoryStorage`] backend with the history rules:
//! appends are idempotent on (slot, date, timestamp), the log is capped to a
//! fixed number of entries with the oldest evicted first, and an undo removes
//! only the newest entry for a slot and day.
//!
//! Nothing here fails. When the backend errors the log reports the last
//! collection it successfully read.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::change_feed::{ChangeEvent, ChangeFeed, HistoryChange};
use crate::domain::clock::Clock;
use crate::domain::models::{DateId, FeedingRecord, FeedingSlot, StoredFeedingRecord};
use crate::storage::FeedingHistoryStorage;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// A history record together with its storage id
#[derive(Debug, Clone)]
struct Entry {
    id: String,
    record: FeedingRecord,
}

#[derive(Clone)]
pub struct HistoryLog {
    storage: Arc<dyn FeedingHistoryStorage>,
    clock: Arc<dyn Clock>,
    feed: ChangeFeed,
    limit: usize,
    owner: Option<String>,
    /// Last collection read from storage, newest first
    known: Arc<RwLock<Vec<Entry>>>,
}

impl HistoryLog {
    pub fn new(
        storage: Arc<dyn FeedingHistoryStorage>,
        clock: Arc<dyn Clock>,
        feed: ChangeFeed,
        limit: usize,
        owner: Option<String>,
    ) -> Self {
        Self {
            storage,
            clock,
            feed,
            limit: limit.max(1),
            owner,
            known: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Current history, newest first, at most `limit` records
    pub async fn list(&self) -> Vec<FeedingRecord> {
        match self.fetch(Some(self.limit)).await {
            Ok(entries) => self.remember(entries).await,
            Err(e) => {
                error!("History store unavailable, serving last known history: {:#}", e);
                self.known_records().await
            }
        }
    }

    /// Records for one calendar day, newest first
    pub async fn records_for_date(&self, date: DateId) -> Vec<FeedingRecord> {
        self.list().await.into_iter().filter(|r| r.date == date).collect()
    }

    /// Add `record` unless a record with the same key is already present
    pub async fn append(&self, record: FeedingRecord) -> Vec<FeedingRecord> {
        let mut entries = match self.fetch(None).await {
            Ok(entries) => entries,
            Err(e) => {
                error!("History store unavailable, not appending {} {}: {:#}", record.slot, record.date, e);
                return self.known_records().await;
            }
        };

        if entries.iter().any(|entry| entry.record.same_key(&record)) {
            debug!("History already has {} {} at {}", record.slot, record.date, record.timestamp);
            return self.remember(entries).await;
        }

        let id = format!("history::{}", Uuid::new_v4());
        let row = StoredFeedingRecord::from_record(&record, id.clone(), self.clock.timestamp(), self.owner.clone());
        if let Err(e) = self.storage.insert_record(&row).await {
            error!("Failed to append history record for {} {}: {:#}", record.slot, record.date, e);
            return self.known_records().await;
        }
        info!("Recorded {} feeding for {} by {}", record.slot, record.date, record.caretaker);
        self.feed
            .publish(ChangeEvent::HistoryChanged(HistoryChange::Inserted(record.clone())));

        entries.insert(0, Entry { id, record });
        self.evict_overflow(&mut entries).await;
        self.remember(entries).await
    }

    /// Remove the single newest record for `slot` on `date`
    pub async fn remove_most_recent(&self, slot: FeedingSlot, date: DateId) -> Vec<FeedingRecord> {
        let mut entries = match self.fetch(None).await {
            Ok(entries) => entries,
            Err(e) => {
                error!("History store unavailable, not removing {} {}: {:#}", slot, date, e);
                return self.known_records().await;
            }
        };

        let index = match entries
            .iter()
            .position(|entry| entry.record.slot == slot && entry.record.date == date)
        {
            Some(index) => index,
            None => {
                debug!("No history record for {} {} to remove", slot, date);
                return self.remember(entries).await;
            }
        };

        match self.storage.delete_record(&entries[index].id).await {
            Ok(_) => {
                let removed = entries.remove(index);
                info!("Removed {} feeding for {} by {}", slot, date, removed.record.caretaker);
                self.feed
                    .publish(ChangeEvent::HistoryChanged(HistoryChange::Removed(removed.record)));
                self.remember(entries).await
            }
            Err(e) => {
                error!("Failed to remove history record for {} {}: {:#}", slot, date, e);
                self.known_records().await
            }
        }
    }

    /// Read the newest `limit` stored entries (all when `None`), dropping
    /// rows that cannot be decoded
    async fn fetch(&self, limit: Option<usize>) -> anyhow::Result<Vec<Entry>> {
        let limit = limit.map(|l| u32::try_from(l).unwrap_or(u32::MAX));
        let rows = self.storage.list_records(limit).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match row.to_record() {
                Ok(record) => Some(Entry { id: row.id, record }),
                Err(e) => {
                    warn!("Ignoring history row: {}", e);
                    None
                }
            })
            .collect())
    }

    /// Delete the oldest entries past the limit
    async fn evict_overflow(&self, entries: &mut Vec<Entry>) {
        while entries.len() > self.limit {
            let Some(oldest) = entries.pop() else { break };
            match self.storage.delete_record(&oldest.id).await {
                Ok(_) => debug!("Evicted history record {} {}", oldest.record.slot, oldest.record.date),
                Err(e) => warn!("Failed to evict history record {}: {:#}", oldest.id, e),
            }
        }
    }

    async fn remember(&self, mut entries: Vec<Entry>) -> Vec<FeedingRecord> {
        entries.truncate(self.limit);
        let records = entries.iter().map(|e| e.record.clone()).collect();
        *self.known.write().await = entries;
        records
    }

    async fn known_records(&self) -> Vec<FeedingRecord> {
        self.known.read().await.iter().map(|e| e.record.clone()).collect()
    }
}
