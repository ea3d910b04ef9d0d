//! Test utilities shared by storage and domain tests
//!
//! `FailingStorage` stands in for a datastore that is completely
//! unreachable; `FlakyStorage` wraps the in-memory store and can be switched
//! offline mid-test.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::error::StoreError;
use super::memory::MemoryStorage;
use super::traits::{FeedingHistoryStorage, FeedingStateStorage};
use super::StorageBackend;
use crate::domain::models::{StoredFeedingRecord, StoredFeedingState};

/// Every call fails
#[derive(Clone, Default)]
pub struct FailingStorage;

impl FailingStorage {
    pub fn backend() -> StorageBackend {
        StorageBackend::new(Arc::new(FailingStorage), Arc::new(FailingStorage))
    }
}

fn unavailable() -> anyhow::Error {
    StoreError::Unavailable("connection refused".to_string()).into()
}

#[async_trait]
impl FeedingStateStorage for FailingStorage {
    async fn get_state(&self, _date: &str) -> Result<Option<StoredFeedingState>> {
        Err(unavailable())
    }

    async fn latest_state(&self) -> Result<Option<StoredFeedingState>> {
        Err(unavailable())
    }

    async fn upsert_state(&self, _state: &StoredFeedingState) -> Result<()> {
        Err(unavailable())
    }
}

#[async_trait]
impl FeedingHistoryStorage for FailingStorage {
    async fn list_records(&self, _limit: Option<u32>) -> Result<Vec<StoredFeedingRecord>> {
        Err(unavailable())
    }

    async fn insert_record(&self, _record: &StoredFeedingRecord) -> Result<()> {
        Err(unavailable())
    }

    async fn delete_record(&self, _id: &str) -> Result<bool> {
        Err(unavailable())
    }
}

/// In-memory storage that can be taken offline
#[derive(Clone, Default)]
pub struct FlakyStorage {
    pub inner: MemoryStorage,
    offline: Arc<AtomicBool>,
}

impl FlakyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(&self) -> StorageBackend {
        StorageBackend::new(Arc::new(self.clone()), Arc::new(self.clone()))
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl FeedingStateStorage for FlakyStorage {
    async fn get_state(&self, date: &str) -> Result<Option<StoredFeedingState>> {
        self.check()?;
        self.inner.get_state(date).await
    }

    async fn latest_state(&self) -> Result<Option<StoredFeedingState>> {
        self.check()?;
        self.inner.latest_state().await
    }

    async fn upsert_state(&self, state: &StoredFeedingState) -> Result<()> {
        self.check()?;
        self.inner.upsert_state(state).await
    }
}

#[async_trait]
impl FeedingHistoryStorage for FlakyStorage {
    async fn list_records(&self, limit: Option<u32>) -> Result<Vec<StoredFeedingRecord>> {
        self.check()?;
        self.inner.list_records(limit).await
    }

    async fn insert_record(&self, record: &StoredFeedingRecord) -> Result<()> {
        self.check()?;
        self.inner.insert_record(record).await
    }

    async fn delete_record(&self, id: &str) -> Result<bool> {
        self.check()?;
        self.inner.delete_record(id).await
    }
}
