//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.
//!
//! Backends persist rows verbatim. Idempotent appends, history capping and
//! "remove most recent" are domain rules and live in the domain layer, so
//! every backend only has to list, insert and delete.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::{StoredFeedingRecord, StoredFeedingState};

/// Trait defining the interface for daily feeding state storage
#[async_trait]
pub trait FeedingStateStorage: Send + Sync {
    /// Retrieve the state stored for a calendar day (`YYYY-MM-DD`)
    async fn get_state(&self, date: &str) -> Result<Option<StoredFeedingState>>;

    /// Retrieve the state with the greatest stored date
    async fn latest_state(&self) -> Result<Option<StoredFeedingState>>;

    /// Insert or fully replace the row keyed by `state.date` (last write wins)
    async fn upsert_state(&self, state: &StoredFeedingState) -> Result<()>;
}

/// Trait defining the interface for feeding history storage
#[async_trait]
pub trait FeedingHistoryStorage: Send + Sync {
    /// List history rows ordered newest-created first
    async fn list_records(&self, limit: Option<u32>) -> Result<Vec<StoredFeedingRecord>>;

    /// Store a new history row
    async fn insert_record(&self, record: &StoredFeedingRecord) -> Result<()>;

    /// Delete a single history row by id
    /// Returns true if the row was found and deleted, false otherwise
    async fn delete_record(&self, id: &str) -> Result<bool>;
}
