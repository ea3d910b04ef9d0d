//! # Storage Module
//!
//! Handles all data persistence for the feeding tracker.
//!
//! The domain layer only sees the [`FeedingStateStorage`] and
//! [`FeedingHistoryStorage`] traits; which backend sits behind them is decided
//! once, from configuration, when the backend starts.
//!
//! ## Backends
//!
//! - **memory**: process-local, lost on restart
//! - **file**: YAML state files plus a CSV history file in a data directory
//! - **sqlite**: a SQLite database through SQLx
//!
//! Backends report failures as errors. Turning those into degraded but valid
//! results (absent state, unchanged history) is the domain layer's job.

pub mod error;
pub mod file;
pub mod memory;
pub mod sqlite;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::config::StorageConfig;

pub use error::StoreError;
pub use file::{FileConnection, FileHistoryRepository, FileStateRepository};
pub use memory::MemoryStorage;
pub use sqlite::{DbConnection, SqliteHistoryRepository, SqliteStateRepository};
pub use traits::{FeedingHistoryStorage, FeedingStateStorage};

/// The pair of stores the domain layer runs against
#[derive(Clone)]
pub struct StorageBackend {
    pub state: Arc<dyn FeedingStateStorage>,
    pub history: Arc<dyn FeedingHistoryStorage>,
}

impl StorageBackend {
    pub fn new(state: Arc<dyn FeedingStateStorage>, history: Arc<dyn FeedingHistoryStorage>) -> Self {
        Self { state, history }
    }

    pub fn memory() -> Self {
        let storage = MemoryStorage::new();
        Self::new(Arc::new(storage.clone()), Arc::new(storage))
    }

    pub fn file(connection: FileConnection) -> Self {
        Self::new(
            Arc::new(FileStateRepository::new(connection.clone())),
            Arc::new(FileHistoryRepository::new(connection)),
        )
    }

    pub fn sqlite(db: DbConnection) -> Self {
        Self::new(
            Arc::new(SqliteStateRepository::new(db.clone())),
            Arc::new(SqliteHistoryRepository::new(db)),
        )
    }

    /// Open the backend described by `config`
    pub async fn open(config: &StorageConfig) -> Result<Self> {
        match config {
            StorageConfig::Memory => {
                info!("Using in-memory storage; data will not survive a restart");
                Ok(Self::memory())
            }
            StorageConfig::File { directory } => {
                info!("Using file storage in {}", directory.display());
                Ok(Self::file(FileConnection::new(directory)?))
            }
            StorageConfig::Sqlite { url } => {
                info!("Using SQLite storage at {}", url);
                Ok(Self::sqlite(DbConnection::new(url).await?))
            }
        }
    }
}
