//! # SQLite Storage
//!
//! Feeding state and history in a SQLite database through SQLx. Each day's
//! state is one row keyed by date with the slots stored as a JSON object;
//! history is one row per completed feeding.

pub mod connection;
pub mod history_repository;
pub mod state_repository;

pub use connection::DbConnection;
pub use history_repository::SqliteHistoryRepository;
pub use state_repository::SqliteStateRepository;
