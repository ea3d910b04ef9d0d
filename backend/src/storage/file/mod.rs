//! # File Storage
//!
//! A plain-file backend: one YAML file per day for feeding state and a single
//! CSV file for history, all under one data directory.

pub mod connection;
pub mod history_repository;
pub mod state_repository;

pub use connection::FileConnection;
pub use history_repository::FileHistoryRepository;
pub use state_repository::FileStateRepository;
