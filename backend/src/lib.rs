//! # Feeding Tracker Backend
//!
//! Keeps a household's twice-daily pet feeding state in sync across
//! caretakers: which slots are done today, who did them, and a rolling
//! history of past feedings.
//!
//! ## Module Organization
//!
//! - **config**: YAML configuration with environment overrides
//! - **domain**: reset policy, history log and the reconciling feeding service
//! - **storage**: storage traits with in-memory, file and SQLite backends
//! - **io**: the axum REST API

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{http::Method, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::TrackerConfig;
use crate::domain::{FeedingService, SystemClock};
use crate::storage::StorageBackend;

/// Application state shared with every handler
#[derive(Clone)]
pub struct AppState {
    pub feeding_service: FeedingService,
}

impl AppState {
    pub fn new(feeding_service: FeedingService) -> Self {
        Self { feeding_service }
    }
}

/// Open storage and build the services described by `config`
pub async fn initialize_backend(config: &TrackerConfig) -> Result<AppState> {
    info!("Setting up storage");
    let backend = StorageBackend::open(&config.storage).await?;

    info!("Setting up domain model (reset hour {}, history limit {})", config.reset_hour, config.history_limit);
    let feeding_service = FeedingService::new(backend, Arc::new(SystemClock), config);

    Ok(AppState::new(feeding_service))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new().nest("/feeding", io::feeding_router());

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_initialize_backend_with_file_storage() {
        let temp_dir = TempDir::new().unwrap();
        let config = TrackerConfig {
            storage: StorageConfig::File {
                directory: temp_dir.path().to_path_buf(),
            },
            ..TrackerConfig::default()
        };

        let app_state = initialize_backend(&config).await.unwrap();

        assert_eq!(app_state.feeding_service.reset_hour(), 7);
        assert!(temp_dir.path().join("states").is_dir());
        let state = app_state.feeding_service.load_state().await;
        assert!(state.is_blank());
    }
}
