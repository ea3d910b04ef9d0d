//! # IO Module
//!
//! Adapter layer between HTTP clients and the feeding domain.
//!
//! Requests are decoded into shared DTOs, mapped onto domain types, handed
//! to the [`FeedingService`](crate::domain::FeedingService), and the result
//! mapped back. No business rules live here.
//!
//! ## Current Implementation
//!
//! - **Web Framework**: Axum
//! - **Serialization**: Serde JSON, with DTOs from the `shared` crate
//! - **State Management**: Axum `State` extractor carrying [`AppState`](crate::AppState)
//! - **Error Handling**: caller mistakes become `400 Bad Request`

pub mod rest;

pub use rest::*;
