//! # REST API Interface Layer
//!
//! HTTP endpoints for the feeding tracker, mounted under `/api/feeding`:
//!
//! - `GET  /state`: reconciled state for today
//! - `PUT  /state`: replace a day's stored state
//! - `POST /slots/:slot/complete`: mark a slot done
//! - `DELETE /slots/:slot`: undo a slot
//! - `POST /reset`: manual reset
//! - `GET  /history`: newest-first history
//! - `GET  /caretakers`: caretaker roster

pub mod feeding_apis;
pub mod mappers;

pub use feeding_apis::router as feeding_router;
