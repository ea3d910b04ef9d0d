//! # Domain Module
//!
//! Business logic for the feeding tracker.
//!
//! Everything here runs against the storage traits and a [`Clock`], so the
//! same rules apply whichever backend is configured and tests can pin the
//! time of day.
//!
//! ## Module Organization
//!
//! - **models**: feeding slots, statuses, day state, history records, and the
//!   persisted row shapes
//! - **clock**: local time, day identifiers and completion timestamps
//! - **reset_policy**: when a previous day's state gets cleared
//! - **history_log**: capped, idempotent feeding history
//! - **feeding_service**: loading, saving, marking and resetting the day's state
//! - **change_feed**: in-process notifications after successful writes
//!
//! ## Business Rules
//!
//! - A day has exactly two slots, morning and evening
//! - A slot is done exactly when it has a caretaker and a timestamp
//! - A previous day's state stays visible until the local reset hour
//! - History is the source of truth for which slots were completed
//! - A manual reset throws away the day's progress without archiving it

pub mod change_feed;
pub mod clock;
pub mod feeding_service;
pub mod history_log;
pub mod models;
pub mod reset_policy;

pub use change_feed::{ChangeEvent, ChangeFeed, Channel, HistoryChange, Subscription, SubscriptionHandle};
pub use clock::{Clock, ManualClock, SystemClock};
pub use feeding_service::FeedingService;
pub use history_log::{HistoryLog, DEFAULT_HISTORY_LIMIT};
pub use models::FeedingError;
pub use reset_policy::{ResetPolicy, DEFAULT_RESET_HOUR};
