//! Feeding service: reconciles stored state, history and the daily reset.
//!
//! The state row for a day can lag behind history (a write that failed, a
//! second device that only reached the history store). History is treated as
//! the source of truth for which slots are done: on every load the records for
//! the working day are folded back into the state, and the repaired state is
//! written through.
//!
//! None of the reconciliation path fails. Storage errors are logged and the
//! caller gets the best state that can be built from what was readable, down
//! to a blank state for today.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::TrackerConfig;
use crate::domain::change_feed::{ChangeEvent, ChangeFeed};
use crate::domain::clock::Clock;
use crate::domain::history_log::HistoryLog;
use crate::domain::models::{
    DateId, FeedingError, FeedingRecord, FeedingSlot, FeedingState, FeedingStatus, StoredFeedingState,
};
use crate::domain::reset_policy::ResetPolicy;
use crate::storage::{FeedingStateStorage, StorageBackend};

#[derive(Clone)]
pub struct FeedingService {
    state_storage: Arc<dyn FeedingStateStorage>,
    history: HistoryLog,
    clock: Arc<dyn Clock>,
    policy: ResetPolicy,
    feed: ChangeFeed,
    owner: Option<String>,
    caretakers: Arc<Vec<String>>,
}

impl FeedingService {
    pub fn new(backend: StorageBackend, clock: Arc<dyn Clock>, config: &TrackerConfig) -> Self {
        let feed = ChangeFeed::default();
        let history = HistoryLog::new(
            backend.history,
            clock.clone(),
            feed.clone(),
            config.history_limit,
            config.owner.clone(),
        );
        Self {
            state_storage: backend.state,
            history,
            clock,
            policy: ResetPolicy::new(config.reset_hour),
            feed,
            owner: config.owner.clone(),
            caretakers: Arc::new(config.caretakers.clone()),
        }
    }

    pub fn reset_hour(&self) -> u32 {
        self.policy.reset_hour()
    }

    pub fn caretakers(&self) -> &[String] {
        &self.caretakers
    }

    pub fn change_feed(&self) -> &ChangeFeed {
        &self.feed
    }

    /// Current history, newest first
    pub async fn history(&self) -> Vec<FeedingRecord> {
        self.history.list().await
    }

    /// Load the state to show right now.
    ///
    /// Picks today's row, else the most recent stored row, else a blank day.
    /// Yesterday's row is archived and replaced by a blank state once the
    /// reset hour has passed, an older row right away. Otherwise history for
    /// the row's day is merged in and written back if it changed anything.
    pub async fn load_state(&self) -> FeedingState {
        let today = self.clock.today_id();
        let candidate = self
            .read_candidate(today)
            .await
            .unwrap_or_else(|| FeedingState::blank(today));

        // Only yesterday's state may linger until the reset hour; anything
        // older is cleared at any hour
        let skipped_days = candidate.date() < today.pred();
        if skipped_days || self.policy.should_reset(candidate.date(), self.clock.as_ref()) {
            info!(
                "Daily reset: archiving {} and starting {} (reset hour {})",
                candidate.date(),
                today,
                self.policy.reset_hour()
            );
            self.archive(&candidate).await;
            return FeedingState::blank(today);
        }

        let merged = self.merge_history(&candidate).await;
        if merged != candidate {
            info!("History disagrees with stored state for {}, repairing", merged.date());
            self.save_state(&merged).await;
        }
        merged
    }

    /// Persist `state`; failures are logged and otherwise ignored
    pub async fn save_state(&self, state: &FeedingState) {
        let row = StoredFeedingState::from_state(state, self.clock.timestamp(), self.owner.clone());
        match self.state_storage.upsert_state(&row).await {
            Ok(()) => {
                debug!("Saved feeding state for {}", state.date());
                self.feed.publish(ChangeEvent::StateChanged(state.clone()));
            }
            Err(e) => error!("Failed to save feeding state for {}: {:#}", state.date(), e),
        }
    }

    /// Mark `slot` done by `caretaker` now, then save and record it
    pub async fn mark_slot(
        &self,
        state: &FeedingState,
        slot: FeedingSlot,
        caretaker: &str,
    ) -> Result<FeedingState, FeedingError> {
        let caretaker = caretaker.trim();
        if caretaker.is_empty() {
            return Err(FeedingError::EmptyCaretaker);
        }

        let timestamp = self.clock.timestamp();
        let mut updated = state.clone();
        updated.set_slot(FeedingStatus::done(slot, caretaker, timestamp.clone()));
        info!("Marking {} feeding on {} done by {}", slot, updated.date(), caretaker);

        self.save_state(&updated).await;
        self.history
            .append(FeedingRecord {
                slot,
                caretaker: caretaker.to_string(),
                date: updated.date(),
                timestamp,
            })
            .await;
        Ok(updated)
    }

    /// Set `slot` back to pending and drop its newest history record
    pub async fn unmark_slot(&self, state: &FeedingState, slot: FeedingSlot) -> FeedingState {
        let mut updated = state.clone();
        updated.set_slot(FeedingStatus::pending(slot));
        info!("Unmarking {} feeding on {}", slot, updated.date());

        self.save_state(&updated).await;
        self.history.remove_most_recent(slot, updated.date()).await;
        updated
    }

    /// Start today over with both slots pending. Current progress is
    /// discarded, not archived.
    pub async fn manual_reset(&self) -> FeedingState {
        let blank = FeedingState::blank(self.clock.today_id());
        info!("Manual reset to a blank state for {}", blank.date());
        self.save_state(&blank).await;
        blank
    }

    async fn read_candidate(&self, today: DateId) -> Option<FeedingState> {
        match self.state_storage.get_state(&today.to_string()).await {
            Ok(Some(row)) => {
                if let Some(state) = decode(row) {
                    return Some(state);
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to read feeding state for {}: {:#}", today, e),
        }

        match self.state_storage.latest_state().await {
            Ok(row) => row.and_then(decode),
            Err(e) => {
                warn!("Failed to read latest feeding state: {:#}", e);
                None
            }
        }
    }

    async fn archive(&self, state: &FeedingState) {
        for record in state.completed_records() {
            self.history.append(record).await;
        }
    }

    /// Overlay history for the state's day, oldest first so the newest record wins
    async fn merge_history(&self, state: &FeedingState) -> FeedingState {
        let records = self.history.records_for_date(state.date()).await;
        let mut merged = state.clone();
        for record in records.iter().rev() {
            merged.set_slot(record.to_status());
        }
        merged
    }
}

fn decode(row: StoredFeedingState) -> Option<FeedingState> {
    match row.to_state() {
        Ok(state) => Some(state),
        Err(e) => {
            warn!("Ignoring stored feeding state: {}", e);
            None
        }
    }
}
