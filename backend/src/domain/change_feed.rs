//! In-process change notifications.
//!
//! Every successful write to state or history is published here so other
//! parts of the process (an open UI session, a push bridge) can re-render.
//! Delivery is advisory: a slow subscriber that lags behind skips the events
//! it missed, and a subscriber may see an event for a write it made itself.
//! Applying an event twice must be harmless.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::models::{DateId, FeedingRecord, FeedingState};

pub const DEFAULT_FEED_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryChange {
    Inserted(FeedingRecord),
    Removed(FeedingRecord),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// The full state row after an insert or update
    StateChanged(FeedingState),
    HistoryChanged(HistoryChange),
}

/// What a subscriber listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// State changes for one calendar day
    State { date: DateId },
    /// Every history change
    History,
}

impl Channel {
    pub fn accepts(&self, event: &ChangeEvent) -> bool {
        match (self, event) {
            (Channel::State { date }, ChangeEvent::StateChanged(state)) => state.date() == *date,
            (Channel::History, ChangeEvent::HistoryChanged(_)) => true,
            _ => false,
        }
    }
}

#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event; returns how many subscribers were listening
    pub fn publish(&self, event: ChangeEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!("No change feed subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self, channel: Channel) -> Subscription {
        Subscription {
            channel,
            receiver: self.sender.subscribe(),
        }
    }

    /// Run `callback` for every matching event on a background task until the
    /// returned handle is cancelled or dropped. Must be called inside a Tokio
    /// runtime.
    pub fn register<F>(&self, channel: Channel, mut callback: F) -> SubscriptionHandle
    where
        F: FnMut(ChangeEvent) + Send + 'static,
    {
        let mut subscription = self.subscribe(channel);
        let task = tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                callback(event);
            }
        });
        SubscriptionHandle { task }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

/// A pull-based subscription to one channel
pub struct Subscription {
    channel: Channel,
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    /// Wait for the next matching event; `None` once the feed is gone
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.channel.accepts(&event) => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Change feed subscriber lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// The next matching event if one is already queued
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.channel.accepts(&event) => return Some(event),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Change feed subscriber lagged, skipped {} events", skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

/// Handle to a callback registered with [`ChangeFeed::register`]
pub struct SubscriptionHandle {
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    pub fn cancel(self) {
        self.task.abort();
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
