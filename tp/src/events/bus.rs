//! Event Bus - pub/sub for pipeline progress
//!
//! Backed by a tokio broadcast channel: every subscriber sees every event
//! emitted after it subscribed.

use tokio::sync::broadcast;
use tracing::debug;

use super::types::{Stage, StageEvent, StageStatus};

/// Default channel capacity (events)
///
/// A run emits fewer than a dozen events; this leaves room for many
/// concurrent runs before slow subscribers start lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1_000;

pub struct EventBus {
    tx: broadcast::Sender<StageEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "EventBus::new: creating event bus");
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Emit an event to all subscribers
    ///
    /// Fire-and-forget: with no subscribers the event is dropped.
    pub fn emit(&self, event: StageEvent) {
        debug!(run_id = %event.run_id, stage = %event.stage, status = %event.status, "EventBus::emit");
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StageEvent> {
        debug!("EventBus::subscribe: new subscriber");
        self.tx.subscribe()
    }

    /// Emitter bound to one run
    pub fn emitter_for(&self, run_id: impl Into<String>) -> EventEmitter {
        let run_id = run_id.into();
        debug!(%run_id, "EventBus::emitter_for: creating emitter");
        EventEmitter {
            tx: Some(self.tx.clone()),
            run_id,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Handle for emitting events with a pre-set run id
///
/// A detached emitter (no bus configured) accepts every call and drops it.
#[derive(Clone)]
pub struct EventEmitter {
    tx: Option<broadcast::Sender<StageEvent>>,
    run_id: String,
}

impl EventEmitter {
    pub fn detached(run_id: impl Into<String>) -> Self {
        Self {
            tx: None,
            run_id: run_id.into(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn emit(&self, stage: Stage, status: StageStatus) {
        if let Some(tx) = &self.tx {
            debug!(run_id = %self.run_id, %stage, %status, "EventEmitter::emit");
            let _ = tx.send(StageEvent {
                run_id: self.run_id.clone(),
                stage,
                status,
            });
        }
    }

    // === Convenience methods ===

    pub fn started(&self, stage: Stage) {
        self.emit(stage, StageStatus::Started);
    }

    pub fn completed(&self, stage: Stage) {
        self.emit(stage, StageStatus::Completed);
    }

    pub fn fallback(&self, stage: Stage, reason: impl Into<String>) {
        self.emit(stage, StageStatus::Fallback { reason: reason.into() });
    }

    pub fn needs_more_info(&self) {
        self.emit(Stage::Parse, StageStatus::NeedsMoreInfo);
    }
}
