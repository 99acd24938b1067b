use std::sync::Mutex;

use deen_core::model::{Badge, QuestId};

/// Notification published by the progress and quest engines.
///
/// Dispatch is synchronous and fire-and-forget: listeners registered at
/// emit time run on the emitting task, nothing is queued or retried.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    XpGained {
        amount: u32,
        total: u32,
        reason: String,
    },
    StreakUpdated {
        current: u32,
        best: u32,
    },
    BadgeEarned(Badge),
    QuestCompleted {
        quest_id: QuestId,
    },
}

type Listener = Box<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Explicit observer registry the engines publish to.
///
/// Replaces an ambient process-wide bus: whoever wants notifications
/// registers here, and the registration is visible in the wiring.
#[derive(Default)]
pub struct EventHub {
    listeners: Mutex<Vec<Listener>>,
}

impl EventHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every subsequent event.
    pub fn subscribe(&self, listener: impl Fn(&ProgressEvent) + Send + Sync + 'static) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(Box::new(listener));
        }
    }

    /// Deliver `event` to every registered listener, in registration order.
    pub fn emit(&self, event: &ProgressEvent) {
        if let Ok(listeners) = self.listeners.lock() {
            for listener in listeners.iter() {
                listener(event);
            }
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
