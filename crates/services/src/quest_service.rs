use std::sync::Arc;

use tracing::warn;

use deen_core::Clock;
use deen_core::model::{Quest, QuestId, completion_key, quest_of_the_day};
use storage::QuestLog;
use storage::repository::Storage;

use crate::events::{EventHub, ProgressEvent};

/// The quest engine: deterministic quest-of-the-day plus per-day
/// completion marking.
///
/// Selection needs no persistence at all; only completions are stored,
/// keyed by `questId-date` so the same quest on a later date is
/// independently completable.
pub struct QuestService {
    clock: Clock,
    quests: Vec<Quest>,
    log: QuestLog,
    hub: Arc<EventHub>,
    completed: Vec<String>,
}

impl QuestService {
    /// Load completion state for the given quest list.
    ///
    /// An unreadable log starts empty rather than failing.
    pub async fn load(
        clock: Clock,
        quests: Vec<Quest>,
        storage: &Storage,
        hub: Arc<EventHub>,
    ) -> Self {
        let log = storage.quests.clone();
        let completed = match log.completed_keys().await {
            Ok(Some(keys)) => keys,
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(%err, "quest log unreadable, starting empty");
                Vec::new()
            }
        };
        Self {
            clock,
            quests,
            log,
            hub,
            completed,
        }
    }

    #[must_use]
    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    /// Today's quest; every device holding this list picks the same one.
    #[must_use]
    pub fn todays_quest(&self) -> Option<&Quest> {
        quest_of_the_day(&self.quests, self.clock.today())
    }

    /// Whether `quest_id` has already been marked done today.
    #[must_use]
    pub fn is_completed_today(&self, quest_id: &QuestId) -> bool {
        let key = completion_key(quest_id, self.clock.today());
        self.completed.iter().any(|k| *k == key)
    }

    /// Mark `quest_id` done for today.
    ///
    /// Idempotent: returns false when it was already marked, and only the
    /// first marking persists and emits `quest-completed`.
    pub async fn mark_completed(&mut self, quest_id: &QuestId) -> bool {
        if self.is_completed_today(quest_id) {
            return false;
        }
        self.completed
            .push(completion_key(quest_id, self.clock.today()));
        if let Err(err) = self.log.save_completed_keys(&self.completed).await {
            warn!(%err, "failed to persist quest completion");
        }
        self.hub.emit(&ProgressEvent::QuestCompleted {
            quest_id: quest_id.clone(),
        });
        true
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use deen_core::time::fixed_clock;

    fn quest_list() -> Vec<Quest> {
        (0..5)
            .map(|i| Quest {
                id: QuestId::new(format!("quest-{i:02}")),
                text: format!("Challenge number {i}"),
            })
            .collect()
    }

    #[tokio::test]
    async fn two_engines_agree_on_todays_quest() {
        let storage_a = Storage::in_memory();
        let storage_b = Storage::in_memory();

        let a = QuestService::load(
            fixed_clock(),
            quest_list(),
            &storage_a,
            Arc::new(EventHub::new()),
        )
        .await;
        let b = QuestService::load(
            fixed_clock(),
            quest_list(),
            &storage_b,
            Arc::new(EventHub::new()),
        )
        .await;

        let quest_a = a.todays_quest().expect("non-empty list");
        let quest_b = b.todays_quest().expect("non-empty list");
        assert_eq!(quest_a.id, quest_b.id);
        // repeated calls are stable too
        assert_eq!(a.todays_quest().unwrap().id, quest_a.id);
    }

    #[tokio::test]
    async fn marking_is_idempotent_and_persists_once() {
        let storage = Storage::in_memory();
        let mut service = QuestService::load(
            fixed_clock(),
            quest_list(),
            &storage,
            Arc::new(EventHub::new()),
        )
        .await;

        let id = QuestId::new("quest-01");
        assert!(!service.is_completed_today(&id));
        assert!(service.mark_completed(&id).await);
        assert!(service.is_completed_today(&id));
        assert!(!service.mark_completed(&id).await);

        let stored = storage.quests.completed_keys().await.unwrap().unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].starts_with("quest-01-"));
    }

    #[tokio::test]
    async fn completion_is_per_day() {
        let storage = Storage::in_memory();
        let hub = Arc::new(EventHub::new());
        let id = QuestId::new("quest-02");

        let mut today =
            QuestService::load(fixed_clock(), quest_list(), &storage, Arc::clone(&hub)).await;
        assert!(today.mark_completed(&id).await);

        let mut tomorrow_clock = fixed_clock();
        tomorrow_clock.advance(Duration::days(1));
        let mut tomorrow =
            QuestService::load(tomorrow_clock, quest_list(), &storage, hub).await;
        assert!(!tomorrow.is_completed_today(&id));
        assert!(tomorrow.mark_completed(&id).await);

        let stored = storage.quests.completed_keys().await.unwrap().unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn empty_quest_list_has_no_daily_quest() {
        let storage = Storage::in_memory();
        let service = QuestService::load(
            fixed_clock(),
            Vec::new(),
            &storage,
            Arc::new(EventHub::new()),
        )
        .await;
        assert!(service.todays_quest().is_none());
    }
}
