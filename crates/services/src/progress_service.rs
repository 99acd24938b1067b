use std::sync::Arc;

use tracing::warn;

use deen_core::Clock;
use deen_core::model::{
    Badge, LessonId, ProgressRecord, Streak, StreakUpdate, UnlockContext, newly_unlocked,
    passing_threshold,
};
use deen_core::xp;
use storage::repository::Storage;
use storage::{ProgressStore, ScoreBook};

use crate::events::{EventHub, ProgressEvent};

/// Aggregate view for the stats panels. Pure read, no side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressStats {
    pub completed_count: usize,
    pub xp: u32,
    pub level: u32,
    pub streak_current: u32,
    pub streak_best: u32,
    pub badges: Vec<Badge>,
}

/// What one `complete_lesson` call did.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOutcome {
    pub newly_completed: bool,
    pub passed: bool,
    pub perfect: bool,
    pub streak: StreakUpdate,
    pub new_badges: Vec<Badge>,
}

/// The progress engine: owns the in-memory [`ProgressRecord`] and is the
/// sole writer of the progress keys.
///
/// Persistence is best-effort. A failing store is logged and the session
/// continues on in-memory state, which then does not survive a restart;
/// no storage error ever reaches the caller of a mutation.
pub struct ProgressService {
    clock: Clock,
    store: ProgressStore,
    scores: ScoreBook,
    hub: Arc<EventHub>,
    data: ProgressRecord,
}

impl ProgressService {
    /// Load the record from storage, field by field.
    ///
    /// A field that is absent, malformed, or unreadable falls back to its
    /// zero/empty default without affecting the others, so one corrupt
    /// entry never blocks the load.
    pub async fn load(clock: Clock, storage: &Storage, hub: Arc<EventHub>) -> Self {
        let store = storage.progress.clone();
        let scores = storage.scores.clone();

        let completed_lessons = match store.completed_lessons().await {
            Ok(Some(lessons)) => lessons,
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(%err, "completed lessons unreadable, starting empty");
                Vec::new()
            }
        };
        let total_xp = match store.xp().await {
            Ok(Some(value)) => value,
            Ok(None) => 0,
            Err(err) => {
                warn!(%err, "xp unreadable, starting at zero");
                0
            }
        };
        let streak = match store.streak().await {
            Ok(Some(streak)) => streak,
            Ok(None) => Streak::new(),
            Err(err) => {
                warn!(%err, "streak unreadable, starting fresh");
                Streak::new()
            }
        };
        let badges = match store.badges().await {
            Ok(Some(badges)) => badges,
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(%err, "badges unreadable, starting empty");
                Vec::new()
            }
        };
        let last_activity_date = match store.last_activity_date().await {
            Ok(date) => date,
            Err(err) => {
                warn!(%err, "activity date unreadable, dropping it");
                None
            }
        };

        let data = ProgressRecord::from_persisted(
            completed_lessons,
            total_xp,
            streak,
            badges,
            last_activity_date,
        );

        Self {
            clock,
            store,
            scores,
            hub,
            data,
        }
    }

    /// Add XP, persist, and emit `xp-gained`.
    ///
    /// `amount` is expected to be positive; the total has no upper bound.
    pub async fn add_xp(&mut self, amount: u32, reason: &str) -> u32 {
        let total = self.data.add_xp(amount);
        self.persist().await;
        self.hub.emit(&ProgressEvent::XpGained {
            amount,
            total,
            reason: reason.to_owned(),
        });
        total
    }

    /// Record a finished quiz attempt for `lesson_id`.
    ///
    /// Steps, in order: first-completion XP (idempotent), pass bonus and
    /// perfect bonus (re-applied on retakes), streak update, badge
    /// unlocks, then a full-record persist.
    pub async fn complete_lesson(
        &mut self,
        lesson_id: &LessonId,
        score: u32,
        total: u32,
    ) -> CompletionOutcome {
        let newly_completed = self.data.mark_completed(lesson_id);
        if newly_completed {
            self.add_xp(xp::LESSON_COMPLETED, "Lesson completed").await;
        }

        let passed = score >= passing_threshold(total);
        if passed {
            self.add_xp(xp::QUIZ_PASSED, "Quiz passed").await;
        }

        let perfect = score == total;
        if perfect {
            self.add_xp(xp::PERFECT_SCORE, "Perfect score!").await;
        }

        let streak = self.update_streak().await;

        // Badge predicates read post-streak state; the two streak badges
        // depend on it.
        let new_badges = self.check_badges(lesson_id, passed).await;

        self.persist().await;

        CompletionOutcome {
            newly_completed,
            passed,
            perfect,
            streak,
            new_badges,
        }
    }

    /// Pure read of the aggregate stats.
    #[must_use]
    pub fn stats(&self) -> ProgressStats {
        ProgressStats {
            completed_count: self.data.completed_count(),
            xp: self.data.xp(),
            level: self.data.level(),
            streak_current: self.data.streak().current(),
            streak_best: self.data.streak().best(),
            badges: self.data.badges().to_vec(),
        }
    }

    #[must_use]
    pub fn record(&self) -> &ProgressRecord {
        &self.data
    }

    async fn update_streak(&mut self) -> StreakUpdate {
        let today = self.clock.today();
        let update = self.data.observe_day(today);
        match update {
            StreakUpdate::AlreadyCounted => {}
            StreakUpdate::Extended { length } => {
                self.add_xp(xp::DAILY_STREAK, &format!("{length}-day streak!"))
                    .await;
                self.emit_streak();
            }
            StreakUpdate::Restarted => self.emit_streak(),
        }
        update
    }

    fn emit_streak(&self) {
        let streak = self.data.streak();
        self.hub.emit(&ProgressEvent::StreakUpdated {
            current: streak.current(),
            best: streak.best(),
        });
    }

    async fn check_badges(&mut self, lesson_id: &LessonId, passed: bool) -> Vec<Badge> {
        let perfect_scores = match self.scores.perfect_count().await {
            Ok(count) => count,
            Err(err) => {
                warn!(%err, "lesson scores unreadable, counting none");
                0
            }
        };

        let ctx = UnlockContext {
            lesson_id,
            passed,
            completed_count: self.data.completed_count(),
            streak_current: self.data.streak().current(),
            perfect_scores,
        };
        let unlocked = newly_unlocked(self.data.badges(), &ctx, self.clock.now());
        for badge in &unlocked {
            if self.data.award_badge(badge.clone()) {
                self.hub.emit(&ProgressEvent::BadgeEarned(badge.clone()));
            }
        }
        unlocked
    }

    /// Write every field; a failed key is logged and skipped so the rest
    /// of the record still lands. Non-atomic across keys.
    async fn persist(&self) {
        if let Err(err) = self
            .store
            .save_completed_lessons(self.data.completed_lessons())
            .await
        {
            warn!(%err, "failed to persist completed lessons");
        }
        if let Err(err) = self.store.save_xp(self.data.xp()).await {
            warn!(%err, "failed to persist xp");
        }
        if let Err(err) = self.store.save_streak(self.data.streak()).await {
            warn!(%err, "failed to persist streak");
        }
        if let Err(err) = self.store.save_badges(self.data.badges()).await {
            warn!(%err, "failed to persist badges");
        }
        if let Some(date) = self.data.last_activity_date() {
            if let Err(err) = self.store.save_last_activity_date(date).await {
                warn!(%err, "failed to persist activity date");
            }
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use deen_core::model::QuizResult;
    use deen_core::time::{fixed_clock, fixed_now};

    async fn fresh_service(storage: &Storage) -> ProgressService {
        ProgressService::load(fixed_clock(), storage, Arc::new(EventHub::new())).await
    }

    #[tokio::test]
    async fn fresh_state_has_zero_defaults() {
        let storage = Storage::in_memory();
        let service = fresh_service(&storage).await;
        let stats = service.stats();

        assert_eq!(stats.completed_count, 0);
        assert_eq!(stats.xp, 0);
        assert_eq!(stats.level, 1);
        assert_eq!(stats.streak_current, 0);
        assert!(stats.badges.is_empty());
    }

    #[tokio::test]
    async fn corrupt_fields_fall_back_independently() {
        let storage = Storage::in_memory();
        storage.progress.save_xp(150).await.unwrap();
        storage
            .kv
            .set(storage::keys::STREAK, "{not json")
            .await
            .unwrap();
        storage
            .kv
            .set(storage::keys::BADGES, "also broken")
            .await
            .unwrap();

        let service = fresh_service(&storage).await;
        let stats = service.stats();

        // the readable field survived, the corrupt ones defaulted
        assert_eq!(stats.xp, 150);
        assert_eq!(stats.streak_current, 0);
        assert!(stats.badges.is_empty());
    }

    #[tokio::test]
    async fn first_completion_of_lesson_one_matches_the_reference_scenario() {
        let storage = Storage::in_memory();
        let mut service = fresh_service(&storage).await;

        let outcome = service
            .complete_lesson(&LessonId::new("lesson-01"), 8, 10)
            .await;

        assert!(outcome.newly_completed);
        assert!(outcome.passed);
        assert!(!outcome.perfect);
        assert_eq!(outcome.streak, StreakUpdate::Restarted);

        let stats = service.stats();
        assert_eq!(
            service.record().completed_lessons(),
            &[LessonId::new("lesson-01")]
        );
        assert_eq!(stats.xp, 100); // 50 completion + 50 pass, no perfect bonus
        assert_eq!(stats.streak_current, 1);
        assert!(service.record().has_badge("first-step"));
        assert!(service.record().has_badge("sincere-seeker"));
    }

    #[tokio::test]
    async fn repeat_completion_re_awards_pass_bonus_but_not_completion() {
        let storage = Storage::in_memory();
        let mut service = fresh_service(&storage).await;
        let lesson = LessonId::new("lesson-02");

        service.complete_lesson(&lesson, 10, 10).await;
        let xp_after_first = service.stats().xp;
        // 50 completion + 50 pass + 25 perfect
        assert_eq!(xp_after_first, 125);

        let outcome = service.complete_lesson(&lesson, 10, 10).await;
        assert!(!outcome.newly_completed);
        assert_eq!(outcome.streak, StreakUpdate::AlreadyCounted);

        let stats = service.stats();
        assert_eq!(stats.completed_count, 1);
        // pass + perfect re-applied, completion bonus not
        assert_eq!(stats.xp, xp_after_first + 50 + 25);
    }

    #[tokio::test]
    async fn failing_quiz_only_grants_completion_xp() {
        let storage = Storage::in_memory();
        let mut service = fresh_service(&storage).await;

        let outcome = service
            .complete_lesson(&LessonId::new("lesson-03"), 3, 10)
            .await;
        assert!(!outcome.passed);
        assert_eq!(service.stats().xp, 50);
        assert!(!service.record().has_badge("sincere-seeker"));
    }

    #[tokio::test]
    async fn badge_ids_never_duplicate() {
        let storage = Storage::in_memory();
        let mut service = fresh_service(&storage).await;

        for n in 1..=12 {
            let id = LessonId::new(format!("lesson-{n:02}"));
            service.complete_lesson(&id, 9, 10).await;
        }

        let badges = service.stats().badges;
        let mut ids: Vec<_> = badges.iter().map(|b| b.id.clone()).collect();
        ids.sort();
        let before = ids.len();
        ids.dedup();
        assert_eq!(ids.len(), before);
        assert!(service.record().has_badge("first-step"));
        assert!(service.record().has_badge("dedicated-learner"));
    }

    #[tokio::test]
    async fn quiz_master_counts_distinct_perfect_scores() {
        let storage = Storage::in_memory();
        let mut service = fresh_service(&storage).await;

        for n in 1..=3 {
            let id = LessonId::new(format!("lesson-{n:02}"));
            let result = QuizResult::new(5, 5, fixed_now()).unwrap();
            storage.scores.record(&id, &result).await.unwrap();
            service.complete_lesson(&id, 5, 5).await;
        }

        assert!(service.record().has_badge("quiz-master"));
    }

    #[tokio::test]
    async fn add_xp_reports_the_new_total() {
        let storage = Storage::in_memory();
        let mut service = fresh_service(&storage).await;
        assert_eq!(service.add_xp(30, "bonus").await, 30);
        assert_eq!(service.add_xp(20, "bonus").await, 50);
        assert_eq!(storage.progress.xp().await.unwrap(), Some(50));
    }

    #[tokio::test]
    async fn state_survives_a_reload() {
        let storage = Storage::in_memory();
        let mut service = fresh_service(&storage).await;
        service
            .complete_lesson(&LessonId::new("lesson-01"), 10, 10)
            .await;
        let stats_before = service.stats();

        let reloaded = fresh_service(&storage).await;
        assert_eq!(reloaded.stats(), stats_before);
    }
}
