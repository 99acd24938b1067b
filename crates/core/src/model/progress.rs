use chrono::NaiveDate;

use crate::model::{Badge, LessonId, Streak, StreakUpdate, has_badge};
use crate::xp;

/// The single per-learner progress aggregate.
///
/// Mutated only by the progress service. Every mutator maintains the
/// aggregate's invariants: completed lessons are unique (insertion order
/// preserved), badge ids are unique and never removed, and the streak
/// keeps `best >= current`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressRecord {
    completed_lessons: Vec<LessonId>,
    xp: u32,
    streak: Streak,
    badges: Vec<Badge>,
    last_activity_date: Option<NaiveDate>,
}

impl ProgressRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from persisted fields.
    ///
    /// Duplicate completions or badge ids in stored data keep their first
    /// occurrence, so the uniqueness invariants hold from the first read.
    #[must_use]
    pub fn from_persisted(
        completed_lessons: Vec<LessonId>,
        xp: u32,
        streak: Streak,
        badges: Vec<Badge>,
        last_activity_date: Option<NaiveDate>,
    ) -> Self {
        let mut record = Self {
            completed_lessons: Vec::new(),
            xp,
            streak,
            badges: Vec::new(),
            last_activity_date,
        };
        for lesson in completed_lessons {
            record.mark_completed(&lesson);
        }
        for badge in badges {
            record.award_badge(badge);
        }
        record
    }

    // Accessors
    #[must_use]
    pub fn completed_lessons(&self) -> &[LessonId] {
        &self.completed_lessons
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed_lessons.len()
    }

    #[must_use]
    pub fn is_completed(&self, lesson_id: &LessonId) -> bool {
        self.completed_lessons.iter().any(|l| l == lesson_id)
    }

    #[must_use]
    pub fn xp(&self) -> u32 {
        self.xp
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        xp::level_for(self.xp)
    }

    #[must_use]
    pub fn streak(&self) -> &Streak {
        &self.streak
    }

    #[must_use]
    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    #[must_use]
    pub fn has_badge(&self, id: &str) -> bool {
        has_badge(&self.badges, id)
    }

    #[must_use]
    pub fn last_activity_date(&self) -> Option<NaiveDate> {
        self.last_activity_date
    }

    /// Record a completion. Returns false when the lesson was already done.
    pub fn mark_completed(&mut self, lesson_id: &LessonId) -> bool {
        if self.is_completed(lesson_id) {
            return false;
        }
        self.completed_lessons.push(lesson_id.clone());
        true
    }

    /// Add XP and return the new total. Saturates rather than wraps.
    pub fn add_xp(&mut self, amount: u32) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        self.xp
    }

    /// Count `today` toward the streak and stamp the activity date.
    pub fn observe_day(&mut self, today: NaiveDate) -> StreakUpdate {
        let update = self.streak.observe(today);
        self.last_activity_date = Some(today);
        update
    }

    /// Append a badge if its id is new. Returns false on a duplicate.
    pub fn award_badge(&mut self, badge: Badge) -> bool {
        if self.has_badge(&badge.id) {
            return false;
        }
        self.badges.push(badge);
        true
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
