use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::LessonId;

/// The lesson whose passing unlocks `sincere-seeker`.
pub const INTENTIONS_LESSON: &str = "lesson-01";

/// An earned achievement.
///
/// Serialized field names match the historical record format
/// (`desc`, `earnedAt`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub icon: String,
    #[serde(rename = "earnedAt")]
    pub earned_at: DateTime<Utc>,
}

/// State snapshot the unlock predicates evaluate against.
///
/// `streak_current` must reflect the streak *after* today's update; two of
/// the predicates depend on it.
#[derive(Debug, Clone, Copy)]
pub struct UnlockContext<'a> {
    /// Lesson the triggering attempt was for.
    pub lesson_id: &'a LessonId,
    /// Whether that attempt reached the passing threshold.
    pub passed: bool,
    /// Total distinct lessons completed, including this one.
    pub completed_count: usize,
    /// Streak length after today was counted.
    pub streak_current: u32,
    /// Distinct lessons with a perfect recorded score.
    pub perfect_scores: usize,
}

struct BadgeSpec {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    unlocks: fn(&UnlockContext<'_>) -> bool,
}

impl BadgeSpec {
    fn earn(&self, at: DateTime<Utc>) -> Badge {
        Badge {
            id: self.id.to_owned(),
            name: self.name.to_owned(),
            description: self.description.to_owned(),
            icon: self.icon.to_owned(),
            earned_at: at,
        }
    }
}

const CATALOG: [BadgeSpec; 6] = [
    BadgeSpec {
        id: "first-step",
        name: "First Step",
        description: "Complete your first lesson",
        icon: "👣",
        unlocks: |ctx| ctx.completed_count == 1,
    },
    BadgeSpec {
        id: "sincere-seeker",
        name: "Sincere Seeker",
        description: "Pass Lesson 1: Intentions",
        icon: "🎯",
        unlocks: |ctx| ctx.lesson_id.as_str() == INTENTIONS_LESSON && ctx.passed,
    },
    BadgeSpec {
        id: "streak-starter",
        name: "Streak Starter",
        description: "3-day learning streak",
        icon: "🔥",
        unlocks: |ctx| ctx.streak_current >= 3,
    },
    BadgeSpec {
        id: "consistency-champ",
        name: "Consistency Champ",
        description: "7-day learning streak",
        icon: "💪",
        unlocks: |ctx| ctx.streak_current >= 7,
    },
    BadgeSpec {
        id: "quiz-master",
        name: "Quiz Master",
        description: "3 perfect quiz scores",
        icon: "🏆",
        unlocks: |ctx| ctx.perfect_scores >= 3,
    },
    BadgeSpec {
        id: "dedicated-learner",
        name: "Dedicated Learner",
        description: "Complete 10 lessons",
        icon: "📚",
        unlocks: |ctx| ctx.completed_count >= 10,
    },
];

/// Whether `id` is already among the earned badges.
#[must_use]
pub fn has_badge(earned: &[Badge], id: &str) -> bool {
    earned.iter().any(|badge| badge.id == id)
}

/// Evaluate every unlock predicate and return the badges earned just now.
///
/// Ids already present in `earned` are never returned again; a badge is
/// awarded at most once, ever.
#[must_use]
pub fn newly_unlocked(
    earned: &[Badge],
    ctx: &UnlockContext<'_>,
    at: DateTime<Utc>,
) -> Vec<Badge> {
    CATALOG
        .iter()
        .filter(|spec| !has_badge(earned, spec.id))
        .filter(|spec| (spec.unlocks)(ctx))
        .map(|spec| spec.earn(at))
        .collect()
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
