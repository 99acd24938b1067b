//! XP award amounts and level math.

/// Awarded the first time a lesson is completed.
pub const LESSON_COMPLETED: u32 = 50;

/// Awarded whenever a quiz attempt reaches the passing threshold.
pub const QUIZ_PASSED: u32 = 50;

/// Awarded whenever a quiz attempt answers every question correctly.
pub const PERFECT_SCORE: u32 = 25;

/// Awarded when the daily streak grows by one day.
pub const DAILY_STREAK: u32 = 10;

/// XP span of a single level.
pub const PER_LEVEL: u32 = 200;

/// Coarse level derived from total XP; 0 XP is level 1.
#[must_use]
pub fn level_for(xp: u32) -> u32 {
    xp / PER_LEVEL + 1
}
