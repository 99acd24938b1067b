//! Namespaced storage keys.
//!
//! Key names are part of the persisted data format; renaming one orphans
//! every existing record stored under it. Collisions between writers are
//! avoided by this naming convention only; there is no enforced
//! transaction boundary across keys.

/// JSON array of completed lesson-id strings.
pub const COMPLETED_LESSONS: &str = "teenDeen.progress.completedLessons";

/// Total XP, encoded as a plain decimal string.
pub const XP: &str = "teenDeen.progress.xp";

/// Streak state: `{"current", "best", "lastDate"}`.
pub const STREAK: &str = "teenDeen.progress.streak";

/// JSON array of earned badge records.
pub const BADGES: &str = "teenDeen.progress.badges";

/// Most recent activity date, as a plain `YYYY-MM-DD` string.
pub const LAST_ACTIVITY_DATE: &str = "teenDeen.progress.lastActivityDate";

/// JSON array of `questId-date` completion keys.
pub const QUESTS_COMPLETED: &str = "teenDeen.quests.completed";

/// JSON map of lesson id to the latest quiz attempt. Written by the quiz
/// collaborator, read by badge and share logic.
pub const LESSON_SCORES: &str = "lessonScores";

/// Id of the last opened lesson, as a plain string.
pub const LAST_LESSON: &str = "lastLessonId";
