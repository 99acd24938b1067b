mod badge;
mod ids;
mod lesson;
mod progress;
mod quest;
mod quiz;
mod streak;

pub use badge::{Badge, INTENTIONS_LESSON, UnlockContext, has_badge, newly_unlocked};
pub use ids::{LessonId, QuestId};
pub use lesson::{Category, Lesson, LessonManifest, ManifestError};
pub use progress::ProgressRecord;
pub use quest::{Quest, QuestFile, completion_key, quest_of_the_day};
pub use quiz::{QuizResult, QuizResultError, passing_threshold};
pub use streak::{Streak, StreakUpdate};
