use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use deen_core::model::{LessonId, QuizResult};
use serde::{Deserialize, Serialize};

use crate::keys;
use crate::repository::{KeyValueStore, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Wire shape of one `lessonScores` entry. Older entries may lack the
/// timestamp.
#[derive(Debug, Serialize, Deserialize)]
struct ScoreRecord {
    score: u32,
    total: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
}

impl ScoreRecord {
    fn from_result(result: &QuizResult) -> Self {
        Self {
            score: result.score(),
            total: result.total(),
            timestamp: Some(result.recorded_at()),
        }
    }

    fn into_result(self) -> Option<QuizResult> {
        let recorded_at = self.timestamp.unwrap_or(DateTime::UNIX_EPOCH);
        QuizResult::new(self.score, self.total, recorded_at).ok()
    }
}

/// The per-lesson quiz-result map under the `lessonScores` key.
///
/// The quiz collaborator writes here (latest attempt wins); badge and
/// share logic read. Entries that fail validation are skipped rather than
/// failing the whole read.
#[derive(Clone)]
pub struct ScoreBook {
    kv: Arc<dyn KeyValueStore>,
}

impl ScoreBook {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// All recorded results, ordered by lesson id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure or if the map itself is
    /// not valid JSON.
    pub async fn all(&self) -> Result<BTreeMap<LessonId, QuizResult>, StorageError> {
        let Some(raw) = self.kv.get(keys::LESSON_SCORES).await? else {
            return Ok(BTreeMap::new());
        };
        let records: BTreeMap<LessonId, ScoreRecord> =
            serde_json::from_str(&raw).map_err(ser)?;
        Ok(records
            .into_iter()
            .filter_map(|(id, record)| record.into_result().map(|r| (id, r)))
            .collect())
    }

    /// Record the latest attempt for `lesson_id`, overwriting any previous
    /// attempt.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    pub async fn record(
        &self,
        lesson_id: &LessonId,
        result: &QuizResult,
    ) -> Result<(), StorageError> {
        let mut records: BTreeMap<LessonId, ScoreRecord> =
            match self.kv.get(keys::LESSON_SCORES).await? {
                Some(raw) => serde_json::from_str(&raw).unwrap_or_default(),
                None => BTreeMap::new(),
            };
        records.insert(lesson_id.clone(), ScoreRecord::from_result(result));
        let raw = serde_json::to_string(&records).map_err(ser)?;
        self.kv.set(keys::LESSON_SCORES, &raw).await
    }

    /// Number of distinct lessons whose recorded score is perfect.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    pub async fn perfect_count(&self) -> Result<usize, StorageError> {
        Ok(self
            .all()
            .await?
            .values()
            .filter(|result| result.is_perfect())
            .count())
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Storage;
    use deen_core::time::fixed_now;

    fn result(score: u32, total: u32) -> QuizResult {
        QuizResult::new(score, total, fixed_now()).unwrap()
    }

    #[tokio::test]
    async fn retake_overwrites_the_previous_attempt() {
        let storage = Storage::in_memory();
        let lesson = LessonId::new("lesson-01");

        storage.scores.record(&lesson, &result(4, 10)).await.unwrap();
        storage.scores.record(&lesson, &result(9, 10)).await.unwrap();

        let all = storage.scores.all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[&lesson].score(), 9);
    }

    #[tokio::test]
    async fn perfect_count_is_per_distinct_lesson() {
        let storage = Storage::in_memory();
        storage
            .scores
            .record(&LessonId::new("lesson-01"), &result(5, 5))
            .await
            .unwrap();
        storage
            .scores
            .record(&LessonId::new("lesson-02"), &result(4, 5))
            .await
            .unwrap();
        storage
            .scores
            .record(&LessonId::new("lesson-03"), &result(10, 10))
            .await
            .unwrap();
        // retake of an already-perfect lesson does not add a second count
        storage
            .scores
            .record(&LessonId::new("lesson-01"), &result(5, 5))
            .await
            .unwrap();

        assert_eq!(storage.scores.perfect_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn entries_without_timestamps_still_load() {
        let storage = Storage::in_memory();
        storage
            .kv
            .set(
                keys::LESSON_SCORES,
                r#"{"lesson-01":{"score":5,"total":5},"lesson-02":{"score":0,"total":0}}"#,
            )
            .await
            .unwrap();

        // the zero-total entry is invalid and dropped
        let all = storage.scores.all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[&LessonId::new("lesson-01")].is_perfect());
    }

    #[tokio::test]
    async fn missing_map_reads_as_empty() {
        let storage = Storage::in_memory();
        assert!(storage.scores.all().await.unwrap().is_empty());
        assert_eq!(storage.scores.perfect_count().await.unwrap(), 0);
    }
}
