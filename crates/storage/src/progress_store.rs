use std::sync::Arc;

use chrono::NaiveDate;
use deen_core::model::{Badge, LessonId, Streak};
use serde::{Deserialize, Serialize};

use crate::keys;
use crate::repository::{KeyValueStore, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Wire shape of the streak entry (`lastDate` is the historical name).
#[derive(Debug, Serialize, Deserialize)]
struct StreakRecord {
    current: u32,
    best: u32,
    #[serde(rename = "lastDate")]
    last_date: Option<NaiveDate>,
}

/// Typed access to the progress fields, one key per field.
///
/// Readers return `Ok(None)` for an absent key and `Serialization` for a
/// present-but-malformed value, so callers can fall back per field instead
/// of failing the whole load.
#[derive(Clone)]
pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure or malformed JSON.
    pub async fn completed_lessons(&self) -> Result<Option<Vec<LessonId>>, StorageError> {
        let Some(raw) = self.kv.get(keys::COMPLETED_LESSONS).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw).map(Some).map_err(ser)
    }

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    pub async fn save_completed_lessons(&self, lessons: &[LessonId]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(lessons).map_err(ser)?;
        self.kv.set(keys::COMPLETED_LESSONS, &raw).await
    }

    /// XP is stored as a plain decimal string, not JSON.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure or a non-numeric value.
    pub async fn xp(&self) -> Result<Option<u32>, StorageError> {
        let Some(raw) = self.kv.get(keys::XP).await? else {
            return Ok(None);
        };
        raw.trim().parse().map(Some).map_err(ser)
    }

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    pub async fn save_xp(&self, xp: u32) -> Result<(), StorageError> {
        self.kv.set(keys::XP, &xp.to_string()).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure or malformed JSON.
    pub async fn streak(&self) -> Result<Option<Streak>, StorageError> {
        let Some(raw) = self.kv.get(keys::STREAK).await? else {
            return Ok(None);
        };
        let record: StreakRecord = serde_json::from_str(&raw).map_err(ser)?;
        Ok(Some(Streak::from_persisted(
            record.current,
            record.best,
            record.last_date,
        )))
    }

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    pub async fn save_streak(&self, streak: &Streak) -> Result<(), StorageError> {
        let record = StreakRecord {
            current: streak.current(),
            best: streak.best(),
            last_date: streak.last_date(),
        };
        let raw = serde_json::to_string(&record).map_err(ser)?;
        self.kv.set(keys::STREAK, &raw).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure or malformed JSON.
    pub async fn badges(&self) -> Result<Option<Vec<Badge>>, StorageError> {
        let Some(raw) = self.kv.get(keys::BADGES).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw).map(Some).map_err(ser)
    }

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    pub async fn save_badges(&self, badges: &[Badge]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(badges).map_err(ser)?;
        self.kv.set(keys::BADGES, &raw).await
    }

    /// The activity date is stored as a plain `YYYY-MM-DD` string.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure or an unparseable date.
    pub async fn last_activity_date(&self) -> Result<Option<NaiveDate>, StorageError> {
        let Some(raw) = self.kv.get(keys::LAST_ACTIVITY_DATE).await? else {
            return Ok(None);
        };
        raw.trim().parse().map(Some).map_err(ser)
    }

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    pub async fn save_last_activity_date(&self, date: NaiveDate) -> Result<(), StorageError> {
        self.kv
            .set(keys::LAST_ACTIVITY_DATE, &date.format("%Y-%m-%d").to_string())
            .await
    }

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    pub async fn last_lesson(&self) -> Result<Option<LessonId>, StorageError> {
        Ok(self.kv.get(keys::LAST_LESSON).await?.map(LessonId::new))
    }

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    pub async fn save_last_lesson(&self, lesson_id: &LessonId) -> Result<(), StorageError> {
        self.kv.set(keys::LAST_LESSON, lesson_id.as_str()).await
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Storage;
    use deen_core::time::fixed_now;

    #[tokio::test]
    async fn absent_fields_read_as_none() {
        let storage = Storage::in_memory();
        assert!(storage.progress.completed_lessons().await.unwrap().is_none());
        assert!(storage.progress.xp().await.unwrap().is_none());
        assert!(storage.progress.streak().await.unwrap().is_none());
        assert!(storage.progress.badges().await.unwrap().is_none());
        assert!(storage.progress.last_activity_date().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn xp_is_stored_as_a_plain_decimal_string() {
        let storage = Storage::in_memory();
        storage.progress.save_xp(175).await.unwrap();
        let raw = storage.kv.get(keys::XP).await.unwrap().unwrap();
        assert_eq!(raw, "175");
        assert_eq!(storage.progress.xp().await.unwrap(), Some(175));
    }

    #[tokio::test]
    async fn streak_json_uses_the_last_date_field_name() {
        let storage = Storage::in_memory();
        let streak = Streak::from_persisted(2, 5, Some("2025-06-15".parse().unwrap()));
        storage.progress.save_streak(&streak).await.unwrap();

        let raw = storage.kv.get(keys::STREAK).await.unwrap().unwrap();
        assert!(raw.contains("\"lastDate\":\"2025-06-15\""));

        let back = storage.progress.streak().await.unwrap().unwrap();
        assert_eq!(back, streak);
    }

    #[tokio::test]
    async fn streak_reads_the_zero_state() {
        let storage = Storage::in_memory();
        storage
            .kv
            .set(keys::STREAK, r#"{"current":0,"best":0,"lastDate":null}"#)
            .await
            .unwrap();
        let streak = storage.progress.streak().await.unwrap().unwrap();
        assert_eq!(streak, Streak::new());
    }

    #[tokio::test]
    async fn malformed_fields_surface_serialization_errors() {
        let storage = Storage::in_memory();
        storage.kv.set(keys::XP, "not-a-number").await.unwrap();
        storage.kv.set(keys::BADGES, "{broken").await.unwrap();

        assert!(matches!(
            storage.progress.xp().await,
            Err(StorageError::Serialization(_))
        ));
        assert!(matches!(
            storage.progress.badges().await,
            Err(StorageError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn badges_round_trip_with_legacy_field_names() {
        let storage = Storage::in_memory();
        let badges = vec![Badge {
            id: "first-step".into(),
            name: "First Step".into(),
            description: "Complete your first lesson".into(),
            icon: "👣".into(),
            earned_at: fixed_now(),
        }];
        storage.progress.save_badges(&badges).await.unwrap();

        let raw = storage.kv.get(keys::BADGES).await.unwrap().unwrap();
        assert!(raw.contains("\"desc\""));
        assert!(raw.contains("\"earnedAt\""));

        let back = storage.progress.badges().await.unwrap().unwrap();
        assert_eq!(back, badges);
    }

    #[tokio::test]
    async fn completed_lessons_and_last_lesson_round_trip() {
        let storage = Storage::in_memory();
        let lessons = vec![LessonId::new("lesson-01"), LessonId::new("lesson-03")];
        storage
            .progress
            .save_completed_lessons(&lessons)
            .await
            .unwrap();
        assert_eq!(
            storage.progress.completed_lessons().await.unwrap().unwrap(),
            lessons
        );

        storage
            .progress
            .save_last_lesson(&LessonId::new("lesson-03"))
            .await
            .unwrap();
        assert_eq!(
            storage.progress.last_lesson().await.unwrap(),
            Some(LessonId::new("lesson-03"))
        );
    }

    #[tokio::test]
    async fn activity_date_is_a_bare_date_string() {
        let storage = Storage::in_memory();
        let date: NaiveDate = "2025-06-15".parse().unwrap();
        storage.progress.save_last_activity_date(date).await.unwrap();

        let raw = storage
            .kv
            .get(keys::LAST_ACTIVITY_DATE)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(raw, "2025-06-15");
        assert_eq!(
            storage.progress.last_activity_date().await.unwrap(),
            Some(date)
        );
    }
}
