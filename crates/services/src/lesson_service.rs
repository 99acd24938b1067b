use tracing::warn;

use deen_core::model::{Category, Lesson, LessonId, LessonManifest};
use storage::ProgressStore;
use storage::repository::Storage;

use crate::error::LessonServiceError;

/// Lesson catalog: lookup, browsing filters, and last-opened memory.
pub struct LessonService {
    manifest: LessonManifest,
    store: ProgressStore,
}

impl LessonService {
    #[must_use]
    pub fn new(manifest: LessonManifest, storage: &Storage) -> Self {
        Self {
            manifest,
            store: storage.progress.clone(),
        }
    }

    #[must_use]
    pub fn manifest(&self) -> &LessonManifest {
        &self.manifest
    }

    #[must_use]
    pub fn find(&self, id: &LessonId) -> Option<&Lesson> {
        self.manifest.find(id)
    }

    /// Filtered view for the browser: category chip plus free-text search,
    /// in manifest order.
    #[must_use]
    pub fn browse(&self, search: &str, category: Category) -> Vec<&Lesson> {
        self.manifest.filter(search, category)
    }

    /// Look up a lesson and remember it as the last one opened.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::UnknownLesson` for an id not in the
    /// manifest. A failing store only loses the bookmark.
    pub async fn open(&self, id: &LessonId) -> Result<&Lesson, LessonServiceError> {
        let lesson = self
            .find(id)
            .ok_or_else(|| LessonServiceError::UnknownLesson(id.to_string()))?;
        if let Err(err) = self.store.save_last_lesson(id).await {
            warn!(%err, "failed to remember last lesson");
        }
        Ok(lesson)
    }

    /// The last lesson the learner opened, if it is still in the manifest.
    pub async fn last_opened(&self) -> Option<&Lesson> {
        match self.store.last_lesson().await {
            Ok(Some(id)) => self.find(&id),
            Ok(None) => None,
            Err(err) => {
                warn!(%err, "last lesson unreadable");
                None
            }
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
