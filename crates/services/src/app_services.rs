use std::sync::Arc;

use deen_core::Clock;
use storage::repository::Storage;

use crate::content::{ContentLoader, ContentSource};
use crate::error::AppServicesError;
use crate::events::EventHub;
use crate::lesson_service::LessonService;
use crate::progress_service::ProgressService;
use crate::quest_service::QuestService;
use crate::share_service::ShareService;

/// Assembles the app-facing services over one storage backend and one
/// event hub.
pub struct AppServices {
    hub: Arc<EventHub>,
    storage: Storage,
    progress: ProgressService,
    quests: QuestService,
    lessons: LessonService,
    share: ShareService,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or content
    /// loading fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        lessons_source: &ContentSource,
        quests_source: &ContentSource,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::assemble(storage, clock, lessons_source, quests_source).await
    }

    /// In-memory variant for tests and dry runs.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if content loading fails.
    pub async fn new_in_memory(
        clock: Clock,
        lessons_source: &ContentSource,
        quests_source: &ContentSource,
    ) -> Result<Self, AppServicesError> {
        Self::assemble(Storage::in_memory(), clock, lessons_source, quests_source).await
    }

    async fn assemble(
        storage: Storage,
        clock: Clock,
        lessons_source: &ContentSource,
        quests_source: &ContentSource,
    ) -> Result<Self, AppServicesError> {
        let loader = ContentLoader::new();
        let manifest = loader.manifest(lessons_source).await?;
        let quest_list = loader.quests(quests_source).await?;

        let hub = Arc::new(EventHub::new());
        let progress = ProgressService::load(clock, &storage, Arc::clone(&hub)).await;
        let quests = QuestService::load(clock, quest_list, &storage, Arc::clone(&hub)).await;
        let lessons = LessonService::new(manifest, &storage);
        let share = ShareService::new(&storage);

        Ok(Self {
            hub,
            storage,
            progress,
            quests,
            lessons,
            share,
        })
    }

    #[must_use]
    pub fn hub(&self) -> Arc<EventHub> {
        Arc::clone(&self.hub)
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressService {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut ProgressService {
        &mut self.progress
    }

    #[must_use]
    pub fn quests(&self) -> &QuestService {
        &self.quests
    }

    pub fn quests_mut(&mut self) -> &mut QuestService {
        &mut self.quests
    }

    #[must_use]
    pub fn lessons(&self) -> &LessonService {
        &self.lessons
    }

    #[must_use]
    pub fn share(&self) -> &ShareService {
        &self.share
    }
}
