#![forbid(unsafe_code)]

pub mod app_services;
pub mod content;
pub mod error;
pub mod events;
pub mod lesson_service;
pub mod progress_service;
pub mod quest_service;
pub mod share_service;

pub use deen_core::Clock;

pub use app_services::AppServices;
pub use content::{ContentLoader, ContentSource};
pub use error::{AppServicesError, ContentError, LessonServiceError, ShareError};
pub use events::{EventHub, ProgressEvent};
pub use lesson_service::LessonService;
pub use progress_service::{CompletionOutcome, ProgressService, ProgressStats};
pub use quest_service::QuestService;
pub use share_service::{ShareLine, ShareService, ShareSummary};
