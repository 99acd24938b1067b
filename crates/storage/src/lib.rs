#![forbid(unsafe_code)]

pub mod keys;
pub mod progress_store;
pub mod quest_log;
pub mod repository;
pub mod score_book;
pub mod sqlite;

pub use progress_store::ProgressStore;
pub use quest_log::QuestLog;
pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError};
pub use score_book::ScoreBook;
