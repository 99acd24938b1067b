//! Loading for the lesson manifest and the quest config.
//!
//! Both files are plain JSON served next to the app or checked into the
//! data directory, so the loader accepts either a local path or a URL.

use std::path::PathBuf;

use reqwest::Client;
use serde::de::DeserializeOwned;

use deen_core::model::{LessonManifest, Quest, QuestFile};

use crate::error::ContentError;

/// Where a content file lives.
#[derive(Debug, Clone)]
pub enum ContentSource {
    File(PathBuf),
    Url(String),
}

impl ContentSource {
    /// Treat anything with an http(s) scheme as a URL, everything else as
    /// a local path.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_owned())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }
}

/// Fetches and decodes content files.
#[derive(Clone, Default)]
pub struct ContentLoader {
    client: Client,
}

impl ContentLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate the lesson manifest.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` for I/O, HTTP, JSON, or manifest-rule
    /// failures.
    pub async fn manifest(&self, source: &ContentSource) -> Result<LessonManifest, ContentError> {
        let manifest: LessonManifest = self.fetch_json(source).await?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load the quest list. A file without a `quests` array is an empty
    /// list.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` for I/O, HTTP, or JSON failures.
    pub async fn quests(&self, source: &ContentSource) -> Result<Vec<Quest>, ContentError> {
        let file: QuestFile = self.fetch_json(source).await?;
        Ok(file.quests)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        source: &ContentSource,
    ) -> Result<T, ContentError> {
        match source {
            ContentSource::File(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ContentError::File {
                    path: path.display().to_string(),
                    source,
                })?;
                serde_json::from_str(&raw).map_err(|source| ContentError::Json {
                    path: path.display().to_string(),
                    source,
                })
            }
            ContentSource::Url(url) => {
                let response = self.client.get(url).send().await?;
                if !response.status().is_success() {
                    return Err(ContentError::HttpStatus(response.status()));
                }
                Ok(response.json().await?)
            }
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
