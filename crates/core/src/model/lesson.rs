use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::LessonId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ManifestError {
    #[error("manifest version must be >= 1")]
    InvalidVersion,

    #[error("lesson at index {index} has an empty id")]
    EmptyLessonId { index: usize },

    #[error("duplicate lesson id: {id}")]
    DuplicateLessonId { id: String },

    #[error("lesson {id} has an empty title")]
    EmptyTitle { id: String },
}

/// One entry of the lesson manifest (`lessons.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub number: u32,
    pub title: String,
    pub minutes: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Lesson {
    /// Case-insensitive match against number, title, and tags.
    ///
    /// An empty or whitespace-only query matches everything.
    #[must_use]
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.number.to_string().contains(&query)
            || self.title.to_lowercase().contains(&query)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&query))
    }
}

/// Category chips of the lesson browser; each maps to a group of manifest
/// tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    All,
    Foundations,
    Character,
    Worship,
    Identity,
    Social,
    Purpose,
}

impl Category {
    /// Parse the chip value (`all`, `foundations`, ...).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "foundations" => Some(Self::Foundations),
            "character" => Some(Self::Character),
            "worship" => Some(Self::Worship),
            "identity" => Some(Self::Identity),
            "social" => Some(Self::Social),
            "purpose" => Some(Self::Purpose),
            _ => None,
        }
    }

    fn allowed_tags(self) -> &'static [&'static str] {
        match self {
            Self::All => &[],
            Self::Foundations => &["Foundations of Faith"],
            Self::Character => &[
                "Role Models & Character",
                "Strength of Character",
                "Modesty & Personal Conduct",
            ],
            Self::Worship => &[
                "Prayer & Worship",
                "Purification & Cleanliness",
                "Pillars of Islam & Iman",
            ],
            Self::Identity => &["Important Modern Topics", "Wrap-Up & Reference"],
            Self::Social => &["Unity & Following the Right Path"],
            Self::Purpose => &["Pillars of Islam & Iman"],
        }
    }

    #[must_use]
    pub fn matches(self, lesson: &Lesson) -> bool {
        if self == Self::All {
            return true;
        }
        lesson
            .tags
            .iter()
            .any(|tag| self.allowed_tags().contains(&tag.as_str()))
    }
}

/// The lesson manifest: a versioned list of lessons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonManifest {
    pub version: u32,
    pub lessons: Vec<Lesson>,
}

impl LessonManifest {
    /// Check the structural rules the deploy pipeline enforces on
    /// `lessons.json`.
    ///
    /// # Errors
    ///
    /// Returns the first `ManifestError` encountered, in document order.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.version == 0 {
            return Err(ManifestError::InvalidVersion);
        }
        let mut seen = HashSet::new();
        for (index, lesson) in self.lessons.iter().enumerate() {
            if lesson.id.as_str().trim().is_empty() {
                return Err(ManifestError::EmptyLessonId { index });
            }
            if lesson.title.trim().is_empty() {
                return Err(ManifestError::EmptyTitle {
                    id: lesson.id.to_string(),
                });
            }
            if !seen.insert(lesson.id.clone()) {
                return Err(ManifestError::DuplicateLessonId {
                    id: lesson.id.to_string(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn find(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|lesson| &lesson.id == id)
    }

    /// Lessons matching both the free-text search and the category chip,
    /// in manifest order.
    #[must_use]
    pub fn filter(&self, search: &str, category: Category) -> Vec<&Lesson> {
        self.lessons
            .iter()
            .filter(|lesson| category.matches(lesson))
            .filter(|lesson| lesson.matches_search(search))
            .collect()
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
