use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizResultError {
    #[error("quiz total must be > 0")]
    EmptyQuiz,
}

/// Minimum score needed to pass a quiz of `total` questions: 70% of the
/// total, rounded up.
#[must_use]
pub fn passing_threshold(total: u32) -> u32 {
    total.saturating_mul(7).div_ceil(10)
}

/// Latest recorded attempt for a lesson. Retakes overwrite earlier attempts.
///
/// `score <= total` is assumed from the quiz collaborator, not enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    score: u32,
    total: u32,
    recorded_at: DateTime<Utc>,
}

impl QuizResult {
    /// Create a result for an attempt.
    ///
    /// # Errors
    ///
    /// Returns `QuizResultError::EmptyQuiz` if `total` is zero.
    pub fn new(
        score: u32,
        total: u32,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self, QuizResultError> {
        if total == 0 {
            return Err(QuizResultError::EmptyQuiz);
        }
        Ok(Self {
            score,
            total,
            recorded_at,
        })
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.score >= passing_threshold(self.total)
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.score == self.total
    }

    /// Score as a rounded percentage of the total.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        let pct = (f64::from(self.score) / f64::from(self.total)) * 100.0;
        pct.round() as u32
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
