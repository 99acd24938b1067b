use deen_core::model::LessonId;
use storage::ScoreBook;
use storage::repository::Storage;

use crate::error::ShareError;

/// One line of the share summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLine {
    pub lesson_id: LessonId,
    pub score: u32,
    pub total: u32,
    pub percentage: u32,
    pub date: String,
}

/// Aggregate over every recorded quiz result, ordered by lesson id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareSummary {
    pub lines: Vec<ShareLine>,
    pub total_score: u32,
    pub total_questions: u32,
    pub overall_percentage: u32,
}

/// Builds the progress-sharing text from recorded quiz results.
#[derive(Clone)]
pub struct ShareService {
    scores: ScoreBook,
}

impl ShareService {
    #[must_use]
    pub fn new(storage: &Storage) -> Self {
        Self {
            scores: storage.scores.clone(),
        }
    }

    /// Collect recorded results into a summary.
    ///
    /// Returns `None` when nothing has been recorded yet; the share page
    /// shows its empty state instead.
    ///
    /// # Errors
    ///
    /// Returns `ShareError` on storage failure.
    pub async fn summary(&self) -> Result<Option<ShareSummary>, ShareError> {
        let results = self.scores.all().await?;
        if results.is_empty() {
            return Ok(None);
        }

        let mut lines = Vec::with_capacity(results.len());
        let mut total_score: u32 = 0;
        let mut total_questions: u32 = 0;
        for (lesson_id, result) in results {
            total_score = total_score.saturating_add(result.score());
            total_questions = total_questions.saturating_add(result.total());
            lines.push(ShareLine {
                lesson_id,
                score: result.score(),
                total: result.total(),
                percentage: result.percentage(),
                date: result.recorded_at().format("%b %-d, %Y").to_string(),
            });
        }

        let overall = (f64::from(total_score) / f64::from(total_questions)) * 100.0;
        Ok(Some(ShareSummary {
            lines,
            total_score,
            total_questions,
            overall_percentage: overall.round() as u32,
        }))
    }

    /// Render the message for SMS, email, or the clipboard.
    #[must_use]
    pub fn message(summary: &ShareSummary, site_url: &str) -> String {
        let mut message = String::from("📚 Teen Deen Progress Update\n\n");
        for line in &summary.lines {
            message.push_str(&format!(
                "{}: {}/{} ({}%) - {}\n",
                line.lesson_id, line.score, line.total, line.percentage, line.date
            ));
        }
        message.push_str(&format!(
            "\n📊 Overall: {}/{} ({}%)\n",
            summary.total_score, summary.total_questions, summary.overall_percentage
        ));
        message.push_str(&format!("✅ Quizzes Completed: {}\n\n", summary.lines.len()));
        message.push_str(&format!("View Teen Deen: {site_url}\n\n"));
        message.push_str("Keep up the great work! 🌟");
        message
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
