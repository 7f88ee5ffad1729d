// Data models: Rust structs that map to database rows.
//
// These are the types that flow through the application. They're separate
// from the database queries so other modules can use them without depending
// on rusqlite directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::similarity::{ComparisonAggregate, CorpusComparison, Severity};
use crate::workflow::SubmissionStatus;

/// A student's submission for one assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub file_name: String,
    /// Plain text extracted upstream; `None` if extraction produced nothing
    pub extracted_text: Option<String>,
    pub status: SubmissionStatus,
    pub score: Option<i64>,
    pub feedback: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// The stored outcome of one similarity check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub submission_id: i64,
    /// Mean pairwise score (0-100), the primary signal
    pub similarity_score: f64,
    pub average_score: f64,
    pub max_score: f64,
    pub total_comparisons: usize,
    pub matched_comparisons: usize,
    /// Peers left out because the comparison deadline passed
    pub skipped_comparisons: usize,
    pub detailed_report: String,
    /// Candidate tokens marked against the first peer
    pub highlighted_text: String,
    pub checked_at: DateTime<Utc>,
}

impl SimilarityResult {
    pub fn from_comparison(
        submission_id: i64,
        comparison: &CorpusComparison,
        detailed_report: String,
        highlighted_text: String,
        checked_at: DateTime<Utc>,
    ) -> Self {
        let aggregate = &comparison.aggregate;
        Self {
            submission_id,
            similarity_score: aggregate.similarity_score(),
            average_score: aggregate.average_score,
            max_score: aggregate.max_score,
            total_comparisons: aggregate.total_compared,
            matched_comparisons: aggregate.matched_count,
            skipped_comparisons: comparison.skipped,
            detailed_report,
            highlighted_text,
            checked_at,
        }
    }

    /// Rebuild the aggregate the result was generated from.
    pub fn aggregate(&self) -> ComparisonAggregate {
        ComparisonAggregate {
            mean_score: self.similarity_score,
            max_score: self.max_score,
            average_score: self.average_score,
            total_compared: self.total_comparisons,
            matched_count: self.matched_comparisons,
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::from_score(self.similarity_score)
    }
}
