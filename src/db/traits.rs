// Database trait: everything the CLI needs from storage.
//
// A Database is also the workflow's DocumentStore, StatusTracker and
// ReportSink, so `check_submission` can run directly against it. Methods
// are async so a native-async backend can slot in beside SqliteDatabase.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{SimilarityResult, Submission};
use crate::workflow::{DocumentStore, ReportSink, StatusTracker, SubmissionStatus};

#[async_trait]
pub trait Database: DocumentStore + StatusTracker + ReportSink + Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Submissions ---

    /// Store a submission in SUBMITTED state, replacing the student's
    /// earlier submission for the same assignment. Returns the new id.
    async fn add_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
        file_name: &str,
        extracted_text: Option<&str>,
    ) -> Result<i64>;

    async fn get_submission(&self, id: i64) -> Result<Option<Submission>>;

    /// All submissions for an assignment, oldest first.
    async fn list_submissions(&self, assignment_id: i64) -> Result<Vec<Submission>>;

    /// Record a grade and move the submission to GRADED.
    async fn grade(&self, id: i64, score: i64, feedback: &str) -> Result<()>;

    /// Number of submissions per status.
    async fn status_counts(&self) -> Result<Vec<(SubmissionStatus, i64)>>;

    // --- Similarity results ---

    async fn get_result(&self, submission_id: i64) -> Result<Option<SimilarityResult>>;

    /// Results for an assignment, highest similarity score first.
    async fn results_for_assignment(&self, assignment_id: i64) -> Result<Vec<SimilarityResult>>;
}
