// SqliteDatabase: rusqlite backend implementing the Database trait and the
// workflow collaborator traits.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Send.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock is never held across .await points.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{SimilarityResult, Submission};
use super::queries;
use super::traits::Database;
use crate::workflow::{Document, DocumentStore, ReportSink, StatusTracker, SubmissionStatus};

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl DocumentStore for SqliteDatabase {
    async fn document(&self, id: i64) -> Result<Option<Document>> {
        let conn = self.conn.lock().await;
        queries::get_document(&conn, id)
    }

    async fn peers_for(&self, assignment_id: i64, excluding: i64) -> Result<Vec<String>> {
        let conn = self.conn.lock().await;
        queries::peer_texts(&conn, assignment_id, excluding)
    }
}

#[async_trait]
impl StatusTracker for SqliteDatabase {
    async fn status(&self, id: i64) -> Result<Option<SubmissionStatus>> {
        let conn = self.conn.lock().await;
        queries::get_status(&conn, id)
    }

    async fn transition(&self, id: i64, to: SubmissionStatus) -> Result<SubmissionStatus> {
        let conn = self.conn.lock().await;
        queries::transition_status(&conn, id, to)
    }
}

#[async_trait]
impl ReportSink for SqliteDatabase {
    async fn accept(&self, result: &SimilarityResult) -> Result<()> {
        let conn = self.conn.lock().await;
        queries::upsert_result(&conn, result)
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn add_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
        file_name: &str,
        extracted_text: Option<&str>,
    ) -> Result<i64> {
        let conn = self.conn.lock().await;
        queries::add_submission(&conn, assignment_id, student_id, file_name, extracted_text)
    }

    async fn get_submission(&self, id: i64) -> Result<Option<Submission>> {
        let conn = self.conn.lock().await;
        queries::get_submission(&conn, id)
    }

    async fn list_submissions(&self, assignment_id: i64) -> Result<Vec<Submission>> {
        let conn = self.conn.lock().await;
        queries::list_submissions(&conn, assignment_id)
    }

    async fn grade(&self, id: i64, score: i64, feedback: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        queries::grade_submission(&conn, id, score, feedback)
    }

    async fn status_counts(&self) -> Result<Vec<(SubmissionStatus, i64)>> {
        let conn = self.conn.lock().await;
        queries::status_counts(&conn)
    }

    async fn get_result(&self, submission_id: i64) -> Result<Option<SimilarityResult>> {
        let conn = self.conn.lock().await;
        queries::get_result(&conn, submission_id)
    }

    async fn results_for_assignment(&self, assignment_id: i64) -> Result<Vec<SimilarityResult>> {
        let conn = self.conn.lock().await;
        queries::results_for_assignment(&conn, assignment_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_tables;
    use crate::similarity::CompareOptions;
    use crate::workflow::{check_submission, CheckError, TransitionError};

    async fn test_db() -> SqliteDatabase {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        SqliteDatabase::new(conn)
    }

    #[tokio::test]
    async fn test_trait_table_count() {
        let db = test_db().await;
        assert_eq!(db.table_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_trait_text_for() {
        let db = test_db().await;
        let with_text = db.add_submission(1, 1, "a.txt", Some("hello")).await.unwrap();
        let without = db.add_submission(1, 2, "b.txt", None).await.unwrap();
        assert_eq!(db.text_for(with_text).await.unwrap().as_deref(), Some("hello"));
        assert_eq!(db.text_for(without).await.unwrap(), None);
        assert!(db.document(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_check_submission_end_to_end() {
        let db = test_db().await;
        let subject = db
            .add_submission(7, 1, "a.txt", Some("The quick brown fox jumps over the lazy dog."))
            .await
            .unwrap();
        db.add_submission(7, 2, "b.txt", Some("the quick brown fox jumps over the lazy dog"))
            .await
            .unwrap();
        db.add_submission(7, 3, "c.txt", Some("an entirely different essay about rivers"))
            .await
            .unwrap();

        let result = check_submission(&db, subject, &CompareOptions::default())
            .await
            .unwrap();

        assert_eq!(result.total_comparisons, 2);
        assert_eq!(result.matched_comparisons, 1);
        assert!((result.max_score - 100.0).abs() < 1e-9);
        assert!((result.similarity_score - 50.0).abs() < 1e-9);
        assert!(result.highlighted_text.starts_with("[SIMILAR:the] [SIMILAR:quick]"));

        assert_eq!(
            db.status(subject).await.unwrap(),
            Some(SubmissionStatus::CheckComplete)
        );
        assert_eq!(db.get_result(subject).await.unwrap(), Some(result));
    }

    #[tokio::test]
    async fn test_check_without_text_leaves_status() {
        let db = test_db().await;
        let id = db.add_submission(1, 1, "scan.pdf", None).await.unwrap();
        let err = check_submission(&db, id, &CompareOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckError::NoTextAvailable { .. }));
        assert_eq!(db.status(id).await.unwrap(), Some(SubmissionStatus::Submitted));
    }

    #[tokio::test]
    async fn test_review_then_check() {
        let db = test_db().await;
        let id = db
            .add_submission(2, 1, "a.txt", Some("the quick brown fox jumps"))
            .await
            .unwrap();
        db.add_submission(2, 2, "b.txt", Some("the quick brown fox sleeps"))
            .await
            .unwrap();

        let now = db.transition(id, SubmissionStatus::UnderReview).await.unwrap();
        assert_eq!(now, SubmissionStatus::UnderReview);

        check_submission(&db, id, &CompareOptions::default())
            .await
            .unwrap();
        assert_eq!(db.status(id).await.unwrap(), Some(SubmissionStatus::CheckComplete));
    }

    #[tokio::test]
    async fn test_graded_then_returned_is_final() {
        let db = test_db().await;
        let id = db.add_submission(3, 1, "a.txt", Some("some essay text")).await.unwrap();
        db.grade(id, 85, "good").await.unwrap();

        let now = db.transition(id, SubmissionStatus::Returned).await.unwrap();
        assert_eq!(now, SubmissionStatus::Returned);

        let err = db
            .transition(id, SubmissionStatus::UnderReview)
            .await
            .unwrap_err();
        let rejected = err.downcast_ref::<TransitionError>().unwrap();
        assert_eq!(rejected.from, SubmissionStatus::Returned);
        assert!(rejected.from.next_states().is_empty());

        let listed = db.list_submissions(3).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, SubmissionStatus::Returned);
        assert_eq!(listed[0].score, Some(85));
    }

    #[tokio::test]
    async fn test_transition_unknown_submission() {
        let db = test_db().await;
        let err = db.transition(42, SubmissionStatus::Returned).await.unwrap_err();
        assert!(err.downcast_ref::<TransitionError>().is_none());
    }

    #[tokio::test]
    async fn test_check_after_grading_is_rejected() {
        let db = test_db().await;
        let id = db.add_submission(1, 1, "a.txt", Some("one two three four")).await.unwrap();
        db.grade(id, 70, "ok").await.unwrap();
        let err = check_submission(&db, id, &CompareOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckError::InvalidTransition(_)));
    }
}
