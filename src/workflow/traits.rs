// Collaborator traits: the similarity check's view of the outside world.
//
// The engine never touches storage. The workflow reads documents through a
// DocumentStore, records lifecycle moves through a StatusTracker and hands
// the finished result to a ReportSink. SqliteDatabase implements all three;
// MemoryStore does the same in memory for tests and ad-hoc runs.

use anyhow::Result;
use async_trait::async_trait;

use super::status::SubmissionStatus;
use crate::db::models::SimilarityResult;

/// What the workflow needs to know about one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: i64,
    pub assignment_id: i64,
    /// Extracted plain text; `None` when extraction produced nothing
    pub text: Option<String>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Look up a document. `Ok(None)` if it does not exist.
    async fn document(&self, id: i64) -> Result<Option<Document>>;

    /// Extracted text of the document, if it exists and has any.
    ///
    /// For callers that need only the text. `check_submission` reads the
    /// whole `Document` because it also needs the assignment.
    async fn text_for(&self, id: i64) -> Result<Option<String>> {
        Ok(self.document(id).await?.and_then(|d| d.text))
    }

    /// Texts of every other document in the assignment that has extracted
    /// text, in a stable order (ascending document id).
    async fn peers_for(&self, assignment_id: i64, excluding: i64) -> Result<Vec<String>>;
}

#[async_trait]
pub trait StatusTracker: Send + Sync {
    /// Current lifecycle state. `Ok(None)` if the document does not exist.
    async fn status(&self, id: i64) -> Result<Option<SubmissionStatus>>;

    /// Move a document to `to`, validated against the state machine and
    /// applied atomically. A rejected move fails with `TransitionError`.
    async fn transition(&self, id: i64, to: SubmissionStatus) -> Result<SubmissionStatus>;
}

#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Persist a finished check. A later check of the same document replaces it.
    async fn accept(&self, result: &SimilarityResult) -> Result<()>;
}
