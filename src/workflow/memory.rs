// In-memory collaborators: a DocumentStore / StatusTracker / ReportSink
// backed by a BTreeMap, for tests and for comparisons that never touch
// the database.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::status::SubmissionStatus;
use super::traits::{Document, DocumentStore, ReportSink, StatusTracker};
use crate::db::models::SimilarityResult;

#[derive(Debug, Clone)]
struct Entry {
    document: Document,
    status: SubmissionStatus,
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<i64, Entry>>,
    results: Mutex<BTreeMap<i64, SimilarityResult>>,
    /// When set, `accept` fails (used to exercise the failure path)
    reject_results: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose sink refuses every result.
    pub fn rejecting_results() -> Self {
        Self {
            reject_results: true,
            ..Self::default()
        }
    }

    /// Add a document in SUBMITTED state, replacing any with the same id.
    pub async fn insert(&self, id: i64, assignment_id: i64, text: Option<&str>) {
        let document = Document {
            id,
            assignment_id,
            text: text.map(str::to_string),
        };
        self.entries.lock().await.insert(
            id,
            Entry {
                document,
                status: SubmissionStatus::Submitted,
            },
        );
    }

    pub async fn result(&self, id: i64) -> Option<SimilarityResult> {
        self.results.lock().await.get(&id).cloned()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn document(&self, id: i64) -> Result<Option<Document>> {
        Ok(self.entries.lock().await.get(&id).map(|e| e.document.clone()))
    }

    async fn peers_for(&self, assignment_id: i64, excluding: i64) -> Result<Vec<String>> {
        let entries = self.entries.lock().await;
        Ok(entries
            .values()
            .filter(|e| e.document.assignment_id == assignment_id && e.document.id != excluding)
            .filter_map(|e| e.document.text.clone())
            .collect())
    }
}

#[async_trait]
impl StatusTracker for MemoryStore {
    async fn status(&self, id: i64) -> Result<Option<SubmissionStatus>> {
        Ok(self.entries.lock().await.get(&id).map(|e| e.status))
    }

    async fn transition(&self, id: i64, to: SubmissionStatus) -> Result<SubmissionStatus> {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get_mut(&id) else {
            anyhow::bail!("Submission {id} not found");
        };
        entry.status = entry.status.transition(to)?;
        Ok(entry.status)
    }
}

#[async_trait]
impl ReportSink for MemoryStore {
    async fn accept(&self, result: &SimilarityResult) -> Result<()> {
        if self.reject_results {
            anyhow::bail!("Result sink unavailable");
        }
        self.results
            .lock()
            .await
            .insert(result.submission_id, result.clone());
        Ok(())
    }
}
