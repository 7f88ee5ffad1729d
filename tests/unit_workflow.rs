// Unit tests for the similarity-check workflow against in-memory
// collaborators.
//
// Covers the precondition errors (NotFound, NoTextAvailable), the status
// path PENDING -> COMPLETE, peer selection, first-peer highlighting, and
// the guarantee that a failed check never advances past PENDING.

use simcheck::similarity::CompareOptions;
use simcheck::workflow::memory::MemoryStore;
use simcheck::workflow::{
    check_submission, CheckError, DocumentStore, StatusTracker, SubmissionStatus,
};

const ESSAY: &str = "The mitochondria is the powerhouse of the cell and produces energy.";

async fn store_with_assignment() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert(1, 100, Some(ESSAY)).await;
    // Unrelated first peer, exact copy second
    store
        .insert(2, 100, Some("Rivers carve valleys over thousands years."))
        .await;
    store.insert(3, 100, Some(ESSAY)).await;
    // No extracted text: excluded from peers
    store.insert(4, 100, None).await;
    // Other assignment: excluded from peers
    store.insert(5, 200, Some(ESSAY)).await;
    store
}

#[tokio::test]
async fn check_missing_document_is_not_found() {
    let store = MemoryStore::new();
    let err = check_submission(&store, 42, &CompareOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckError::NotFound { submission_id: 42 }));
}

#[tokio::test]
async fn check_without_text_rejected_before_pending() {
    let store = store_with_assignment().await;
    let err = check_submission(&store, 4, &CompareOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckError::NoTextAvailable { submission_id: 4 }));
    assert_eq!(
        store.status(4).await.unwrap(),
        Some(SubmissionStatus::Submitted)
    );
}

#[tokio::test]
async fn check_empty_text_rejected() {
    let store = MemoryStore::new();
    store.insert(9, 1, Some("")).await;
    let err = check_submission(&store, 9, &CompareOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckError::NoTextAvailable { .. }));
}

#[tokio::test]
async fn peers_exclude_subject_textless_and_other_assignments() {
    let store = store_with_assignment().await;
    let peers = store.peers_for(100, 1).await.unwrap();
    assert_eq!(peers.len(), 2);
    assert!(peers[0].starts_with("Rivers"));
}

#[tokio::test]
async fn check_completes_and_stores_result() {
    let store = store_with_assignment().await;
    let result = check_submission(&store, 1, &CompareOptions::default())
        .await
        .unwrap();

    assert_eq!(result.submission_id, 1);
    assert_eq!(result.total_comparisons, 2);
    assert_eq!(result.matched_comparisons, 1);
    assert_eq!(result.skipped_comparisons, 0);
    assert!((result.max_score - 100.0).abs() < 1e-9);
    assert!((result.similarity_score - 50.0).abs() < 1e-9);
    assert_eq!(result.average_score, result.similarity_score);
    assert!(result.detailed_report.contains("Similarity Score: 50.00%"));
    assert!(result.detailed_report.contains("WARNING"));

    assert_eq!(
        store.status(1).await.unwrap(),
        Some(SubmissionStatus::CheckComplete)
    );
    assert_eq!(store.result(1).await, Some(result));
}

#[tokio::test]
async fn highlight_uses_first_peer_not_best() {
    let store = store_with_assignment().await;
    let result = check_submission(&store, 1, &CompareOptions::default())
        .await
        .unwrap();

    // First peer (the rivers essay) shares no tokens, even though the
    // second peer is an exact copy
    assert!(!result.highlighted_text.contains("[SIMILAR:"));
    assert!(result.highlighted_text.starts_with("the mitochondria"));
}

#[tokio::test]
async fn check_with_no_peers() {
    let store = MemoryStore::new();
    store.insert(1, 7, Some(ESSAY)).await;
    let result = check_submission(&store, 1, &CompareOptions::default())
        .await
        .unwrap();
    assert_eq!(result.total_comparisons, 0);
    assert_eq!(result.similarity_score, 0.0);
    assert_eq!(result.highlighted_text, "");
    assert!(result.detailed_report.contains("likely original work"));
}

#[tokio::test]
async fn failed_sink_leaves_status_pending() {
    let store = MemoryStore::rejecting_results();
    store.insert(1, 7, Some(ESSAY)).await;
    store.insert(2, 7, Some(ESSAY)).await;

    let err = check_submission(&store, 1, &CompareOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckError::Collaborator(_)));
    assert_eq!(
        store.status(1).await.unwrap(),
        Some(SubmissionStatus::CheckPending)
    );
    assert!(store.result(1).await.is_none());
}

#[tokio::test]
async fn recheck_replaces_result() {
    let store = store_with_assignment().await;
    let options = CompareOptions::default();
    check_submission(&store, 1, &options).await.unwrap();
    let second = check_submission(&store, 1, &options).await.unwrap();
    assert_eq!(store.result(1).await, Some(second));
    assert_eq!(
        store.status(1).await.unwrap(),
        Some(SubmissionStatus::CheckComplete)
    );
}

#[tokio::test]
async fn invalid_transition_surfaces_typed() {
    let store = MemoryStore::new();
    store.insert(1, 7, Some(ESSAY)).await;
    store
        .transition(1, SubmissionStatus::Graded)
        .await
        .unwrap();
    store
        .transition(1, SubmissionStatus::Returned)
        .await
        .unwrap();

    let err = check_submission(&store, 1, &CompareOptions::default())
        .await
        .unwrap_err();
    match err {
        CheckError::InvalidTransition(t) => {
            assert_eq!(t.from, SubmissionStatus::Returned);
            assert_eq!(t.to, SubmissionStatus::CheckPending);
        }
        other => panic!("expected InvalidTransition, got {other:?}"),
    }
}
