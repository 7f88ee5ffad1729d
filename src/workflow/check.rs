// Similarity check orchestration for one submission.
//
// 1. Load the subject; reject missing documents and documents without text
// 2. Mark PLAGIARISM_CHECK_PENDING
// 3. Compare against the rest of the assignment (bounded pool, optional deadline)
// 4. Highlight against the first peer and render the report
// 5. Hand the result to the sink
// 6. Mark PLAGIARISM_CHECK_COMPLETE
//
// A failure in steps 3-5 returns early, so the status never moves past
// PENDING without a stored result.

use chrono::Utc;
use tracing::info;

use super::errors::CheckError;
use super::status::SubmissionStatus;
use super::traits::{DocumentStore, ReportSink, StatusTracker};
use crate::db::models::SimilarityResult;
use crate::similarity::{compare_corpus, highlight, report, CompareOptions};

/// Run a full similarity check for one submission and return the stored result.
pub async fn check_submission<C>(
    collab: &C,
    submission_id: i64,
    options: &CompareOptions,
) -> Result<SimilarityResult, CheckError>
where
    C: DocumentStore + StatusTracker + ReportSink + ?Sized,
{
    let document = collab
        .document(submission_id)
        .await?
        .ok_or(CheckError::NotFound { submission_id })?;

    let text = match document.text {
        Some(text) if !text.is_empty() => text,
        _ => return Err(CheckError::NoTextAvailable { submission_id }),
    };

    move_to(collab, submission_id, SubmissionStatus::CheckPending).await?;

    let peers = collab.peers_for(document.assignment_id, submission_id).await?;

    // Only the first peer is highlighted, whichever peer scored highest
    let highlighted_text = peers
        .first()
        .map(|reference| highlight(&text, reference))
        .unwrap_or_default();

    let comparison = compare_corpus(&text, peers, options).await;
    let detailed_report = report::generate(&comparison.aggregate);

    let result = SimilarityResult::from_comparison(
        submission_id,
        &comparison,
        detailed_report,
        highlighted_text,
        Utc::now(),
    );

    collab.accept(&result).await?;

    move_to(collab, submission_id, SubmissionStatus::CheckComplete).await?;

    info!(
        submission_id,
        score = format!("{:.2}", result.similarity_score),
        max = format!("{:.2}", result.max_score),
        compared = result.total_comparisons,
        skipped = result.skipped_comparisons,
        "Similarity check completed"
    );

    Ok(result)
}

async fn move_to<T>(tracker: &T, submission_id: i64, to: SubmissionStatus) -> Result<(), CheckError>
where
    T: StatusTracker + ?Sized,
{
    tracker
        .transition(submission_id, to)
        .await
        .map_err(CheckError::from_collaborator)?;
    info!(submission_id, status = %to, "Submission status updated");
    Ok(())
}
