// Errors surfaced by the similarity-check workflow.
//
// The scoring engine itself never fails; these cover the preconditions and
// collaborator calls around it.

use thiserror::Error;

use super::status::TransitionError;

#[derive(Debug, Error)]
pub enum CheckError {
    /// No such document in the store
    #[error("Submission {submission_id} not found")]
    NotFound { submission_id: i64 },

    /// The document exists but has no extracted text to compare
    #[error("No text extracted from submission {submission_id}")]
    NoTextAvailable { submission_id: i64 },

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    /// A store, tracker or sink call failed
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

impl CheckError {
    /// Split a collaborator error into a transition rejection if that is
    /// what it carries.
    pub fn from_collaborator(err: anyhow::Error) -> Self {
        match err.downcast::<TransitionError>() {
            Ok(transition) => CheckError::InvalidTransition(transition),
            Err(other) => CheckError::Collaborator(other),
        }
    }
}
