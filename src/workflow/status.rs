// Submission lifecycle state machine.
//
//   SUBMITTED -> PLAGIARISM_CHECK_PENDING -> PLAGIARISM_CHECK_COMPLETE
//
// with UNDER_REVIEW as an alternate intermediate state and GRADED / RETURNED
// reached through the grading path. Anything not listed in
// `can_transition_to` is rejected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    Submitted,
    UnderReview,
    #[serde(rename = "PLAGIARISM_CHECK_PENDING")]
    CheckPending,
    #[serde(rename = "PLAGIARISM_CHECK_COMPLETE")]
    CheckComplete,
    Graded,
    Returned,
}

/// A move the state machine does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move submission from {from} to {to}")]
pub struct TransitionError {
    pub from: SubmissionStatus,
    pub to: SubmissionStatus,
}

/// A status string that names no known state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown submission status: {0}")]
pub struct UnknownStatus(pub String);

impl SubmissionStatus {
    pub const ALL: [SubmissionStatus; 6] = [
        SubmissionStatus::Submitted,
        SubmissionStatus::UnderReview,
        SubmissionStatus::CheckPending,
        SubmissionStatus::CheckComplete,
        SubmissionStatus::Graded,
        SubmissionStatus::Returned,
    ];

    /// Whether `self -> to` is a legal move.
    pub fn can_transition_to(self, to: SubmissionStatus) -> bool {
        use SubmissionStatus::*;

        matches!(
            (self, to),
            (Submitted, UnderReview | CheckPending | Graded)
                | (UnderReview, CheckPending | Graded | Returned)
                // Pending -> Pending is a retry after a failed check
                | (CheckPending, CheckPending | CheckComplete)
                | (CheckComplete, UnderReview | CheckPending | Graded | Returned)
                | (Graded, Graded | Returned)
        )
    }

    /// Validate a move, returning the new state.
    pub fn transition(self, to: SubmissionStatus) -> Result<SubmissionStatus, TransitionError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(TransitionError { from: self, to })
        }
    }

    /// Every state reachable in one move, in declaration order.
    pub fn next_states(self) -> Vec<SubmissionStatus> {
        Self::ALL
            .into_iter()
            .filter(|&to| self.can_transition_to(to))
            .collect()
    }

    pub fn is_terminal(self) -> bool {
        self.next_states().is_empty()
    }

    /// Parse a name as a person types it: case-insensitive, `-` for `_`.
    pub fn parse_lenient(raw: &str) -> Result<SubmissionStatus, UnknownStatus> {
        raw.trim().to_ascii_uppercase().replace('-', "_").parse()
    }

    /// Stored / wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Submitted => "SUBMITTED",
            SubmissionStatus::UnderReview => "UNDER_REVIEW",
            SubmissionStatus::CheckPending => "PLAGIARISM_CHECK_PENDING",
            SubmissionStatus::CheckComplete => "PLAGIARISM_CHECK_COMPLETE",
            SubmissionStatus::Graded => "GRADED",
            SubmissionStatus::Returned => "RETURNED",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
