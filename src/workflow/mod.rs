// Similarity-check workflow: lifecycle state machine, collaborator traits,
// and the orchestration that ties the engine to them.

pub mod check;
pub mod errors;
pub mod memory;
pub mod status;
pub mod traits;

pub use check::check_submission;
pub use errors::CheckError;
pub use status::{SubmissionStatus, TransitionError, UnknownStatus};
pub use traits::{Document, DocumentStore, ReportSink, StatusTracker};
