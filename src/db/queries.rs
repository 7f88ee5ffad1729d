// Database queries: CRUD operations for all tables.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust interfaces.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::models::{SimilarityResult, Submission};
use crate::workflow::{Document, SubmissionStatus};

impl ToSql for SubmissionStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for SubmissionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

const SUBMISSION_COLUMNS: &str = "id, assignment_id, student_id, file_name, extracted_text, \
     status, score, feedback, created_at, updated_at";

fn submission_from_row(row: &Row<'_>) -> rusqlite::Result<Submission> {
    Ok(Submission {
        id: row.get(0)?,
        assignment_id: row.get(1)?,
        student_id: row.get(2)?,
        file_name: row.get(3)?,
        extracted_text: row.get(4)?,
        status: row.get(5)?,
        score: row.get(6)?,
        feedback: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

// --- Submissions ---

/// Store a new submission in SUBMITTED state and return its id.
///
/// An earlier submission by the same student for the same assignment is
/// removed first, together with its similarity result.
pub fn add_submission(
    conn: &Connection,
    assignment_id: i64,
    student_id: i64,
    file_name: &str,
    extracted_text: Option<&str>,
) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "DELETE FROM similarity_results WHERE submission_id IN
            (SELECT id FROM submissions WHERE assignment_id = ?1 AND student_id = ?2)",
        params![assignment_id, student_id],
    )?;
    tx.execute(
        "DELETE FROM submissions WHERE assignment_id = ?1 AND student_id = ?2",
        params![assignment_id, student_id],
    )?;
    tx.execute(
        "INSERT INTO submissions (assignment_id, student_id, file_name, extracted_text, status)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            assignment_id,
            student_id,
            file_name,
            extracted_text,
            SubmissionStatus::Submitted
        ],
    )?;
    let id = tx.last_insert_rowid();

    tx.commit().context("Failed to store submission")?;
    Ok(id)
}

/// Load a submission by id.
pub fn get_submission(conn: &Connection, id: i64) -> Result<Option<Submission>> {
    let sql = format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = ?1");
    let result = conn
        .query_row(&sql, params![id], submission_from_row)
        .optional()?;
    Ok(result)
}

/// All submissions for an assignment, oldest first.
pub fn list_submissions(conn: &Connection, assignment_id: i64) -> Result<Vec<Submission>> {
    let sql = format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE assignment_id = ?1 ORDER BY id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![assignment_id], submission_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// The workflow's view of a submission.
pub fn get_document(conn: &Connection, id: i64) -> Result<Option<Document>> {
    let result = conn
        .query_row(
            "SELECT id, assignment_id, extracted_text FROM submissions WHERE id = ?1",
            params![id],
            |row| {
                Ok(Document {
                    id: row.get(0)?,
                    assignment_id: row.get(1)?,
                    text: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(result)
}

/// Extracted texts of the other submissions in an assignment, by ascending id.
/// Submissions without extracted text are left out.
pub fn peer_texts(conn: &Connection, assignment_id: i64, excluding: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT extracted_text FROM submissions
         WHERE assignment_id = ?1 AND id != ?2 AND extracted_text IS NOT NULL
         ORDER BY id",
    )?;
    let texts = stmt
        .query_map(params![assignment_id, excluding], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(texts)
}

// --- Status ---

pub fn get_status(conn: &Connection, id: i64) -> Result<Option<SubmissionStatus>> {
    let status: Option<SubmissionStatus> = conn
        .query_row(
            "SELECT status FROM submissions WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(status)
}

/// Move a submission to a new status through the state machine.
///
/// The update is conditional on the status read, so a concurrent writer
/// makes this fail instead of being silently overwritten.
pub fn transition_status(
    conn: &Connection,
    id: i64,
    to: SubmissionStatus,
) -> Result<SubmissionStatus> {
    let Some(from) = get_status(conn, id)? else {
        anyhow::bail!("Submission {id} not found");
    };
    let to = from.transition(to)?;

    let changed = conn.execute(
        "UPDATE submissions SET status = ?1, updated_at = datetime('now')
         WHERE id = ?2 AND status = ?3",
        params![to, id, from],
    )?;
    if changed == 0 {
        anyhow::bail!("Submission {id} changed status concurrently (expected {from})");
    }
    Ok(to)
}

/// Record a grade and move the submission to GRADED.
pub fn grade_submission(conn: &Connection, id: i64, score: i64, feedback: &str) -> Result<()> {
    let Some(from) = get_status(conn, id)? else {
        anyhow::bail!("Submission {id} not found");
    };
    let to = from.transition(SubmissionStatus::Graded)?;

    let changed = conn.execute(
        "UPDATE submissions
         SET status = ?1, score = ?2, feedback = ?3, updated_at = datetime('now')
         WHERE id = ?4 AND status = ?5",
        params![to, score, feedback, id, from],
    )?;
    if changed == 0 {
        anyhow::bail!("Submission {id} changed status concurrently (expected {from})");
    }
    Ok(())
}

/// Number of submissions in each status (statuses with none are omitted).
pub fn status_counts(conn: &Connection) -> Result<Vec<(SubmissionStatus, i64)>> {
    let mut stmt =
        conn.prepare("SELECT status, COUNT(*) FROM submissions GROUP BY status ORDER BY status")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, SubmissionStatus>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

// --- Similarity results ---

const RESULT_COLUMNS: &str = "submission_id, similarity_score, average_score, max_score, \
     total_comparisons, matched_comparisons, skipped_comparisons, detailed_report, \
     highlighted_text, checked_at";

fn result_from_row(row: &Row<'_>) -> rusqlite::Result<SimilarityResult> {
    let checked_at: String = row.get(9)?;
    let checked_at = DateTime::parse_from_rfc3339(&checked_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?;

    Ok(SimilarityResult {
        submission_id: row.get(0)?,
        similarity_score: row.get(1)?,
        average_score: row.get(2)?,
        max_score: row.get(3)?,
        total_comparisons: row.get::<_, i64>(4)? as usize,
        matched_comparisons: row.get::<_, i64>(5)? as usize,
        skipped_comparisons: row.get::<_, i64>(6)? as usize,
        detailed_report: row.get(7)?,
        highlighted_text: row.get(8)?,
        checked_at,
    })
}

/// Save a similarity result, replacing any earlier one for the submission.
pub fn upsert_result(conn: &Connection, result: &SimilarityResult) -> Result<()> {
    conn.execute(
        "INSERT INTO similarity_results
            (submission_id, similarity_score, average_score, max_score,
             total_comparisons, matched_comparisons, skipped_comparisons,
             detailed_report, highlighted_text, checked_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(submission_id) DO UPDATE SET
            similarity_score = ?2,
            average_score = ?3,
            max_score = ?4,
            total_comparisons = ?5,
            matched_comparisons = ?6,
            skipped_comparisons = ?7,
            detailed_report = ?8,
            highlighted_text = ?9,
            checked_at = ?10",
        params![
            result.submission_id,
            result.similarity_score,
            result.average_score,
            result.max_score,
            result.total_comparisons as i64,
            result.matched_comparisons as i64,
            result.skipped_comparisons as i64,
            result.detailed_report,
            result.highlighted_text,
            result.checked_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Load the latest similarity result for a submission.
pub fn get_result(conn: &Connection, submission_id: i64) -> Result<Option<SimilarityResult>> {
    let sql = format!("SELECT {RESULT_COLUMNS} FROM similarity_results WHERE submission_id = ?1");
    let result = conn
        .query_row(&sql, params![submission_id], result_from_row)
        .optional()?;
    Ok(result)
}

/// Results for every checked submission in an assignment, highest
/// similarity score first.
pub fn results_for_assignment(
    conn: &Connection,
    assignment_id: i64,
) -> Result<Vec<SimilarityResult>> {
    let mut stmt = conn.prepare(
        "SELECT r.submission_id, r.similarity_score, r.average_score, r.max_score,
                r.total_comparisons, r.matched_comparisons, r.skipped_comparisons,
                r.detailed_report, r.highlighted_text, r.checked_at
         FROM similarity_results r
         JOIN submissions s ON s.id = r.submission_id
         WHERE s.assignment_id = ?1
         ORDER BY r.similarity_score DESC, r.submission_id",
    )?;
    let rows = stmt
        .query_map(params![assignment_id], result_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
