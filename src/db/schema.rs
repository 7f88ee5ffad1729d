// Database schema: table creation and versioning.
//
// A `schema_version` table records the schema generation so later changes
// can be applied as versioned migrations.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
///
/// Idempotent, safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Tracks schema version for future migrations
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One row per (assignment, student); a resubmission replaces the row
        CREATE TABLE IF NOT EXISTS submissions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            assignment_id INTEGER NOT NULL,
            student_id INTEGER NOT NULL,
            file_name TEXT NOT NULL,
            extracted_text TEXT,               -- null when extraction produced nothing
            status TEXT NOT NULL DEFAULT 'SUBMITTED',
            score INTEGER,                     -- set by grading
            feedback TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Latest similarity check per submission
        CREATE TABLE IF NOT EXISTS similarity_results (
            submission_id INTEGER PRIMARY KEY REFERENCES submissions(id) ON DELETE CASCADE,
            similarity_score REAL NOT NULL,    -- mean pairwise score, 0.0 to 100.0
            average_score REAL NOT NULL,
            max_score REAL NOT NULL,
            total_comparisons INTEGER NOT NULL,
            matched_comparisons INTEGER NOT NULL,
            detailed_report TEXT NOT NULL,
            highlighted_text TEXT NOT NULL,
            skipped_comparisons INTEGER NOT NULL DEFAULT 0,  -- peers cut by a deadline
            checked_at TEXT NOT NULL           -- RFC 3339
        );

        -- Peers are looked up by assignment on every check
        CREATE INDEX IF NOT EXISTS idx_submissions_assignment
            ON submissions(assignment_id);

        CREATE UNIQUE INDEX IF NOT EXISTS idx_submissions_assignment_student
            ON submissions(assignment_id, student_id);
        ",
    )
    .context("Failed to create database tables")?;

    // Record initial schema version if not already set
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    Ok(())
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        // Running create_tables twice should not error
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
    }

    #[test]
    fn test_table_count() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        // schema_version, submissions, similarity_results
        assert_eq!(table_count(&conn).unwrap(), 3i64);
    }

    #[test]
    fn test_results_store_skipped_comparisons() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        conn.execute(
            "INSERT INTO submissions (assignment_id, student_id, file_name) VALUES (1, 1, 'a.txt')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO similarity_results
                (submission_id, similarity_score, average_score, max_score,
                 total_comparisons, matched_comparisons, detailed_report,
                 highlighted_text, checked_at, skipped_comparisons)
             VALUES (1, 0, 0, 0, 0, 0, '', '', '2024-01-01T00:00:00Z', 4)",
            [],
        )
        .unwrap();

        let skipped: i64 = conn
            .query_row(
                "SELECT skipped_comparisons FROM similarity_results WHERE submission_id = 1",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(skipped, 4);
    }

    #[test]
    fn test_schema_version_recorded_once() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();

        let versions: Vec<i64> = conn
            .prepare("SELECT version FROM schema_version ORDER BY version")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(versions, vec![1]);
    }
}
