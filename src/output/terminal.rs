// Colored terminal output for similarity results and submissions.
//
// This module handles all terminal-specific formatting. The main.rs command
// handlers delegate here.

use colored::Colorize;

use crate::db::models::{SimilarityResult, Submission};
use crate::similarity::highlight::{MATCH_PREFIX, MATCH_SUFFIX};
use crate::similarity::Severity;
use crate::workflow::SubmissionStatus;

/// Longest highlighted preview printed before truncating.
const HIGHLIGHT_PREVIEW_CHARS: usize = 600;

/// Display one similarity result: the stored report, then the highlight.
pub fn display_result(result: &SimilarityResult) {
    println!(
        "\n{}",
        format!("=== Similarity check for submission {} ===", result.submission_id).bold()
    );
    println!(
        "  Severity: {}  (checked {})",
        colorize_severity(result.severity()),
        result.checked_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if result.skipped_comparisons > 0 {
        println!(
            "  {} deadline reached, {} peer(s) not compared",
            "Partial:".yellow().bold(),
            result.skipped_comparisons
        );
    }
    println!();

    for line in result.detailed_report.lines() {
        println!("  {line}");
    }

    if !result.highlighted_text.is_empty() {
        println!("\n  {}", "Overlap with first peer:".dimmed());
        let preview = super::truncate_chars(&result.highlighted_text, HIGHLIGHT_PREVIEW_CHARS);
        println!("  {}", colorize_highlight(&preview));
    }
    println!();
}

/// Display an assignment's results ranked by similarity score.
pub fn display_results_table(assignment_id: i64, results: &[SimilarityResult]) {
    if results.is_empty() {
        println!(
            "No similarity results for assignment {assignment_id}. \
             Run `simcheck check-all {assignment_id}` first."
        );
        return;
    }

    println!(
        "\n{}",
        format!(
            "=== Similarity Results: assignment {} ({} submissions) ===",
            assignment_id,
            results.len()
        )
        .bold()
    );
    println!();

    println!(
        "  {:>4}  {:>10}  {:>7}  {:>7}  {:>8}  {:<9}",
        "Rank".dimmed(),
        "Submission".dimmed(),
        "Score".dimmed(),
        "Max".dimmed(),
        "Compared".dimmed(),
        "Severity".dimmed(),
    );
    println!("  {}", "-".repeat(56).dimmed());

    for (i, result) in results.iter().enumerate() {
        println!(
            "  {:>4}. {:>10}  {:>6.2}%  {:>6.2}%  {:>8}  {}",
            i + 1,
            result.submission_id,
            result.similarity_score,
            result.max_score,
            result.total_comparisons,
            colorize_severity(result.severity()),
        );
    }

    println!();

    let critical = results
        .iter()
        .filter(|r| r.severity() == Severity::Critical)
        .count();
    let warning = results
        .iter()
        .filter(|r| r.severity() == Severity::Warning)
        .count();

    if critical > 0 {
        println!("  {} {} critical submissions", "!!".red().bold(), critical);
    }
    if warning > 0 {
        println!("  {} {} warning submissions", "!".bright_red(), warning);
    }
}

/// Display a single submission's details.
pub fn display_submission(submission: &Submission) {
    println!(
        "\n{}",
        format!("=== Submission {} ===", submission.id).bold()
    );
    println!("  Assignment: {}", submission.assignment_id);
    println!("  Student: {}", submission.student_id);
    println!("  File: {}", submission.file_name);
    println!("  Status: {}", colorize_status(submission.status));
    if let Some(score) = submission.score {
        println!("  Grade: {score}");
    }
    if let Some(feedback) = &submission.feedback {
        println!("  Feedback: {}", super::truncate_chars(feedback, 200).dimmed());
    }
    match &submission.extracted_text {
        Some(text) => println!("  Text: {} chars", text.chars().count()),
        None => println!("  Text: {}", "none extracted".yellow()),
    }
}

/// Display every submission of an assignment, oldest first.
pub fn display_submissions_table(assignment_id: i64, submissions: &[Submission]) {
    if submissions.is_empty() {
        println!("No submissions for assignment {assignment_id}.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Assignment {assignment_id} ({} submissions) ===", submissions.len()).bold()
    );
    println!(
        "  {:>10}  {:>7}  {:<28}  {:>5}  {}",
        "Submission".dimmed(),
        "Student".dimmed(),
        "Status".dimmed(),
        "Grade".dimmed(),
        "File".dimmed(),
    );
    println!("  {}", "-".repeat(72).dimmed());

    for submission in submissions {
        let grade = submission
            .score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>10}  {:>7}  {:<28}  {:>5}  {}",
            submission.id,
            submission.student_id,
            colorize_status(submission.status),
            grade,
            super::truncate_chars(&submission.file_name, 40),
        );
    }
}

/// Display how many submissions sit in each status.
pub fn display_status_counts(counts: &[(SubmissionStatus, i64)]) {
    if counts.is_empty() {
        println!("Submissions: none yet");
        return;
    }
    let total: i64 = counts.iter().map(|(_, n)| n).sum();
    println!("Submissions: {total}");
    for (status, count) in counts {
        println!("  {:<28} {:>6}", colorize_status(*status), count);
    }
}

/// Render `[SIMILAR:token]` markers as colored tokens.
pub fn colorize_highlight(highlighted: &str) -> String {
    highlighted
        .split(' ')
        .map(|token| {
            match token
                .strip_prefix(MATCH_PREFIX)
                .and_then(|t| t.strip_suffix(MATCH_SUFFIX))
            {
                Some(matched) => matched.red().bold().to_string(),
                None => token.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Colorize a severity band.
fn colorize_severity(severity: Severity) -> colored::ColoredString {
    let label = severity.as_str();
    match severity {
        Severity::Critical => label.red().bold(),
        Severity::Warning => label.bright_red(),
        Severity::Note => label.yellow(),
        Severity::Low => label.green(),
    }
}

fn colorize_status(status: SubmissionStatus) -> colored::ColoredString {
    let label = status.as_str();
    match status {
        SubmissionStatus::CheckPending => label.yellow(),
        SubmissionStatus::CheckComplete => label.green(),
        SubmissionStatus::Graded | SubmissionStatus::Returned => label.dimmed(),
        _ => label.normal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colorize_highlight_strips_markers() {
        colored::control::set_override(false);
        assert_eq!(
            colorize_highlight("[SIMILAR:the] cat [SIMILAR:sat]"),
            "the cat sat"
        );
        assert_eq!(colorize_highlight(""), "");
    }
}
