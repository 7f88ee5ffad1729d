// Narrative report text for a comparison aggregate.
//
// The layout and wording are consumed by existing tooling, so the field
// labels and severity lines must stay byte-for-byte stable.

use serde::{Deserialize, Serialize};

use super::corpus::ComparisonAggregate;

pub const REPORT_HEADER: &str = "=== Plagiarism Detection Report ===";

/// Severity band for the primary (mean) similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Note,
    Warning,
    Critical,
}

impl Severity {
    /// Band a 0-100 score. Checked high to low, first match wins.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 80.0 => Severity::Critical,
            s if s >= 50.0 => Severity::Warning,
            s if s >= 20.0 => Severity::Note,
            _ => Severity::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Note => "Note",
            Severity::Warning => "Warning",
            Severity::Critical => "Critical",
        }
    }

    /// The severity line as it appears in the report.
    pub fn report_line(&self) -> &'static str {
        match self {
            Severity::Critical => "⚠️ CRITICAL: Very high similarity detected!",
            Severity::Warning => "⚠️ WARNING: High similarity detected.",
            Severity::Note => "ℹ️ NOTE: Moderate similarity detected.",
            Severity::Low => "✓ Low similarity - likely original work.",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Render the fixed-format report for an aggregate.
pub fn generate(aggregate: &ComparisonAggregate) -> String {
    let severity = Severity::from_score(aggregate.similarity_score());

    let mut report = String::new();
    report.push_str(REPORT_HEADER);
    report.push('\n');
    report.push_str(&format!(
        "Similarity Score: {:.2}%\n",
        aggregate.similarity_score()
    ));
    report.push_str(&format!("Average Score: {:.2}%\n", aggregate.average_score));
    report.push_str(&format!("Maximum Score: {:.2}%\n", aggregate.max_score));
    report.push_str(&format!(
        "Total Comparisons: {}\n",
        aggregate.total_compared
    ));
    report.push_str(&format!(
        "Matched Comparisons: {}\n",
        aggregate.matched_count
    ));
    report.push('\n');
    report.push_str(severity.report_line());

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate_with_mean(mean: f64) -> ComparisonAggregate {
        ComparisonAggregate {
            mean_score: mean,
            max_score: mean,
            average_score: mean,
            total_compared: 1,
            matched_count: usize::from(mean > 0.0),
        }
    }

    #[test]
    fn test_exact_layout() {
        let agg = ComparisonAggregate {
            mean_score: 42.5,
            max_score: 85.0,
            average_score: 42.5,
            total_compared: 4,
            matched_count: 3,
        };
        let expected = "=== Plagiarism Detection Report ===\n\
                        Similarity Score: 42.50%\n\
                        Average Score: 42.50%\n\
                        Maximum Score: 85.00%\n\
                        Total Comparisons: 4\n\
                        Matched Comparisons: 3\n\
                        \n\
                        ℹ️ NOTE: Moderate similarity detected.";
        assert_eq!(generate(&agg), expected);
    }

    #[test]
    fn test_band_boundaries() {
        assert!(generate(&aggregate_with_mean(80.0)).contains("CRITICAL"));
        assert!(generate(&aggregate_with_mean(79.99)).contains("WARNING"));
        assert!(generate(&aggregate_with_mean(50.0)).contains("WARNING"));
        assert!(generate(&aggregate_with_mean(49.99)).contains("NOTE"));
        assert!(generate(&aggregate_with_mean(20.0)).contains("NOTE"));
        assert!(generate(&aggregate_with_mean(19.99)).contains("likely original work"));
    }

    #[test]
    fn test_exactly_one_severity_line() {
        let report = generate(&aggregate_with_mean(95.0));
        let lines = [
            Severity::Critical,
            Severity::Warning,
            Severity::Note,
            Severity::Low,
        ]
        .iter()
        .filter(|s| report.contains(s.report_line()))
        .count();
        assert_eq!(lines, 1);
    }

    #[test]
    fn test_band_uses_mean_not_max() {
        let agg = ComparisonAggregate {
            mean_score: 10.0,
            max_score: 95.0,
            average_score: 10.0,
            total_compared: 2,
            matched_count: 2,
        };
        assert!(generate(&agg).contains("likely original work"));
    }

    #[test]
    fn test_severity_from_score() {
        assert_eq!(Severity::from_score(100.0), Severity::Critical);
        assert_eq!(Severity::from_score(0.0), Severity::Low);
        assert_eq!(Severity::from_score(f64::NAN), Severity::Low);
    }
}
