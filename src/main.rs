use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use simcheck::config::Config;
use simcheck::db::Database;
use simcheck::output::terminal;
use simcheck::similarity::{self, report};
use simcheck::workflow::{self, CheckError, StatusTracker, SubmissionStatus, TransitionError};

/// Simcheck: similarity checking for assignment submissions.
///
/// Compares each submission against the other submissions for the same
/// assignment and reports how much of it overlaps.
#[derive(Parser)]
#[command(name = "simcheck", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Register a submission from an already-extracted plain text file
    Submit {
        /// Assignment the submission belongs to
        #[arg(long)]
        assignment: i64,

        /// Submitting student
        #[arg(long)]
        student: i64,

        /// UTF-8 text file holding the extracted text
        file: PathBuf,
    },

    /// Run a similarity check for one submission
    Check {
        submission_id: i64,

        /// Print the stored result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check every submission with text in an assignment
    CheckAll { assignment_id: i64 },

    /// Show the stored similarity result for a submission
    Result {
        submission_id: i64,

        #[arg(long)]
        json: bool,
    },

    /// List an assignment's results, highest similarity first
    Results {
        assignment_id: i64,

        #[arg(long)]
        json: bool,
    },

    /// List an assignment's submissions with their status
    Submissions {
        assignment_id: i64,

        #[arg(long)]
        json: bool,
    },

    /// Move a submission to another lifecycle state (e.g. UNDER_REVIEW, RETURNED)
    Transition {
        submission_id: i64,

        /// Target state; case-insensitive, `-` accepted for `_`
        #[arg(value_parser = SubmissionStatus::parse_lenient)]
        status: SubmissionStatus,
    },

    /// Grade a submission
    Grade {
        submission_id: i64,

        /// Numeric grade
        score: i64,

        #[arg(long, default_value = "")]
        feedback: String,
    },

    /// Compare text files directly, without the database
    Compare {
        /// The candidate text file
        candidate: PathBuf,

        /// Peer text files, in comparison order (the first is highlighted)
        #[arg(required = true)]
        peers: Vec<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Show database status (submissions per state)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("simcheck=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing simcheck database...");
            let db = simcheck::db::initialize_sqlite(&config.db_path)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nNext: simcheck submit --assignment <id> --student <id> <file.txt>");
        }

        Commands::Submit {
            assignment,
            student,
            file,
        } => {
            let db = simcheck::db::open_sqlite(&config.db_path)?;
            let text = read_text(&file)?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());

            let extracted = if text.trim().is_empty() {
                warn!(file = %file.display(), "No text in submission file");
                None
            } else {
                Some(text.as_str())
            };

            let id = db
                .add_submission(assignment, student, &file_name, extracted)
                .await?;
            info!(submission_id = id, assignment, student, "Submission stored");
            println!("Submission {id} stored for assignment {assignment}.");
            if extracted.is_none() {
                println!(
                    "{}",
                    "Warning: no text found, this submission cannot be checked.".yellow()
                );
            }
        }

        Commands::Check {
            submission_id,
            json,
        } => {
            let db = simcheck::db::open_sqlite(&config.db_path)?;
            let result =
                workflow::check_submission(db.as_ref(), submission_id, &config.compare_options())
                    .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                terminal::display_result(&result);
            }
        }

        Commands::CheckAll { assignment_id } => {
            let db = simcheck::db::open_sqlite(&config.db_path)?;
            let (checked, failed) = check_assignment(&db, assignment_id, &config).await?;
            println!("\n{}", "Check complete.".bold());
            println!("  Submissions checked: {checked}");
            if failed > 0 {
                println!("  Failed: {}", failed.to_string().red());
            }
            let results = db.results_for_assignment(assignment_id).await?;
            terminal::display_results_table(assignment_id, &results);
        }

        Commands::Result {
            submission_id,
            json,
        } => {
            let db = simcheck::db::open_sqlite(&config.db_path)?;
            let Some(submission) = db.get_submission(submission_id).await? else {
                anyhow::bail!("Submission {submission_id} not found");
            };
            match db.get_result(submission_id).await? {
                Some(result) if json => println!("{}", serde_json::to_string_pretty(&result)?),
                Some(result) => {
                    terminal::display_submission(&submission);
                    terminal::display_result(&result);
                }
                None => {
                    terminal::display_submission(&submission);
                    println!("\nNo similarity check yet. Run `simcheck check {submission_id}`.");
                }
            }
        }

        Commands::Results {
            assignment_id,
            json,
        } => {
            let db = simcheck::db::open_sqlite(&config.db_path)?;
            let results = db.results_for_assignment(assignment_id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                terminal::display_results_table(assignment_id, &results);
            }
        }

        Commands::Submissions {
            assignment_id,
            json,
        } => {
            let db = simcheck::db::open_sqlite(&config.db_path)?;
            let submissions = db.list_submissions(assignment_id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&submissions)?);
            } else {
                terminal::display_submissions_table(assignment_id, &submissions);
            }
        }

        Commands::Transition {
            submission_id,
            status,
        } => {
            let db = simcheck::db::open_sqlite(&config.db_path)?;
            let now = move_submission(db.as_ref(), submission_id, status).await?;
            info!(submission_id, status = %now, "Submission status updated");
            println!("Submission {submission_id} is now {now}.");
        }

        Commands::Grade {
            submission_id,
            score,
            feedback,
        } => {
            let db = simcheck::db::open_sqlite(&config.db_path)?;
            db.grade(submission_id, score, &feedback).await?;
            info!(submission_id, score, "Submission graded");
            println!("Submission {submission_id} graded: {score}");
        }

        Commands::Compare {
            candidate,
            peers,
            json,
        } => {
            let candidate_text = read_text(&candidate)?;
            let peer_texts = peers
                .iter()
                .map(|p| read_text(p))
                .collect::<Result<Vec<_>>>()?;

            let highlighted = peer_texts
                .first()
                .map(|reference| similarity::highlight(&candidate_text, reference))
                .unwrap_or_default();
            let comparison =
                similarity::compare_corpus(&candidate_text, peer_texts, &config.compare_options())
                    .await;

            if json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
                return Ok(());
            }

            println!("{}", report::generate(&comparison.aggregate));
            println!("\n{}", "Per-peer scores:".bold());
            for (path, score) in peers.iter().zip(&comparison.pair_scores) {
                match score {
                    Some(s) => println!("  {:>6.2}%  {}", s, path.display()),
                    None => println!("  {:>7}  {}", "skipped".yellow(), path.display()),
                }
            }
            if comparison.is_partial() {
                println!(
                    "\n{} {} of {} peers not compared before the deadline",
                    "Partial:".yellow().bold(),
                    comparison.skipped,
                    comparison.requested
                );
            }
            if !highlighted.is_empty() {
                println!("\n{}", "Overlap with first peer:".dimmed());
                println!("{}", terminal::colorize_highlight(&highlighted));
            }
        }

        Commands::Status => {
            if !Path::new(&config.db_path).exists() {
                println!("Database: not initialized");
                println!("\nRun `simcheck init` to set up the database.");
                return Ok(());
            }
            let db = simcheck::db::open_sqlite(&config.db_path)?;
            println!("Database: {}", config.db_path);
            println!(
                "Comparison pool: {} workers, deadline {}",
                config.concurrency,
                config
                    .deadline
                    .map(|d| format!("{} ms", d.as_millis()))
                    .unwrap_or_else(|| "none".to_string())
            );
            let counts = db.status_counts().await?;
            terminal::display_status_counts(&counts);
        }
    }

    Ok(())
}

/// Read a plain text file, with the path in the error.
fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Apply a manual status change, turning a rejected move into a message
/// that names the states the submission can actually go to.
async fn move_submission(
    tracker: &dyn Database,
    submission_id: i64,
    to: SubmissionStatus,
) -> Result<SubmissionStatus> {
    let err = match tracker.transition(submission_id, to).await {
        Ok(now) => return Ok(now),
        Err(e) => e,
    };
    let Some(rejected) = err.downcast_ref::<TransitionError>().copied() else {
        return Err(err);
    };

    let allowed: Vec<&str> = rejected
        .from
        .next_states()
        .iter()
        .map(|s| s.as_str())
        .collect();
    if allowed.is_empty() {
        anyhow::bail!("{rejected}: {} is final", rejected.from);
    }
    anyhow::bail!(
        "{rejected}; allowed from {}: {}",
        rejected.from,
        allowed.join(", ")
    )
}

/// Check every submission in an assignment that has text.
/// Returns (checked, failed). One failure does not stop the rest.
async fn check_assignment(
    db: &Arc<dyn Database>,
    assignment_id: i64,
    config: &Config,
) -> Result<(usize, usize)> {
    let submissions = db.list_submissions(assignment_id).await?;
    let checkable: Vec<_> = submissions
        .iter()
        .filter(|s| s.extracted_text.as_deref().is_some_and(|t| !t.is_empty()))
        .collect();

    if checkable.is_empty() {
        println!("No submissions with text for assignment {assignment_id}.");
        return Ok((0, 0));
    }

    println!(
        "Checking {} submissions ({} skipped without text)...",
        checkable.len(),
        submissions.len() - checkable.len()
    );

    let pb = ProgressBar::new(checkable.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Checking [{bar:30}] {pos}/{len} ({eta})")
            .expect("valid template"),
    );

    let options = config.compare_options();
    let mut checked = 0;
    let mut failed = 0;

    for submission in checkable {
        match workflow::check_submission(db.as_ref(), submission.id, &options).await {
            Ok(_) => checked += 1,
            Err(CheckError::InvalidTransition(e)) => {
                warn!(
                    submission_id = submission.id,
                    error = %e,
                    "Submission not in a checkable state, skipping"
                );
                failed += 1;
            }
            Err(e) => {
                warn!(
                    submission_id = submission.id,
                    error = %e,
                    "Similarity check failed, skipping"
                );
                failed += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok((checked, failed))
}
