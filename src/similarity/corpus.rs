// Corpus comparison: one candidate against every peer, aggregated.
//
// Two entry points share the same per-pair scoring:
// - `compare_against_corpus` runs sequentially and is the reference.
// - `compare_corpus` fans out over a bounded pool of blocking tasks and can
//   stop at a deadline, aggregating only the pairs that finished.
//
// Per-pair results always come back in corpus order even though the pool
// completes them out of order.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::pairwise::TextProfile;

/// Aggregate statistics for one candidate over a corpus.
///
/// Note the primary similarity signal is the MEAN pairwise score, not the
/// maximum. `average_score` duplicates it under its own label; only
/// `max_score` carries the peak.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ComparisonAggregate {
    /// Mean pairwise score, rounded half-up to 2 decimals
    pub mean_score: f64,
    /// Highest pairwise score, rounded half-up to 2 decimals
    pub max_score: f64,
    /// Same value as `mean_score`
    pub average_score: f64,
    pub total_compared: usize,
    /// Pairs with a score above zero
    pub matched_count: usize,
}

impl ComparisonAggregate {
    /// Aggregate a list of pairwise scores. Empty input gives all zeros.
    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }

        let total = scores.len();
        let matched = scores.iter().filter(|&&s| s > 0.0).count();
        let max = scores.iter().copied().fold(0.0_f64, f64::max);
        let mean = scores.iter().sum::<f64>() / total as f64;
        let mean = round_half_up(mean);

        Self {
            mean_score: mean,
            max_score: round_half_up(max),
            average_score: mean,
            total_compared: total,
            matched_count: matched,
        }
    }

    /// The externally visible "similarity score".
    pub fn similarity_score(&self) -> f64 {
        self.mean_score
    }
}

/// Round to 2 decimal places, ties away from zero for positive values.
pub fn round_half_up(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

fn score_peer(candidate: Option<&TextProfile>, peer: &str) -> f64 {
    match (candidate, TextProfile::new(peer)) {
        (Some(candidate), Some(peer)) => candidate.score_against(&peer).combined,
        _ => 0.0,
    }
}

/// Combined score of the candidate against each peer, in corpus order.
pub fn pairwise_scores<S: AsRef<str>>(candidate: &str, corpus: &[S]) -> Vec<f64> {
    let candidate = TextProfile::new(candidate);
    corpus
        .iter()
        .map(|peer| score_peer(candidate.as_ref(), peer.as_ref()))
        .collect()
}

/// Compare a candidate against every peer text and aggregate.
pub fn compare_against_corpus<S: AsRef<str>>(candidate: &str, corpus: &[S]) -> ComparisonAggregate {
    ComparisonAggregate::from_scores(&pairwise_scores(candidate, corpus))
}

/// Worker-pool settings for `compare_corpus`.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Maximum pairwise comparisons in flight (at least 1)
    pub concurrency: usize,
    /// Stop waiting after this long and aggregate what finished
    pub deadline: Option<Duration>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            deadline: None,
        }
    }
}

/// Result of a concurrent corpus comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusComparison {
    /// One entry per peer, in corpus order. `None` if the pair did not
    /// finish before the deadline.
    pub pair_scores: Vec<Option<f64>>,
    /// Statistics over the completed pairs only
    pub aggregate: ComparisonAggregate,
    /// Number of peers handed in
    pub requested: usize,
    /// Peers left out of the aggregate
    pub skipped: usize,
}

impl CorpusComparison {
    pub fn is_partial(&self) -> bool {
        self.skipped > 0
    }
}

/// Compare a candidate against a corpus on a bounded pool of blocking tasks.
///
/// With a deadline, comparisons still in flight when it passes are dropped;
/// `aggregate.total_compared` then counts only completed pairs and
/// `skipped` says how many were left out.
pub async fn compare_corpus(
    candidate: &str,
    corpus: Vec<String>,
    options: &CompareOptions,
) -> CorpusComparison {
    let requested = corpus.len();
    let concurrency = options.concurrency.max(1);
    let deadline = options
        .deadline
        .map(|d| tokio::time::Instant::now() + d);

    debug!(peers = requested, concurrency, "Starting corpus comparison");

    let candidate = Arc::new(TextProfile::new(candidate));

    let mut pending = stream::iter(corpus.into_iter().enumerate().map(|(index, peer)| {
        let candidate = Arc::clone(&candidate);
        async move {
            let result =
                tokio::task::spawn_blocking(move || score_peer((*candidate).as_ref(), &peer)).await;
            (index, result)
        }
    }))
    .buffer_unordered(concurrency);

    let mut pair_scores: Vec<Option<f64>> = vec![None; requested];

    loop {
        let next = match deadline {
            Some(at) => match tokio::time::timeout_at(at, pending.next()).await {
                Ok(next) => next,
                Err(_) => break,
            },
            None => pending.next().await,
        };

        let Some((index, result)) = next else {
            break;
        };

        match result {
            Ok(score) => pair_scores[index] = Some(score),
            Err(e) => {
                warn!(index, error = %e, "Pairwise comparison task failed, leaving it out");
            }
        }
    }

    let completed: Vec<f64> = pair_scores.iter().flatten().copied().collect();
    let skipped = requested - completed.len();
    let aggregate = ComparisonAggregate::from_scores(&completed);

    if skipped > 0 {
        warn!(
            requested,
            completed = completed.len(),
            skipped,
            "Corpus comparison incomplete, aggregate covers finished pairs only"
        );
    }

    CorpusComparison {
        pair_scores,
        aggregate,
        requested,
        skipped,
    }
}
