// Pairwise scoring: Jaccard over shingle sets blended with cosine over
// term-frequency vectors.
//
//   combined = (jaccard * 0.4 + cosine * 0.6) * 100
//
// The weights and the shingle size are fixed constants. Existing stored
// scores were produced with exactly these values, so changing them would
// make old and new results incomparable.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::normalize::{normalize, NormalizedText};
use super::shingling::{shingles, SHINGLE_SIZE};

pub const JACCARD_WEIGHT: f64 = 0.4;
pub const COSINE_WEIGHT: f64 = 0.6;

/// Similarity of one (candidate, peer) pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PairwiseScore {
    /// Shingle-set overlap, 0.0 to 1.0
    pub jaccard: f64,
    /// Term-frequency cosine, 0.0 to 1.0
    pub cosine: f64,
    /// Weighted blend, 0.0 to 100.0
    pub combined: f64,
}

/// Jaccard similarity `|A ∩ B| / |A ∪ B|`.
///
/// Returns 0.0 if either set is empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;

    intersection as f64 / union as f64
}

/// Count occurrences of each whitespace-delimited token.
pub fn term_frequency(text: &NormalizedText) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for token in text.tokens() {
        *counts.entry(token.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Cosine similarity between two term-frequency vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub fn cosine(a: &HashMap<String, u32>, b: &HashMap<String, u32>) -> f64 {
    // Walk the smaller map for the dot product
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let dot: f64 = small
        .iter()
        .filter_map(|(term, &count_a)| {
            large
                .get(term)
                .map(|&count_b| count_a as f64 * count_b as f64)
        })
        .sum();

    let norm_a = magnitude(a);
    let norm_b = magnitude(b);

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    // sqrt rounding can push identical vectors a hair above 1.0
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

fn magnitude(v: &HashMap<String, u32>) -> f64 {
    v.values()
        .map(|&c| {
            let c = c as f64;
            c * c
        })
        .sum::<f64>()
        .sqrt()
}

/// A text prepared for comparison: normalized once, with its shingle set
/// and term-frequency vector precomputed.
///
/// The corpus comparator builds one of these for the candidate and reuses
/// it against every peer.
#[derive(Debug, Clone)]
pub struct TextProfile {
    normalized: NormalizedText,
    shingles: HashSet<String>,
    term_frequency: HashMap<String, u32>,
}

impl TextProfile {
    /// Prepare raw text. `None` for empty input, which always scores 0.
    pub fn new(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }

        let normalized = normalize(raw);
        let shingles = shingles(&normalized, SHINGLE_SIZE);
        let term_frequency = term_frequency(&normalized);

        Some(Self {
            normalized,
            shingles,
            term_frequency,
        })
    }

    pub fn normalized(&self) -> &NormalizedText {
        &self.normalized
    }

    pub fn shingles(&self) -> &HashSet<String> {
        &self.shingles
    }

    pub fn term_frequency(&self) -> &HashMap<String, u32> {
        &self.term_frequency
    }

    /// Score this profile against another.
    ///
    /// A side with no shingles (fewer than three tokens) carries no evidence,
    /// and the whole pair scores 0.
    pub fn score_against(&self, other: &TextProfile) -> PairwiseScore {
        if self.shingles.is_empty() || other.shingles.is_empty() {
            return PairwiseScore::default();
        }

        let jaccard = jaccard(&self.shingles, &other.shingles);
        let cosine = cosine(&self.term_frequency, &other.term_frequency);
        let combined =
            ((jaccard * JACCARD_WEIGHT + cosine * COSINE_WEIGHT) * 100.0).clamp(0.0, 100.0);

        PairwiseScore {
            jaccard,
            cosine,
            combined,
        }
    }
}

/// Full pairwise score for two raw texts.
pub fn score_pair(text_a: &str, text_b: &str) -> PairwiseScore {
    match (TextProfile::new(text_a), TextProfile::new(text_b)) {
        (Some(a), Some(b)) => a.score_against(&b),
        _ => PairwiseScore::default(),
    }
}

/// Combined similarity of two raw texts, 0.0 to 100.0.
///
/// Empty input on either side returns 0 without normalizing anything.
pub fn combined_score(text_a: &str, text_b: &str) -> f64 {
    score_pair(text_a, text_b).combined
}
