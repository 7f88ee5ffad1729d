// Document similarity engine.
//
// One candidate text is compared against a corpus of peer texts:
//
//   raw text -> normalized text -> (3-gram shingle set, term-frequency vector)
//            -> pairwise score -> corpus aggregate -> report / highlight
//
// Every function in here is a pure function of its inputs. Nothing holds
// state across calls, so any of it can run on any thread.

pub mod corpus;
pub mod highlight;
pub mod normalize;
pub mod pairwise;
pub mod report;
pub mod shingling;

pub use corpus::{
    compare_against_corpus, compare_corpus, pairwise_scores, CompareOptions, ComparisonAggregate,
    CorpusComparison,
};
pub use highlight::highlight;
pub use normalize::{normalize, NormalizedText};
pub use pairwise::{
    combined_score, cosine, jaccard, score_pair, term_frequency, PairwiseScore, TextProfile,
};
pub use report::{generate, Severity};
pub use shingling::{shingles, SHINGLE_SIZE};
