// Word shingles: contiguous runs of SHINGLE_SIZE tokens.

use std::collections::HashSet;

use super::normalize::NormalizedText;

/// Tokens per shingle. Fixed so scores stay comparable across runs.
pub const SHINGLE_SIZE: usize = 3;

/// Build the deduplicated set of `n`-token shingles from normalized text.
///
/// Returns the empty set when the text has fewer than `n` tokens (or `n` is 0).
pub fn shingles(text: &NormalizedText, n: usize) -> HashSet<String> {
    let tokens: Vec<&str> = text.tokens().collect();
    if n == 0 || tokens.len() < n {
        return HashSet::new();
    }

    tokens.windows(n).map(|window| window.join(" ")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::normalize::normalize;

    #[test]
    fn test_basic_windows() {
        let set = shingles(&normalize("the quick brown fox"), SHINGLE_SIZE);
        assert_eq!(set.len(), 2);
        assert!(set.contains("the quick brown"));
        assert!(set.contains("quick brown fox"));
    }

    #[test]
    fn test_too_short() {
        assert!(shingles(&normalize("two words"), SHINGLE_SIZE).is_empty());
        assert!(shingles(&normalize(""), SHINGLE_SIZE).is_empty());
    }

    #[test]
    fn test_exactly_n_tokens() {
        let set = shingles(&normalize("a b c"), SHINGLE_SIZE);
        assert_eq!(set.len(), 1);
        assert!(set.contains("a b c"));
    }

    #[test]
    fn test_deduplicates() {
        // "a b c" appears twice
        let set = shingles(&normalize("a b c a b c"), SHINGLE_SIZE);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_preserves_token_order() {
        let set = shingles(&normalize("c b a"), SHINGLE_SIZE);
        assert!(set.contains("c b a"));
        assert!(!set.contains("a b c"));
    }
}
