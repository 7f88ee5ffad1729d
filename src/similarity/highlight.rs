// Token-level highlighting of a candidate against one reference text.

use std::collections::HashSet;

use super::normalize::normalize;

pub const MATCH_PREFIX: &str = "[SIMILAR:";
pub const MATCH_SUFFIX: &str = "]";

/// Mark each normalized candidate token that also appears in the reference.
///
/// Matched tokens come out as `[SIMILAR:<token>]`, others verbatim, joined
/// by single spaces. Tokens are already `[a-z0-9]` so nothing is escaped.
pub fn highlight(candidate: &str, reference: &str) -> String {
    let candidate = normalize(candidate);
    let reference = normalize(reference);

    let reference_tokens: HashSet<&str> = reference.tokens().collect();

    candidate
        .tokens()
        .map(|token| {
            if reference_tokens.contains(token) {
                format!("{MATCH_PREFIX}{token}{MATCH_SUFFIX}")
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_shared_tokens() {
        assert_eq!(
            highlight("The cat sat.", "the dog sat"),
            "[SIMILAR:the] cat [SIMILAR:sat]"
        );
    }

    #[test]
    fn test_no_overlap() {
        assert_eq!(highlight("alpha beta", "gamma delta"), "alpha beta");
    }

    #[test]
    fn test_repeated_tokens_each_marked() {
        assert_eq!(
            highlight("sat sat down", "sat"),
            "[SIMILAR:sat] [SIMILAR:sat] down"
        );
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(highlight("", "anything"), "");
        assert_eq!(highlight("some words", ""), "some words");
    }

    #[test]
    fn test_punctuation_only_gives_empty() {
        // Both sides normalize to nothing, so there are no tokens to mark
        assert_eq!(highlight("!!!", "???"), "");
    }
}
