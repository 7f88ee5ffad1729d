// Text normalization: canonical form used by every comparison.
//
// Lowercase, drop everything outside [a-z0-9] and ASCII whitespace, collapse
// whitespace runs to one space, trim. The result is what shingling, term
// frequencies and highlighting all operate on.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").expect("valid pattern"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid pattern"));

/// Text in canonical comparable form.
///
/// Only produced by [`normalize`], so holders can rely on it containing
/// nothing but `[a-z0-9]` tokens separated by single spaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whitespace-delimited tokens, in order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|t| !t.is_empty())
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalize raw text. Total and idempotent; empty in, empty out.
pub fn normalize(text: &str) -> NormalizedText {
    if text.is_empty() {
        return NormalizedText::default();
    }

    let lower = text.to_lowercase();
    let stripped = DISALLOWED.replace_all(&lower, "");
    let collapsed = WHITESPACE_RUN.replace_all(&stripped, " ");

    NormalizedText(collapsed.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_punctuation_insensitive() {
        assert_eq!(normalize("The Cat!"), normalize("the cat"));
        assert_eq!(normalize("The Cat!").as_str(), "the cat");
    }

    #[test]
    fn test_collapses_and_trims_whitespace() {
        let n = normalize("  Hello,\t\tworld \n\n again  ");
        assert_eq!(n.as_str(), "hello world again");
    }

    #[test]
    fn test_strips_non_ascii_letters() {
        // Accented letters are outside [a-z0-9] after lowercasing
        assert_eq!(normalize("Café au lait").as_str(), "caf au lait");
    }

    #[test]
    fn test_idempotent() {
        let inputs = ["", "   ", "A-B C", "It's 2 o'clock!", "multi\r\nline\ttext"];
        for input in inputs {
            let once = normalize(input);
            let twice = normalize(once.as_str());
            assert_eq!(once, twice, "normalize not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_empty_and_symbol_only() {
        assert!(normalize("").is_empty());
        assert!(normalize("!!! ??? ...").is_empty());
    }

    #[test]
    fn test_tokens() {
        let n = normalize("one, two;  three");
        let tokens: Vec<&str> = n.tokens().collect();
        assert_eq!(tokens, vec!["one", "two", "three"]);
        assert_eq!(normalize("").tokens().count(), 0);
    }
}
