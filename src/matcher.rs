//! Multi-pattern span matching over unicode text.
//!
//! Each pattern scans the full text independently; results merge into one
//! list sorted by span. Offsets are codepoints, not bytes, because the
//! editing surfaces downstream address text by character position.

use crate::cache;
use crate::span::{CharIndex, Span};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("invalid pattern '{pattern}': {message}")]
    Invalid { pattern: String, message: String },

    #[error("pattern '{pattern}' exceeds the compiled size budget")]
    TooLarge { pattern: String },
}

/// One pattern hit: a codepoint span, the matched text, and the pattern
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub pattern: String,
}

impl Match {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// A pattern that failed to compile, carried alongside the matches of the
/// patterns that did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternFailure {
    pub pattern: String,
    pub error: PatternError,
}

/// Result of one matching call: merged matches plus per-pattern failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    pub matches: Vec<Match>,
    pub failures: Vec<PatternFailure>,
}

impl MatchSet {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Spans of all matches, in match order.
    pub fn spans(&self) -> Vec<Span> {
        self.matches.iter().map(Match::span).collect()
    }
}

/// Find every match of every pattern in `text`.
///
/// Matches are sorted ascending by start, ties broken by ascending end;
/// among identical spans, input pattern order decides, so repeated calls
/// with the same inputs produce the same list. A pattern that fails to
/// compile is skipped and reported in `failures`; the remaining patterns
/// still match.
pub fn find_matches<S: AsRef<str>>(text: &str, patterns: &[S]) -> MatchSet {
    let index = CharIndex::new(text);
    let mut matches = Vec::new();
    let mut failures = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        match cache::get_or_compile(pattern) {
            Ok(regex) => {
                for found in regex.find_iter(text) {
                    matches.push(Match {
                        start: index.char_at_byte(found.start()),
                        end: index.char_at_byte(found.end()),
                        text: found.as_str().to_string(),
                        pattern: pattern.to_string(),
                    });
                }
            }
            Err(error) => {
                log::warn!("skipping pattern {pattern:?}: {error}");
                failures.push(PatternFailure {
                    pattern: pattern.to_string(),
                    error,
                });
            }
        }
    }

    matches.sort_by_key(|m| (m.start, m.end));
    MatchSet { matches, failures }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arabic_block_match_uses_codepoint_offsets() {
        let set = find_matches("Hello سلام World", &["[\u{0600}-\u{06FF}]+"]);
        assert_eq!(set.matches.len(), 1);
        let m = &set.matches[0];
        assert_eq!(m.text, "سلام");
        assert_eq!(m.start, 6);
        assert_eq!(m.end, 10);
    }

    #[test]
    fn merged_patterns_sort_by_span() {
        let set = find_matches("one two three", &["three", "one"]);
        let texts: Vec<&str> = set.matches.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["one", "three"]);
    }

    #[test]
    fn union_equals_separate_calls() {
        let text = "aa bb aa cc";
        let both = find_matches(text, &["aa", "cc"]);
        let mut separate = find_matches(text, &["aa"]).matches;
        separate.extend(find_matches(text, &["cc"]).matches);
        separate.sort_by_key(|m| (m.start, m.end));
        assert_eq!(both.matches, separate);
    }

    #[test]
    fn bad_pattern_fails_alone() {
        let set = find_matches("abc", &["(unclosed", "b"]);
        assert_eq!(set.failures.len(), 1);
        assert_eq!(set.failures[0].pattern, "(unclosed");
        assert_eq!(set.matches.len(), 1);
        assert_eq!(set.matches[0].text, "b");
    }

    #[test]
    fn multiline_anchors_are_enabled() {
        let set = find_matches("first\nsecond\n", &["^second$"]);
        assert_eq!(set.matches.len(), 1);
        assert_eq!(set.matches[0].text, "second");
    }

    #[test]
    fn repeated_calls_are_stable() {
        let text = "x y x";
        let first = find_matches(text, &["x", "[a-z]"]);
        let second = find_matches(text, &["x", "[a-z]"]);
        assert_eq!(first, second);
    }
}
