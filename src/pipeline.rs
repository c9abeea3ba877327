//! The selective transformation pipeline: exception gate, span matching,
//! and reassembly, wired together over a pluggable shaper.
//!
//! Every function here is a pure function of its inputs; the rule list
//! and the shaper are read-only for the duration of a call.

use crate::exceptions::{self, ExceptionRule};
use crate::matcher::{self, PatternFailure};
use crate::reassemble::{self, OverlapError};
use crate::shape::{self, Shaper};
use crate::span;

use crate::codec::Record;

/// What happened to one unit of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutcome {
    pub output: String,
    /// True when an exception rule matched and the text passed through
    /// untouched.
    pub exempted: bool,
    /// Number of spans the shaper ran on.
    pub span_count: usize,
    pub failures: Vec<PatternFailure>,
}

impl TransformOutcome {
    fn exempt(text: &str) -> Self {
        Self {
            output: text.to_string(),
            exempted: true,
            span_count: 0,
            failures: Vec::new(),
        }
    }
}

/// Transform one unit of text.
///
/// The exception gate sees the whole unit: one matching enabled rule
/// exempts all of it. With no patterns the shaper covers the full text;
/// with patterns only the matched spans transform and everything between
/// them is reassembled verbatim. Overlapping matches from different
/// patterns are unioned before reassembly.
pub fn transform_text(
    text: &str,
    patterns: Option<&[String]>,
    rules: &[ExceptionRule],
    shaper: &dyn Shaper,
) -> Result<TransformOutcome, OverlapError> {
    if exceptions::is_exempt(text, rules) {
        return Ok(TransformOutcome::exempt(text));
    }

    match patterns {
        None => Ok(TransformOutcome {
            output: shape::shape_failsoft(shaper, text),
            exempted: false,
            span_count: 1,
            failures: Vec::new(),
        }),
        Some(patterns) => {
            let set = matcher::find_matches(text, patterns);
            let spans = span::coalesce(set.matches.iter().map(|m| m.span()));
            let output = reassemble::apply_spans(text, &spans, |piece| {
                shape::shape_failsoft(shaper, piece)
            })?;
            Ok(TransformOutcome {
                output,
                exempted: false,
                span_count: spans.len(),
                failures: set.failures,
            })
        }
    }
}

/// Summary of one batch pass over a record list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub transformed: usize,
    pub exempted: usize,
    pub unchanged: usize,
    pub failures: Vec<PatternFailure>,
}

/// Transform every record value in place.
///
/// Records keep their positions; each value transforms independently of
/// the others, so output order is input order no matter how the work is
/// evaluated. Pattern failures are reported once per pattern, not once
/// per record.
pub fn transform_records(
    records: &mut [Record],
    patterns: Option<&[String]>,
    rules: &[ExceptionRule],
    shaper: &dyn Shaper,
) -> Result<BatchSummary, OverlapError> {
    let mut summary = BatchSummary::default();

    for record in records.iter_mut() {
        let outcome = transform_text(&record.value, patterns, rules, shaper)?;

        if outcome.exempted {
            summary.exempted += 1;
        } else if outcome.output != record.value {
            summary.transformed += 1;
        } else {
            summary.unchanged += 1;
        }

        for failure in outcome.failures {
            if !summary.failures.iter().any(|f| f.pattern == failure.pattern) {
                summary.failures.push(failure);
            }
        }

        record.value = outcome.output;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Record;
    use crate::path::PathKey;

    fn upper() -> impl Shaper {
        |s: &str| s.to_uppercase()
    }

    fn rule(pattern: &str) -> ExceptionRule {
        ExceptionRule {
            id: 1,
            pattern: pattern.to_string(),
            description: String::new(),
            enabled: true,
        }
    }

    #[test]
    fn whole_text_without_patterns() {
        let outcome = transform_text("abc", None, &[], &upper()).unwrap();
        assert_eq!(outcome.output, "ABC");
        assert_eq!(outcome.span_count, 1);
    }

    #[test]
    fn only_matched_spans_transform() {
        let patterns = vec!["abc".to_string()];
        let outcome =
            transform_text("abc def abc", Some(patterns.as_slice()), &[], &upper()).unwrap();
        assert_eq!(outcome.output, "ABC def ABC");
        assert_eq!(outcome.span_count, 2);
    }

    #[test]
    fn exemption_gates_the_whole_call() {
        let rules = [rule("def")];
        let patterns = vec!["abc".to_string()];
        let outcome =
            transform_text("abc def abc", Some(patterns.as_slice()), &rules, &upper()).unwrap();
        assert_eq!(outcome.output, "abc def abc");
        assert!(outcome.exempted);
    }

    #[test]
    fn unexempted_po_style_value_still_processes() {
        let rules = [rule("^#")];
        let outcome = transform_text("Hello", None, &rules, &upper()).unwrap();
        assert!(!outcome.exempted);
        assert_eq!(outcome.output, "HELLO");
    }

    #[test]
    fn overlapping_patterns_union_before_reassembly() {
        let patterns = vec!["ab".to_string(), "bc".to_string()];
        let outcome = transform_text("abcd", Some(patterns.as_slice()), &[], &upper()).unwrap();
        assert_eq!(outcome.output, "ABCd");
        assert_eq!(outcome.span_count, 1);
    }

    #[test]
    fn bad_pattern_reported_once_per_batch() {
        let patterns = vec!["(bad".to_string(), "a".to_string()];
        let mut records = vec![
            Record::new(PathKey::parse("x").unwrap(), "aaa"),
            Record::new(PathKey::parse("y").unwrap(), "aba"),
        ];
        let summary =
            transform_records(&mut records, Some(patterns.as_slice()), &[], &upper()).unwrap();
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(records[0].value, "AAA");
        assert_eq!(records[1].value, "AbA");
    }

    #[test]
    fn batch_preserves_record_order() {
        let mut records = vec![
            Record::new(PathKey::parse("a").unwrap(), "one"),
            Record::new(PathKey::parse("b").unwrap(), "# skip"),
            Record::new(PathKey::parse("c").unwrap(), "three"),
        ];
        let rules = [rule("^#")];
        let summary = transform_records(&mut records, None, &rules, &upper()).unwrap();

        let values: Vec<&str> = records.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, ["ONE", "# skip", "THREE"]);
        assert_eq!(summary.transformed, 2);
        assert_eq!(summary.exempted, 1);
    }
}
