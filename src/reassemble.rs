//! Stitching transformed spans back into the surrounding text.

use crate::span::{CharIndex, Span};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverlapError {
    #[error("span {start}..{end} is inverted")]
    Inverted { start: usize, end: usize },

    #[error("span {start}..{end} lies outside text of {len} codepoints")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("span {start}..{end} overlaps or precedes the span ending at {prev_end}")]
    Overlapping {
        start: usize,
        end: usize,
        prev_end: usize,
    },
}

/// Apply `transform` to each span of `text` and reassemble the result,
/// leaving everything outside the spans byte-for-byte untouched.
///
/// Spans are codepoint offsets, must be sorted ascending, and must not
/// overlap; an ill-formed span set is rejected before any transform runs.
/// `apply_spans(text, &[], _)` is the identity, and a single span covering
/// the whole text is equivalent to calling the transform on all of it.
pub fn apply_spans(
    text: &str,
    spans: &[Span],
    mut transform: impl FnMut(&str) -> String,
) -> Result<String, OverlapError> {
    let index = CharIndex::new(text);
    let len = index.char_len();

    let mut prev_end = 0usize;
    for (i, span) in spans.iter().enumerate() {
        if span.start > span.end {
            return Err(OverlapError::Inverted {
                start: span.start,
                end: span.end,
            });
        }
        if span.end > len {
            return Err(OverlapError::OutOfBounds {
                start: span.start,
                end: span.end,
                len,
            });
        }
        if i > 0 && span.start < prev_end {
            return Err(OverlapError::Overlapping {
                start: span.start,
                end: span.end,
                prev_end,
            });
        }
        prev_end = span.end;
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for span in spans {
        let start = index.byte_at_char(span.start).unwrap_or(text.len());
        let end = index.byte_at_char(span.end).unwrap_or(text.len());
        out.push_str(&text[cursor..start]);
        out.push_str(&transform(&text[start..end]));
        cursor = end;
    }
    out.push_str(&text[cursor..]);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper(piece: &str) -> String {
        piece.to_uppercase()
    }

    #[test]
    fn empty_span_list_is_identity() {
        assert_eq!(apply_spans("abc", &[], upper).unwrap(), "abc");
    }

    #[test]
    fn full_span_equals_whole_transform() {
        let text = "abc def";
        let spans = [Span::new(0, 7)];
        assert_eq!(apply_spans(text, &spans, upper).unwrap(), upper(text));
    }

    #[test]
    fn untouched_text_is_verbatim() {
        let text = "aa bb cc";
        let spans = [Span::new(3, 5)];
        assert_eq!(apply_spans(text, &spans, upper).unwrap(), "aa BB cc");
    }

    #[test]
    fn identity_transform_reproduces_input() {
        let text = "Hello سلام World";
        let spans = [Span::new(6, 10)];
        let out = apply_spans(text, &spans, |s| s.to_string()).unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn codepoint_spans_slice_multibyte_text() {
        let text = "Hello سلام World";
        let spans = [Span::new(6, 10)];
        let out = apply_spans(text, &spans, |s| {
            assert_eq!(s, "سلام");
            "XXXX".to_string()
        })
        .unwrap();
        assert_eq!(out, "Hello XXXX World");
    }

    #[test]
    fn overlapping_spans_are_rejected() {
        let err = apply_spans("0123456789", &[Span::new(0, 5), Span::new(3, 8)], upper)
            .unwrap_err();
        assert!(matches!(err, OverlapError::Overlapping { prev_end: 5, .. }));
    }

    #[test]
    fn out_of_order_spans_are_rejected() {
        let err = apply_spans("0123456789", &[Span::new(5, 8), Span::new(0, 2)], upper)
            .unwrap_err();
        assert!(matches!(err, OverlapError::Overlapping { .. }));
    }

    #[test]
    fn out_of_bounds_span_is_rejected() {
        let err = apply_spans("short", &[Span::new(0, 9)], upper).unwrap_err();
        assert!(matches!(err, OverlapError::OutOfBounds { len: 5, .. }));
    }

    #[test]
    fn inverted_span_is_rejected() {
        let err = apply_spans("short", &[Span::new(3, 1)], upper).unwrap_err();
        assert!(matches!(err, OverlapError::Inverted { .. }));
    }

    #[test]
    fn adjacent_spans_transform_separately() {
        let text = "abcd";
        let spans = [Span::new(0, 2), Span::new(2, 4)];
        let mut pieces = Vec::new();
        apply_spans(text, &spans, |s| {
            pieces.push(s.to_string());
            s.to_string()
        })
        .unwrap();
        assert_eq!(pieces, ["ab", "cd"]);
    }
}
