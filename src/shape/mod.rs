//! Pluggable text shaping.
//!
//! The transformation pipeline only ever sees the [`Shaper`] trait; what
//! the transform actually does is the caller's business. The built-in
//! [`ArabicShaper`] substitutes contextual presentation forms and then
//! reorders each paragraph into visual order, which is what terminals and
//! widgets without complex text layout need to display Persian/Arabic
//! correctly.
//!
//! Every call through [`shape_failsoft`] honors the fail-soft contract:
//! a shaper that panics yields the input unchanged instead of taking the
//! pipeline down with it.

mod forms;

use std::panic::{catch_unwind, AssertUnwindSafe};
use unicode_bidi::BidiInfo;

/// A `text -> text` transform applied to matched spans.
pub trait Shaper {
    fn shape(&self, text: &str) -> String;
}

impl<F> Shaper for F
where
    F: Fn(&str) -> String,
{
    fn shape(&self, text: &str) -> String {
        self(text)
    }
}

/// Run a shaper under the fail-soft contract: on panic, the original text
/// comes back unchanged and the failure is logged, never propagated.
pub fn shape_failsoft(shaper: &dyn Shaper, text: &str) -> String {
    match catch_unwind(AssertUnwindSafe(|| shaper.shape(text))) {
        Ok(shaped) => shaped,
        Err(_) => {
            log::warn!("shaper failed; returning text unchanged");
            text.to_string()
        }
    }
}

/// The built-in shaper: contextual joining plus bidi reordering.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArabicShaper;

impl Shaper for ArabicShaper {
    fn shape(&self, text: &str) -> String {
        reorder(&join_forms(text))
    }
}

/// Substitute each Arabic-script letter with the presentation form its
/// neighbors call for, folding lam+alef pairs into their ligatures.
fn join_forms(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let Some(letter) = forms::forms_of(ch) else {
            out.push(ch);
            i += 1;
            continue;
        };

        if ch == forms::LAM {
            if let Some(&next) = chars.get(i + 1) {
                if let Some((isol, fina)) = forms::lam_alef_of(next) {
                    out.push(if connects_before(&chars, i) { fina } else { isol });
                    i += 2;
                    continue;
                }
            }
        }

        let before = connects_before(&chars, i);
        let after = connects_after(&chars, i);
        out.push(match (before, after) {
            (false, false) => letter.isol,
            (false, true) => letter.init.unwrap_or(letter.isol),
            (true, false) => letter.fina,
            (true, true) => letter.medi.unwrap_or(letter.fina),
        });
        i += 1;
    }

    out
}

/// Does the nearest non-transparent character before `i` join forward?
fn connects_before(chars: &[char], i: usize) -> bool {
    let mut j = i;
    while j > 0 {
        j -= 1;
        let ch = chars[j];
        if forms::is_transparent(ch) {
            continue;
        }
        return forms::forms_of(ch).is_some_and(|letter| letter.init.is_some());
    }
    false
}

/// Can the letter at `i` join to the nearest non-transparent character
/// after it?
fn connects_after(chars: &[char], i: usize) -> bool {
    let Some(current) = forms::forms_of(chars[i]) else {
        return false;
    };
    if current.init.is_none() {
        return false;
    }
    let mut j = i + 1;
    while j < chars.len() {
        let ch = chars[j];
        if forms::is_transparent(ch) {
            j += 1;
            continue;
        }
        return forms::forms_of(ch).is_some();
    }
    false
}

/// Reorder each paragraph into visual order.
fn reorder(text: &str) -> String {
    let bidi = BidiInfo::new(text, None);
    let mut out = String::with_capacity(text.len());
    for paragraph in &bidi.paragraphs {
        out.push_str(&bidi.reorder_line(paragraph, paragraph.range.clone()));
    }
    out
}

/// Best-effort inverse of [`ArabicShaper`]: reverse the visual order and
/// map presentation forms back to base letters.
///
/// This is an approximation, not an inverse. Shaping discards joining
/// context and bidi run structure, so mixed-direction text and ligatures
/// beyond lam+alef do not reconstruct exactly; pure Arabic-script runs do.
pub fn unshape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars().rev() {
        if let Some(alef) = forms::lam_alef_base(ch) {
            out.push(forms::LAM);
            out.push(alef);
        } else if let Some(base) = forms::base_of(ch) {
            out.push(base);
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(ArabicShaper.shape(""), "");
    }

    #[test]
    fn latin_text_passes_through() {
        assert_eq!(ArabicShaper.shape("Hello"), "Hello");
    }

    #[test]
    fn initial_and_final_forms_are_contextual() {
        // بب: first beh takes the initial form, second the final form
        let joined = join_forms("\u{0628}\u{0628}");
        assert_eq!(joined, "\u{FE91}\u{FE92}");
    }

    #[test]
    fn right_joining_letter_breaks_the_chain() {
        // دب: dal never joins forward, so beh stays isolated
        let joined = join_forms("\u{062F}\u{0628}");
        assert_eq!(joined, "\u{FEA9}\u{FE8F}");
    }

    #[test]
    fn lam_alef_becomes_a_ligature() {
        let joined = join_forms("\u{0644}\u{0627}");
        assert_eq!(joined, "\u{FEFB}");
        // after seen the ligature takes its final form
        let joined = join_forms("\u{0633}\u{0644}\u{0627}");
        assert_eq!(joined, "\u{FEB3}\u{FEFC}");
    }

    #[test]
    fn harakat_are_transparent_to_joining() {
        // beh + fatha + beh still joins across the mark
        let joined = join_forms("\u{0628}\u{064E}\u{0628}");
        assert_eq!(joined, "\u{FE91}\u{064E}\u{FE92}");
    }

    #[test]
    fn unshape_recovers_pure_arabic_words() {
        for word in ["سلام", "کتاب", "ایران"] {
            let shaped = ArabicShaper.shape(word);
            assert_eq!(unshape(&shaped), word);
        }
    }

    #[test]
    fn failsoft_returns_input_on_panic() {
        struct Exploding;
        impl Shaper for Exploding {
            fn shape(&self, _: &str) -> String {
                panic!("boom");
            }
        }
        assert_eq!(shape_failsoft(&Exploding, "متن"), "متن");
    }

    #[test]
    fn failsoft_passes_through_success() {
        let upper = |s: &str| s.to_uppercase();
        assert_eq!(shape_failsoft(&upper, "abc"), "ABC");
    }
}
