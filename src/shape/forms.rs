//! Contextual form tables for Arabic-script letters.
//!
//! Rows follow OpenType feature naming: isolated, final, initial, medial.
//! Letters with no `init`/`medi` entry join only to the letter before
//! them (right-joining); the joiner falls back to `isol`/`fina` for them.

pub(super) struct LetterForms {
    pub base: char,
    pub isol: char,
    pub fina: char,
    pub init: Option<char>,
    pub medi: Option<char>,
}

const fn dual(base: char, isol: char, fina: char, init: char, medi: char) -> LetterForms {
    LetterForms {
        base,
        isol,
        fina,
        init: Some(init),
        medi: Some(medi),
    }
}

const fn right(base: char, isol: char, fina: char) -> LetterForms {
    LetterForms {
        base,
        isol,
        fina,
        init: None,
        medi: None,
    }
}

/// Arabic letters (Presentation Forms-B) plus the four extra Persian
/// letters (Presentation Forms-A).
pub(super) const LETTERS: &[LetterForms] = &[
    // hamza carries no joining behavior; its lone form stands in everywhere
    right('\u{0621}', '\u{FE80}', '\u{FE80}'),
    right('\u{0622}', '\u{FE81}', '\u{FE82}'),
    right('\u{0623}', '\u{FE83}', '\u{FE84}'),
    right('\u{0624}', '\u{FE85}', '\u{FE86}'),
    right('\u{0625}', '\u{FE87}', '\u{FE88}'),
    dual('\u{0626}', '\u{FE89}', '\u{FE8A}', '\u{FE8B}', '\u{FE8C}'),
    right('\u{0627}', '\u{FE8D}', '\u{FE8E}'),
    dual('\u{0628}', '\u{FE8F}', '\u{FE90}', '\u{FE91}', '\u{FE92}'),
    right('\u{0629}', '\u{FE93}', '\u{FE94}'),
    dual('\u{062A}', '\u{FE95}', '\u{FE96}', '\u{FE97}', '\u{FE98}'),
    dual('\u{062B}', '\u{FE99}', '\u{FE9A}', '\u{FE9B}', '\u{FE9C}'),
    dual('\u{062C}', '\u{FE9D}', '\u{FE9E}', '\u{FE9F}', '\u{FEA0}'),
    dual('\u{062D}', '\u{FEA1}', '\u{FEA2}', '\u{FEA3}', '\u{FEA4}'),
    dual('\u{062E}', '\u{FEA5}', '\u{FEA6}', '\u{FEA7}', '\u{FEA8}'),
    right('\u{062F}', '\u{FEA9}', '\u{FEAA}'),
    right('\u{0630}', '\u{FEAB}', '\u{FEAC}'),
    right('\u{0631}', '\u{FEAD}', '\u{FEAE}'),
    right('\u{0632}', '\u{FEAF}', '\u{FEB0}'),
    dual('\u{0633}', '\u{FEB1}', '\u{FEB2}', '\u{FEB3}', '\u{FEB4}'),
    dual('\u{0634}', '\u{FEB5}', '\u{FEB6}', '\u{FEB7}', '\u{FEB8}'),
    dual('\u{0635}', '\u{FEB9}', '\u{FEBA}', '\u{FEBB}', '\u{FEBC}'),
    dual('\u{0636}', '\u{FEBD}', '\u{FEBE}', '\u{FEBF}', '\u{FEC0}'),
    dual('\u{0637}', '\u{FEC1}', '\u{FEC2}', '\u{FEC3}', '\u{FEC4}'),
    dual('\u{0638}', '\u{FEC5}', '\u{FEC6}', '\u{FEC7}', '\u{FEC8}'),
    dual('\u{0639}', '\u{FEC9}', '\u{FECA}', '\u{FECB}', '\u{FECC}'),
    dual('\u{063A}', '\u{FECD}', '\u{FECE}', '\u{FECF}', '\u{FED0}'),
    // tatweel stretches; it joins on both sides and shapes to itself
    dual('\u{0640}', '\u{0640}', '\u{0640}', '\u{0640}', '\u{0640}'),
    dual('\u{0641}', '\u{FED1}', '\u{FED2}', '\u{FED3}', '\u{FED4}'),
    dual('\u{0642}', '\u{FED5}', '\u{FED6}', '\u{FED7}', '\u{FED8}'),
    dual('\u{0643}', '\u{FED9}', '\u{FEDA}', '\u{FEDB}', '\u{FEDC}'),
    dual('\u{0644}', '\u{FEDD}', '\u{FEDE}', '\u{FEDF}', '\u{FEE0}'),
    dual('\u{0645}', '\u{FEE1}', '\u{FEE2}', '\u{FEE3}', '\u{FEE4}'),
    dual('\u{0646}', '\u{FEE5}', '\u{FEE6}', '\u{FEE7}', '\u{FEE8}'),
    dual('\u{0647}', '\u{FEE9}', '\u{FEEA}', '\u{FEEB}', '\u{FEEC}'),
    right('\u{0648}', '\u{FEED}', '\u{FEEE}'),
    right('\u{0649}', '\u{FEEF}', '\u{FEF0}'),
    dual('\u{064A}', '\u{FEF1}', '\u{FEF2}', '\u{FEF3}', '\u{FEF4}'),
    // Persian additions
    dual('\u{067E}', '\u{FB56}', '\u{FB57}', '\u{FB58}', '\u{FB59}'),
    dual('\u{0686}', '\u{FB7A}', '\u{FB7B}', '\u{FB7C}', '\u{FB7D}'),
    right('\u{0698}', '\u{FB8A}', '\u{FB8B}'),
    dual('\u{06A9}', '\u{FB8E}', '\u{FB8F}', '\u{FB90}', '\u{FB91}'),
    dual('\u{06AF}', '\u{FB92}', '\u{FB93}', '\u{FB94}', '\u{FB95}'),
    dual('\u{06CC}', '\u{FBFC}', '\u{FBFD}', '\u{FBFE}', '\u{FBFF}'),
];

/// Lam + alef ligatures: (alef variant, isolated ligature, final ligature).
pub(super) const LAM_ALEF: &[(char, char, char)] = &[
    ('\u{0622}', '\u{FEF5}', '\u{FEF6}'),
    ('\u{0623}', '\u{FEF7}', '\u{FEF8}'),
    ('\u{0625}', '\u{FEF9}', '\u{FEFA}'),
    ('\u{0627}', '\u{FEFB}', '\u{FEFC}'),
];

pub(super) const LAM: char = '\u{0644}';

pub(super) fn forms_of(ch: char) -> Option<&'static LetterForms> {
    LETTERS.iter().find(|letter| letter.base == ch)
}

/// Map any contextual form back to its base letter.
pub(super) fn base_of(ch: char) -> Option<char> {
    LETTERS
        .iter()
        .find(|letter| {
            letter.isol == ch
                || letter.fina == ch
                || letter.init == Some(ch)
                || letter.medi == Some(ch)
        })
        .map(|letter| letter.base)
}

/// Ligature forms for lam followed by the given alef variant.
pub(super) fn lam_alef_of(alef: char) -> Option<(char, char)> {
    LAM_ALEF
        .iter()
        .find(|(base, _, _)| *base == alef)
        .map(|(_, isol, fina)| (*isol, *fina))
}

/// The alef variant hidden inside a lam-alef ligature form.
pub(super) fn lam_alef_base(ch: char) -> Option<char> {
    LAM_ALEF
        .iter()
        .find(|(_, isol, fina)| *isol == ch || *fina == ch)
        .map(|(base, _, _)| *base)
}

/// Combining marks that are transparent to joining.
pub(super) fn is_transparent(ch: char) -> bool {
    matches!(ch, '\u{064B}'..='\u{0652}' | '\u{0670}')
}
