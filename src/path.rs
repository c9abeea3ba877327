use std::fmt;
use thiserror::Error;

/// One step of a flat address into a document tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A mapping key, written `key` (quoted when it contains reserved characters).
    Key(String),
    /// A sequence index, written `[n]`.
    Index(usize),
    /// An element attribute, written `[@name]`.
    Attr(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("invalid path '{input}': {message}")]
    Invalid { input: String, message: String },
}

/// A flat address into a document tree.
///
/// The string form is an unambiguous, reversible grammar: `.` separates
/// mapping keys, `[n]` is a sequence index, `[@name]` is an attribute.
/// Keys containing a reserved character (`.`, `[`, `]`, `"`, `\`) or
/// whitespace are double-quoted with backslash escapes, so every path
/// string parses back to exactly the segments it was built from. The empty
/// string addresses the tree root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathKey {
    segments: Vec<Segment>,
}

impl PathKey {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Return a copy of this path extended by one segment.
    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self { segments }
    }

    pub fn parse(input: &str) -> Result<Self, PathError> {
        if input.is_empty() {
            return Ok(Self::default());
        }

        let mut chars = input.chars().peekable();
        let mut segments = Vec::new();
        let mut first = true;

        while let Some(&ch) = chars.peek() {
            if ch == '[' {
                chars.next();
                segments.push(parse_bracket(&mut chars, input)?);
            } else {
                if !first {
                    if ch != '.' {
                        return Err(invalid(input, "expected '.' or '[' between segments"));
                    }
                    chars.next();
                }
                segments.push(Segment::Key(parse_key(&mut chars, input)?));
            }
            first = false;
        }

        Ok(Self { segments })
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    write_key(f, key)?;
                }
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Attr(name) => {
                    f.write_str("[@")?;
                    write_key(f, name)?;
                    f.write_str("]")?;
                }
            }
        }
        Ok(())
    }
}

fn invalid(input: &str, message: impl Into<String>) -> PathError {
    PathError::Invalid {
        input: input.to_string(),
        message: message.into(),
    }
}

fn is_plain_char(ch: char) -> bool {
    !matches!(ch, '.' | '[' | ']' | '"' | '\\') && !ch.is_whitespace()
}

fn needs_quoting(key: &str) -> bool {
    key.is_empty() || key.chars().any(|ch| !is_plain_char(ch))
}

fn write_key(f: &mut fmt::Formatter<'_>, key: &str) -> fmt::Result {
    if !needs_quoting(key) {
        return f.write_str(key);
    }
    f.write_str("\"")?;
    for ch in key.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            other => write!(f, "{other}")?,
        }
    }
    f.write_str("\"")
}

type Chars<'a> = std::iter::Peekable<std::str::Chars<'a>>;

/// Parse a plain or quoted key, stopping before `.`, `[` or `]`.
fn parse_key(chars: &mut Chars<'_>, input: &str) -> Result<String, PathError> {
    if chars.peek() == Some(&'"') {
        chars.next();
        return parse_quoted(chars, input);
    }

    let mut key = String::new();
    while let Some(&ch) = chars.peek() {
        if ch == '.' || ch == '[' || ch == ']' {
            break;
        }
        if !is_plain_char(ch) {
            return Err(invalid(
                input,
                format!("character {ch:?} must appear inside a quoted key"),
            ));
        }
        key.push(ch);
        chars.next();
    }

    if key.is_empty() {
        return Err(invalid(input, "empty path segment"));
    }
    Ok(key)
}

fn parse_quoted(chars: &mut Chars<'_>, input: &str) -> Result<String, PathError> {
    let mut key = String::new();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => return Ok(key),
            '\\' => match chars.next() {
                Some('"') => key.push('"'),
                Some('\\') => key.push('\\'),
                Some('n') => key.push('\n'),
                Some('t') => key.push('\t'),
                Some('r') => key.push('\r'),
                Some(other) => {
                    return Err(invalid(input, format!("unknown escape '\\{other}'")));
                }
                None => return Err(invalid(input, "unterminated escape")),
            },
            other => key.push(other),
        }
    }
    Err(invalid(input, "unterminated quoted key"))
}

fn parse_bracket(chars: &mut Chars<'_>, input: &str) -> Result<Segment, PathError> {
    let segment = if chars.peek() == Some(&'@') {
        chars.next();
        let name = parse_key(chars, input)?;
        Segment::Attr(name)
    } else {
        let mut digits = String::new();
        while let Some(&ch) = chars.peek() {
            if !ch.is_ascii_digit() {
                break;
            }
            digits.push(ch);
            chars.next();
        }
        if digits.is_empty() {
            return Err(invalid(input, "expected an index or '@' after '['"));
        }
        let index: usize = digits
            .parse()
            .map_err(|_| invalid(input, "index out of range"))?;
        Segment::Index(index)
    };

    match chars.next() {
        Some(']') => Ok(segment),
        _ => Err(invalid(input, "unterminated '['")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(path: &str) -> String {
        PathKey::parse(path).unwrap().to_string()
    }

    #[test]
    fn parse_dotted_keys() {
        let path = PathKey::parse("a.b.c").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("a".into()),
                Segment::Key("b".into()),
                Segment::Key("c".into()),
            ]
        );
    }

    #[test]
    fn parse_indexes_and_attrs() {
        let path = PathKey::parse("items[2].name[@lang]").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("items".into()),
                Segment::Index(2),
                Segment::Key("name".into()),
                Segment::Attr("lang".into()),
            ]
        );
    }

    #[test]
    fn parse_quoted_key_with_dot() {
        let path = PathKey::parse("\"a.b\".c").unwrap();
        assert_eq!(
            path.segments(),
            &[Segment::Key("a.b".into()), Segment::Key("c".into())]
        );
    }

    #[test]
    fn display_quotes_reserved_characters() {
        let path = PathKey::new(vec![Segment::Key("Hello World.".into())]);
        assert_eq!(path.to_string(), "\"Hello World.\"");
        assert_eq!(PathKey::parse(&path.to_string()).unwrap(), path);
    }

    #[test]
    fn display_roundtrips() {
        for input in ["a.b[0].c", "x[@id]", "\"weird \\\"key\\\"\".plain", "[3][1]"] {
            assert_eq!(roundtrip(input), input);
        }
    }

    #[test]
    fn empty_string_is_the_root() {
        let path = PathKey::parse("").unwrap();
        assert!(path.is_empty());
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn reject_unescaped_reserved() {
        assert!(PathKey::parse("a.b]").is_err());
        assert!(PathKey::parse("a..b").is_err());
        assert!(PathKey::parse(".a").is_err());
        assert!(PathKey::parse("a[").is_err());
        assert!(PathKey::parse("a[x]").is_err());
        assert!(PathKey::parse("a\"b\"").is_err());
        assert!(PathKey::parse("\"open").is_err());
    }

    #[test]
    fn reject_key_glued_to_bracket_close() {
        assert!(PathKey::parse("a[0]b").is_err());
    }

    #[test]
    fn quoted_empty_key() {
        let path = PathKey::parse("\"\"").unwrap();
        assert_eq!(path.segments(), &[Segment::Key(String::new())]);
        assert_eq!(path.to_string(), "\"\"");
    }
}
