//! Gettext catalog (`.po`) adapter.
//!
//! Catalogs are already flat: one record per entry, keyed by the source
//! string. The parsed catalog is retained beside the generic tree so a
//! save can join edited records back to entries by source id rather than
//! by row position.

use crate::codec::Record;
use crate::formats::{FormatError, LeafMeta};
use crate::node::{Key, Node};
use crate::path::{PathKey, Segment};
use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet};

/// Separator between context and source id in an entry key, following the
/// gettext runtime convention for contextualized messages.
const CONTEXT_SEPARATOR: char = '\u{0004}';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoEntry {
    pub translator_comments: Vec<String>,
    pub extracted_comments: Vec<String>,
    pub references: Vec<String>,
    pub previous: Vec<String>,
    pub flags: BTreeSet<String>,
    pub msgctxt: Option<String>,
    pub msgid: String,
    pub msgstr: String,
}

impl PoEntry {
    /// Join key for this entry: the source id, context-qualified when a
    /// msgctxt is present so contextualized duplicates stay distinct.
    pub fn key(&self) -> String {
        match &self.msgctxt {
            Some(ctxt) => format!("{ctxt}{CONTEXT_SEPARATOR}{}", self.msgid),
            None => self.msgid.clone(),
        }
    }

    fn comment(&self) -> Option<String> {
        if self.translator_comments.is_empty() {
            None
        } else {
            Some(self.translator_comments.join("\n"))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoFile {
    /// The header entry (empty msgid), preserved verbatim and not exposed
    /// as a record.
    pub header: Option<PoEntry>,
    pub entries: Vec<PoEntry>,
    /// Obsolete (`#~`) lines, kept as-is at the end of the file.
    obsolete: Vec<String>,
}

impl PoFile {
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        Parser::default().run(text)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(header) = &self.header {
            render_entry(&mut out, header);
            out.push('\n');
        }
        for (i, entry) in self.entries.iter().enumerate() {
            render_entry(&mut out, entry);
            if i + 1 < self.entries.len() || !self.obsolete.is_empty() {
                out.push('\n');
            }
        }
        for line in &self.obsolete {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Lift a catalog into the generic tree plus per-leaf metadata.
pub(super) fn document_parts(po: &PoFile) -> (Node, BTreeMap<String, LeafMeta>) {
    let mut map = IndexMap::new();
    let mut meta = BTreeMap::new();

    for entry in &po.entries {
        let key = entry.key();
        map.insert(Key::name(key.clone()), Node::Scalar(entry.msgstr.clone()));

        let leaf = LeafMeta {
            comment: entry.comment(),
            flags: entry.flags.clone(),
        };
        if leaf != LeafMeta::default() {
            let path = PathKey::new(vec![Segment::Key(key)]);
            meta.insert(path.to_string(), leaf);
        }
    }

    (Node::Mapping(map), meta)
}

/// Write edited records back into the catalog, joining by source id.
///
/// A record whose path does not name a known entry is an error; entries
/// never move or disappear because the record list was reordered.
pub(super) fn apply_records(po: &mut PoFile, records: &[Record]) -> Result<(), FormatError> {
    for record in records {
        let key = match record.path.segments() {
            [Segment::Key(key)] => key,
            _ => {
                return Err(FormatError::malformed(
                    "po",
                    format!("record path '{}' does not name a catalog entry", record.path),
                ))
            }
        };

        let entry = po
            .entries
            .iter_mut()
            .find(|entry| entry.key() == *key)
            .ok_or_else(|| FormatError::UnknownEntry { msgid: key.clone() })?;

        entry.msgstr = record.value.clone();
        if record.flags.contains("fuzzy") {
            entry.flags.insert("fuzzy".to_string());
        } else {
            entry.flags.remove("fuzzy");
        }
    }
    Ok(())
}

/// Which quoted field continuation lines currently extend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    None,
    Ctxt,
    Id,
    Str,
}

#[derive(Default)]
struct Parser {
    header: Option<PoEntry>,
    entries: Vec<PoEntry>,
    obsolete: Vec<String>,
    current: PoEntry,
    field: Field,
    saw_msgid: bool,
}

impl Default for Field {
    fn default() -> Self {
        Field::None
    }
}

impl Parser {
    fn run(mut self, text: &str) -> Result<PoFile, FormatError> {
        for (number, raw) in text.lines().enumerate() {
            self.line(raw.trim_end(), number + 1)?;
        }
        self.flush()?;

        let mut seen = BTreeSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.key()) {
                return Err(FormatError::malformed(
                    "po",
                    format!("duplicate entry for source id {:?}", entry.msgid),
                ));
            }
        }

        Ok(PoFile {
            header: self.header,
            entries: self.entries,
            obsolete: self.obsolete,
        })
    }

    fn line(&mut self, line: &str, number: usize) -> Result<(), FormatError> {
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            return self.flush();
        }

        if trimmed.starts_with("#~") {
            self.flush()?;
            self.obsolete.push(trimmed.to_string());
            return Ok(());
        }

        if let Some(rest) = trimmed.strip_prefix('#') {
            // comments open the next entry once the current one has both fields
            if self.field == Field::Str {
                self.flush()?;
            }
            match rest.chars().next() {
                Some(',') => {
                    for flag in rest[1..].split(',') {
                        let flag = flag.trim();
                        if !flag.is_empty() {
                            self.current.flags.insert(flag.to_string());
                        }
                    }
                }
                Some('.') => self.current.extracted_comments.push(rest[1..].trim().to_string()),
                Some(':') => self.current.references.push(rest[1..].trim().to_string()),
                Some('|') => self.current.previous.push(rest[1..].trim().to_string()),
                _ => self
                    .current
                    .translator_comments
                    .push(rest.strip_prefix(' ').unwrap_or(rest).to_string()),
            }
            return Ok(());
        }

        if let Some(rest) = strip_keyword(trimmed, "msgctxt") {
            if self.field == Field::Str {
                self.flush()?;
            }
            if self.current.msgctxt.is_some() || self.saw_msgid {
                return Err(malformed_at(number, "msgctxt out of place"));
            }
            self.current.msgctxt = Some(parse_quoted(rest, number)?);
            self.field = Field::Ctxt;
            return Ok(());
        }

        if strip_keyword(trimmed, "msgid_plural").is_some() {
            return Err(malformed_at(number, "plural entries are not supported"));
        }

        if let Some(rest) = strip_keyword(trimmed, "msgid") {
            if self.field == Field::Str {
                self.flush()?;
            }
            if self.saw_msgid {
                return Err(malformed_at(number, "msgid repeated within one entry"));
            }
            self.current.msgid = parse_quoted(rest, number)?;
            self.saw_msgid = true;
            self.field = Field::Id;
            return Ok(());
        }

        if trimmed.starts_with("msgstr[") {
            return Err(malformed_at(number, "plural entries are not supported"));
        }

        if let Some(rest) = strip_keyword(trimmed, "msgstr") {
            if !self.saw_msgid {
                return Err(malformed_at(number, "msgstr without a preceding msgid"));
            }
            if self.field == Field::Str {
                return Err(malformed_at(number, "msgstr repeated within one entry"));
            }
            self.current.msgstr = parse_quoted(rest, number)?;
            self.field = Field::Str;
            return Ok(());
        }

        if trimmed.starts_with('"') {
            let piece = parse_quoted(trimmed, number)?;
            match self.field {
                Field::Ctxt => {
                    if let Some(ctxt) = &mut self.current.msgctxt {
                        ctxt.push_str(&piece);
                    }
                }
                Field::Id => self.current.msgid.push_str(&piece),
                Field::Str => self.current.msgstr.push_str(&piece),
                Field::None => return Err(malformed_at(number, "string outside any entry")),
            }
            return Ok(());
        }

        Err(malformed_at(number, format!("unrecognized line {trimmed:?}")))
    }

    fn flush(&mut self) -> Result<(), FormatError> {
        if !self.saw_msgid {
            // nothing but comments so far; keep collecting for the next entry
            return Ok(());
        }
        let entry = std::mem::take(&mut self.current);
        self.field = Field::None;
        self.saw_msgid = false;

        if entry.msgid.is_empty() && self.header.is_none() && self.entries.is_empty() {
            self.header = Some(entry);
        } else {
            self.entries.push(entry);
        }
        Ok(())
    }
}

fn malformed_at(number: usize, message: impl std::fmt::Display) -> FormatError {
    FormatError::malformed("po", format!("line {number}: {message}"))
}

/// Split `msgid "..."`-style lines on the keyword, requiring a following
/// quote so `msgid_x` never parses as `msgid`.
fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    let rest = rest.trim_start();
    rest.starts_with('"').then_some(rest)
}

fn parse_quoted(raw: &str, number: usize) -> Result<String, FormatError> {
    let raw = raw.trim();
    let inner = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| malformed_at(number, "expected a quoted string"))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            if ch == '"' {
                return Err(malformed_at(number, "unescaped quote inside string"));
            }
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => return Err(malformed_at(number, format!("unknown escape '\\{other}'"))),
            None => return Err(malformed_at(number, "dangling escape")),
        }
    }
    Ok(out)
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

fn render_entry(out: &mut String, entry: &PoEntry) {
    for comment in &entry.translator_comments {
        out.push_str("# ");
        out.push_str(comment);
        out.push('\n');
    }
    for comment in &entry.extracted_comments {
        out.push_str("#. ");
        out.push_str(comment);
        out.push('\n');
    }
    for reference in &entry.references {
        out.push_str("#: ");
        out.push_str(reference);
        out.push('\n');
    }
    if !entry.flags.is_empty() {
        out.push_str("#, ");
        let flags: Vec<&str> = entry.flags.iter().map(String::as_str).collect();
        out.push_str(&flags.join(", "));
        out.push('\n');
    }
    for previous in &entry.previous {
        out.push_str("#| ");
        out.push_str(previous);
        out.push('\n');
    }
    if let Some(ctxt) = &entry.msgctxt {
        render_field(out, "msgctxt", ctxt);
    }
    render_field(out, "msgid", &entry.msgid);
    render_field(out, "msgstr", &entry.msgstr);
}

fn render_field(out: &mut String, name: &str, value: &str) {
    if value.contains('\n') {
        out.push_str(name);
        out.push_str(" \"\"\n");
        for chunk in value.split_inclusive('\n') {
            out.push('"');
            out.push_str(&escape(chunk));
            out.push_str("\"\n");
        }
    } else {
        out.push_str(name);
        out.push_str(" \"");
        out.push_str(&escape(value));
        out.push_str("\"\n");
    }
}
