//! XML adapter.
//!
//! Elements become mapping entries keyed by tag, attributes become
//! attribute-kind entries, and element text becomes either the element's
//! own scalar (text-only elements) or a `#text` leaf beside attributes
//! and children. Same-named siblings collapse into a sequence under the
//! shared tag, so repeated tags address as `tag[0]`, `tag[1]`, and stay
//! fully addressable instead of shadowing everything after the first hit.
//!
//! Whitespace-only text is dropped, remaining text runs are trimmed, and
//! mixed content with more than one text run is rejected. Comments,
//! processing instructions and the XML declaration are not preserved.

use crate::codec::MAX_DEPTH;
use crate::formats::FormatError;
use crate::node::{Key, Node};
use indexmap::IndexMap;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Reserved key for the text content of an element that also carries
/// attributes or children. Safe because `#` can never start an XML name.
pub(super) const TEXT_KEY: &str = "#text";

pub(super) fn parse(text: &str) -> Result<Node, FormatError> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<ElementBuilder> = Vec::new();
    let mut root: Option<(String, Node)> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|err| FormatError::malformed("xml", err))?;
        match event {
            Event::Start(start) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(FormatError::TooDeep { limit: MAX_DEPTH });
                }
                stack.push(ElementBuilder::open(&start)?);
            }
            Event::Empty(start) => {
                let element = ElementBuilder::open(&start)?;
                attach(&mut stack, &mut root, element.finish())?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| FormatError::malformed("xml", "unmatched closing tag"))?;
                attach(&mut stack, &mut root, element.finish())?;
            }
            Event::Text(text) => {
                let content = text
                    .unescape()
                    .map_err(|err| FormatError::malformed("xml", err))?;
                push_text(&mut stack, content.trim())?;
            }
            Event::CData(cdata) => {
                let bytes = cdata.into_inner().into_owned();
                let content = String::from_utf8(bytes)
                    .map_err(|err| FormatError::malformed("xml", err))?;
                push_text(&mut stack, content.trim())?;
            }
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if !stack.is_empty() {
        return Err(FormatError::malformed("xml", "unclosed element"));
    }
    let (tag, node) = root.ok_or_else(|| FormatError::malformed("xml", "no root element"))?;

    let mut document = IndexMap::new();
    document.insert(Key::name(tag), node);
    Ok(Node::Mapping(document))
}

struct ElementBuilder {
    tag: String,
    entries: IndexMap<Key, Node>,
    text: String,
    children: usize,
}

impl ElementBuilder {
    fn open(start: &quick_xml::events::BytesStart<'_>) -> Result<Self, FormatError> {
        let tag = decode_name(start.name().as_ref())?;
        let mut entries = IndexMap::new();

        for attr in start.attributes() {
            let attr = attr.map_err(|err| FormatError::malformed("xml", err))?;
            let name = decode_name(attr.key.as_ref())?;
            let value = attr
                .unescape_value()
                .map_err(|err| FormatError::malformed("xml", err))?
                .into_owned();
            if entries
                .insert(Key::attr(name.clone()), Node::Scalar(value))
                .is_some()
            {
                return Err(FormatError::malformed(
                    "xml",
                    format!("duplicate attribute '{name}' on <{tag}>"),
                ));
            }
        }

        Ok(Self {
            tag,
            entries,
            text: String::new(),
            children: 0,
        })
    }

    fn push_text(&mut self, content: &str) -> Result<(), FormatError> {
        if self.children > 0 && !self.text.is_empty() {
            return Err(FormatError::malformed(
                "xml",
                format!("mixed content in <{}>", self.tag),
            ));
        }
        self.text.push_str(content);
        Ok(())
    }

    fn finish(self) -> (String, Node) {
        if self.entries.is_empty() {
            return (self.tag, Node::Scalar(self.text));
        }
        let mut entries = self.entries;
        if !self.text.is_empty() {
            entries.insert(Key::name(TEXT_KEY), Node::Scalar(self.text));
        }
        (self.tag, Node::Mapping(entries))
    }
}

fn push_text(stack: &mut [ElementBuilder], content: &str) -> Result<(), FormatError> {
    if content.is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        Some(element) => element.push_text(content),
        None => Err(FormatError::malformed("xml", "text outside the root element")),
    }
}

fn attach(
    stack: &mut Vec<ElementBuilder>,
    root: &mut Option<(String, Node)>,
    (tag, node): (String, Node),
) -> Result<(), FormatError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children += 1;
            let key = Key::name(tag);
            match parent.entries.get_mut(&key) {
                None => {
                    parent.entries.insert(key, node);
                }
                // second same-named sibling: collapse into a sequence
                Some(Node::Sequence(items)) => items.push(node),
                Some(existing) => {
                    let first = std::mem::replace(existing, Node::Sequence(Vec::new()));
                    if let Node::Sequence(items) = existing {
                        items.push(first);
                        items.push(node);
                    }
                }
            }
            Ok(())
        }
        None => {
            if root.is_some() {
                return Err(FormatError::malformed("xml", "multiple root elements"));
            }
            *root = Some((tag, node));
            Ok(())
        }
    }
}

fn decode_name(bytes: &[u8]) -> Result<String, FormatError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|err| FormatError::malformed("xml", err))
}

fn valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.' | ':'))
}

pub(super) fn render(node: &Node) -> Result<String, FormatError> {
    let Node::Mapping(map) = node else {
        return Err(FormatError::malformed(
            "xml",
            "document tree must be a mapping with one root element",
        ));
    };
    let mut roots = map.iter();
    let (first, rest) = (roots.next(), roots.next());
    let (key, content) = match (first, rest) {
        (Some(entry), None) => entry,
        _ => {
            return Err(FormatError::malformed(
                "xml",
                "document tree must hold exactly one root element",
            ))
        }
    };
    let Key::Name(tag) = key else {
        return Err(FormatError::malformed("xml", "root entry cannot be an attribute"));
    };

    let mut out = String::new();
    write_element(&mut out, tag, content, 0)?;
    Ok(out)
}

fn write_element(out: &mut String, tag: &str, node: &Node, depth: usize) -> Result<(), FormatError> {
    if depth > MAX_DEPTH {
        return Err(FormatError::TooDeep { limit: MAX_DEPTH });
    }
    if !valid_name(tag) {
        return Err(FormatError::malformed(
            "xml",
            format!("invalid element name {tag:?}"),
        ));
    }
    let indent = "  ".repeat(depth);

    match node {
        Node::Scalar(text) => {
            if text.is_empty() {
                out.push_str(&format!("{indent}<{tag}/>\n"));
            } else {
                out.push_str(&format!("{indent}<{tag}>{}</{tag}>\n", escape(text)));
            }
        }
        // a sequence under a tag renders as repeated same-named siblings
        Node::Sequence(items) => {
            for item in items {
                write_element(out, tag, item, depth)?;
            }
        }
        Node::Mapping(map) => {
            let mut open = format!("{indent}<{tag}");
            for (key, value) in map {
                if let Key::Attr(name) = key {
                    if !valid_name(name) {
                        return Err(FormatError::malformed(
                            "xml",
                            format!("invalid attribute name {name:?}"),
                        ));
                    }
                    let Node::Scalar(value) = value else {
                        return Err(FormatError::malformed(
                            "xml",
                            format!("attribute '{name}' must hold a scalar"),
                        ));
                    };
                    open.push_str(&format!(" {name}=\"{}\"", escape(value)));
                }
            }

            let text = map.iter().find_map(|(key, value)| match (key, value) {
                (Key::Name(name), Node::Scalar(text)) if name == TEXT_KEY => Some(text),
                _ => None,
            });
            let children: Vec<(&String, &Node)> = map
                .iter()
                .filter_map(|(key, value)| match key {
                    Key::Name(name) if name != TEXT_KEY => Some((name, value)),
                    _ => None,
                })
                .collect();

            if children.is_empty() {
                match text {
                    Some(text) => {
                        out.push_str(&format!("{open}>{}</{tag}>\n", escape(text)));
                    }
                    None => out.push_str(&format!("{open}/>\n")),
                }
            } else {
                out.push_str(&format!("{open}>\n"));
                if let Some(text) = text {
                    out.push_str(&format!("{}{}\n", "  ".repeat(depth + 1), escape(text)));
                }
                for (name, child) in children {
                    write_element(out, name, child, depth + 1)?;
                }
                out.push_str(&format!("{indent}</{tag}>\n"));
            }
        }
    }
    Ok(())
}
