//! YAML adapter.
//!
//! Same coercion policy as JSON: structure round-trips, scalar types
//! flatten to strings and are written back as strings (the emitter quotes
//! numeric-looking values, so they stay strings on re-read).

use crate::codec::MAX_DEPTH;
use crate::formats::FormatError;
use crate::node::{Key, Node};
use indexmap::IndexMap;
use serde_yaml::Value;

pub(super) fn parse(text: &str) -> Result<Node, FormatError> {
    let value: Value =
        serde_yaml::from_str(text).map_err(|err| FormatError::malformed("yaml", err))?;
    to_node(&value, 0)
}

pub(super) fn render(node: &Node) -> Result<String, FormatError> {
    let value = from_node(node);
    serde_yaml::to_string(&value).map_err(|err| FormatError::malformed("yaml", err))
}

fn to_node(value: &Value, depth: usize) -> Result<Node, FormatError> {
    if depth > MAX_DEPTH {
        return Err(FormatError::TooDeep { limit: MAX_DEPTH });
    }
    Ok(match value {
        Value::Null => Node::Scalar(String::new()),
        Value::Bool(b) => Node::Scalar(b.to_string()),
        Value::Number(n) => Node::Scalar(n.to_string()),
        Value::String(s) => Node::Scalar(s.clone()),
        Value::Sequence(items) => Node::Sequence(
            items
                .iter()
                .map(|item| to_node(item, depth + 1))
                .collect::<Result<_, _>>()?,
        ),
        Value::Mapping(map) => {
            let mut out = IndexMap::new();
            for (key, child) in map {
                out.insert(Key::name(scalar_key(key)?), to_node(child, depth + 1)?);
            }
            Node::Mapping(out)
        }
        Value::Tagged(tagged) => to_node(&tagged.value, depth + 1)?,
    })
}

fn scalar_key(key: &Value) -> Result<String, FormatError> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(FormatError::malformed(
            "yaml",
            format!("unsupported mapping key: {other:?}"),
        )),
    }
}

fn from_node(node: &Node) -> Value {
    match node {
        Node::Scalar(value) => Value::String(value.clone()),
        Node::Sequence(items) => Value::Sequence(items.iter().map(from_node).collect()),
        Node::Mapping(map) => {
            let mut out = serde_yaml::Mapping::new();
            for (key, child) in map {
                let name = match key {
                    Key::Name(name) => name.clone(),
                    Key::Attr(name) => format!("@{name}"),
                };
                out.insert(Value::String(name), from_node(child));
            }
            Value::Mapping(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::flatten;

    #[test]
    fn mapping_order_is_preserved() {
        let node = parse("zulu: 1\nalpha: 2\n").unwrap();
        let records = flatten(&node);
        let paths: Vec<String> = records.iter().map(|r| r.path.to_string()).collect();
        assert_eq!(paths, ["zulu", "alpha"]);
    }

    #[test]
    fn sequences_and_scalars_coerce() {
        let node = parse("items:\n  - 1\n  - true\n  - text\n").unwrap();
        let records = flatten(&node);
        let values: Vec<&str> = records.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, ["1", "true", "text"]);
    }

    #[test]
    fn numeric_key_becomes_a_string_key() {
        let node = parse("404: missing\n").unwrap();
        let records = flatten(&node);
        assert_eq!(records[0].path.to_string(), "404");
    }

    #[test]
    fn rendered_leaves_reparse_as_strings() {
        let node = parse("count: 3\n").unwrap();
        let text = render(&node).unwrap();
        let reparsed = parse(&text).unwrap();
        assert_eq!(flatten(&reparsed)[0].value, "3");
        assert!(text.contains('\''));
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(parse("a: [unclosed\n").is_err());
    }
}
