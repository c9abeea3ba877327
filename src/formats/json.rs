//! JSON adapter.
//!
//! Structure is lossless; scalar types are not. Numbers, booleans and
//! nulls coerce to strings on load (null becomes the empty string) and
//! every leaf is written back as a JSON string. Numeric-looking strings
//! are never reinterpreted.

use crate::codec::MAX_DEPTH;
use crate::formats::FormatError;
use crate::node::{Key, Node};
use indexmap::IndexMap;
use serde_json::Value;

pub(super) fn parse(text: &str) -> Result<Node, FormatError> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| FormatError::malformed("json", err))?;
    to_node(&value, 0)
}

pub(super) fn render(node: &Node) -> Result<String, FormatError> {
    let value = from_node(node);
    let mut text =
        serde_json::to_string_pretty(&value).map_err(|err| FormatError::malformed("json", err))?;
    text.push('\n');
    Ok(text)
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
        Value::Array(items) => Node::Sequence(
            items
                .iter()
                .map(|item| to_node(item, depth + 1))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => {
            let mut out = IndexMap::new();
            for (key, child) in map {
                out.insert(Key::name(key.clone()), to_node(child, depth + 1)?);
            }
            Node::Mapping(out)
        }
    })
}

fn from_node(node: &Node) -> Value {
    match node {
        Node::Scalar(value) => Value::String(value.clone()),
        Node::Sequence(items) => Value::Array(items.iter().map(from_node).collect()),
        Node::Mapping(map) => {
            let mut out = serde_json::Map::new();
            for (key, child) in map {
                // attribute keys only exist for XML trees; keep them visible
                let name = match key {
                    Key::Name(name) => name.clone(),
                    Key::Attr(name) => format!("@{name}"),
                };
                out.insert(name, from_node(child));
            }
            Value::Object(out)
        }
    }
}
