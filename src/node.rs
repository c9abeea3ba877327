use indexmap::IndexMap;

/// Mapping key for the generic document tree.
///
/// Attribute keys keep XML attributes distinct from same-named child
/// elements once a document has been lifted into the generic tree; the
/// other formats only ever produce plain `Name` keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Name(String),
    Attr(String),
}

impl Key {
    pub fn name(value: impl Into<String>) -> Self {
        Key::Name(value.into())
    }

    pub fn attr(value: impl Into<String>) -> Self {
        Key::Attr(value.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Key::Name(s) | Key::Attr(s) => s,
        }
    }
}

/// Generic in-memory form of a structured document.
///
/// Every value is a string at this layer; scalar typing is a concern of
/// the format adapters. Mappings preserve insertion order and never hold
/// duplicate keys; sequences preserve positional order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Scalar(String),
    Sequence(Vec<Node>),
    Mapping(IndexMap<Key, Node>),
}

impl Node {
    pub fn scalar(value: impl Into<String>) -> Self {
        Node::Scalar(value.into())
    }

    pub fn empty_mapping() -> Self {
        Node::Mapping(IndexMap::new())
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Node::Scalar(_))
    }
}
