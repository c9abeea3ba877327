//! Flattening a document tree into editable records and rebuilding the
//! tree from them.
//!
//! The flat form is the editing surface: one record per scalar leaf,
//! addressed by its [`PathKey`]. Rebuilding is driven purely by the path
//! segments, so a record list is a complete description of the tree shape
//! (empty mappings and sequences excepted, which have no leaves to carry
//! them).

use crate::node::{Key, Node};
use crate::path::{PathKey, Segment};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use thiserror::Error;

/// Maximum nesting depth accepted anywhere a document crosses the flat
/// boundary. Deeper documents are rejected rather than risking the stack.
pub const MAX_DEPTH: usize = 128;

/// One flattened leaf of a document: an addressable value plus the
/// metadata the source format carried for it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    pub path: PathKey,
    pub value: String,
    pub comment: Option<String>,
    pub flags: BTreeSet<String>,
}

impl Record {
    pub fn new(path: PathKey, value: impl Into<String>) -> Self {
        Self {
            path,
            value: value.into(),
            comment: None,
            flags: BTreeSet::new(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("path '{path}' nests deeper than {limit} levels")]
    TooDeep { path: String, limit: usize },

    #[error("duplicate value at path '{path}'")]
    DuplicateLeaf { path: String },

    #[error("path '{path}' addresses both a value and a subtree")]
    LeafBranchConflict { path: String },

    #[error("type conflict at '{path}': {message}")]
    TypeConflict { path: String, message: String },
}

/// Flatten a tree into records, one per scalar leaf.
///
/// Traversal is depth-first with mapping children in insertion order and
/// sequence children in ascending index order, driven by an explicit work
/// stack so arbitrarily deep input cannot exhaust the call stack. The
/// codec never invents comments or flags; those are merged in by the
/// format adapters.
pub fn flatten(node: &Node) -> Vec<Record> {
    let mut records = Vec::new();
    let mut stack: Vec<(PathKey, &Node)> = vec![(PathKey::default(), node)];

    while let Some((path, node)) = stack.pop() {
        match node {
            Node::Scalar(value) => records.push(Record::new(path, value.clone())),
            Node::Sequence(items) => {
                for (index, child) in items.iter().enumerate().rev() {
                    stack.push((path.child(Segment::Index(index)), child));
                }
            }
            Node::Mapping(map) => {
                for (key, child) in map.iter().rev() {
                    let segment = match key {
                        Key::Name(name) => Segment::Key(name.clone()),
                        Key::Attr(name) => Segment::Attr(name.clone()),
                    };
                    stack.push((path.child(segment), child));
                }
            }
        }
    }

    records
}

/// Rebuild a tree from records.
///
/// The builder owns the tree it grows and returns it by value. Each
/// segment types the position it lands on: indexes make sequences
/// (growing them as needed, gaps become empty mappings), keys make
/// mappings, and a numeric key landing on an existing sequence is read as
/// an index. Conflicting paths are an error, never silent corruption.
pub fn unflatten(records: &[Record]) -> Result<Node, CodecError> {
    let mut root = Slot::Untyped;
    for record in records {
        insert(&mut root, record)?;
    }
    Ok(finish(root))
}

/// Tree under construction. `Untyped` marks positions that have been
/// addressed but not yet typed by any segment; they finish as empty
/// mappings (the placeholder for sequence gaps).
enum Slot {
    Untyped,
    Scalar(String),
    Sequence(Vec<Slot>),
    Mapping(IndexMap<Key, Slot>),
}

fn insert(root: &mut Slot, record: &Record) -> Result<(), CodecError> {
    let segments = record.path.segments();
    if segments.len() > MAX_DEPTH {
        return Err(CodecError::TooDeep {
            path: record.path.to_string(),
            limit: MAX_DEPTH,
        });
    }

    let mut slot = root;
    for segment in segments {
        slot = descend(slot, segment, &record.path)?;
    }

    match slot {
        Slot::Untyped => {
            *slot = Slot::Scalar(record.value.clone());
            Ok(())
        }
        Slot::Scalar(_) => Err(CodecError::DuplicateLeaf {
            path: record.path.to_string(),
        }),
        Slot::Sequence(_) | Slot::Mapping(_) => Err(CodecError::LeafBranchConflict {
            path: record.path.to_string(),
        }),
    }
}

fn descend<'a>(
    slot: &'a mut Slot,
    segment: &Segment,
    path: &PathKey,
) -> Result<&'a mut Slot, CodecError> {
    match segment {
        Segment::Index(index) => match slot {
            Slot::Untyped => {
                *slot = Slot::Sequence(Vec::new());
                descend(slot, segment, path)
            }
            Slot::Sequence(items) => {
                if items.len() <= *index {
                    items.resize_with(index + 1, || Slot::Untyped);
                }
                Ok(&mut items[*index])
            }
            Slot::Mapping(_) => Err(CodecError::TypeConflict {
                path: path.to_string(),
                message: format!("index [{index}] lands on a mapping"),
            }),
            Slot::Scalar(_) => Err(CodecError::LeafBranchConflict {
                path: path.to_string(),
            }),
        },
        Segment::Key(key) => descend_key(slot, Key::Name(key.clone()), segment, path),
        Segment::Attr(name) => descend_key(slot, Key::Attr(name.clone()), segment, path),
    }
}

fn descend_key<'a>(
    slot: &'a mut Slot,
    key: Key,
    segment: &Segment,
    path: &PathKey,
) -> Result<&'a mut Slot, CodecError> {
    match slot {
        Slot::Untyped => {
            *slot = Slot::Mapping(IndexMap::new());
            descend_key(slot, key, segment, path)
        }
        Slot::Mapping(map) => Ok(map.entry(key).or_insert(Slot::Untyped)),
        Slot::Sequence(items) => {
            // a numeric key addressing an existing sequence is an index
            let index: usize = key.as_str().parse().map_err(|_| CodecError::TypeConflict {
                path: path.to_string(),
                message: format!("key '{}' lands on a sequence", key.as_str()),
            })?;
            if !matches!(segment, Segment::Key(_)) {
                return Err(CodecError::TypeConflict {
                    path: path.to_string(),
                    message: format!("attribute '{}' lands on a sequence", key.as_str()),
                });
            }
            if items.len() <= index {
                items.resize_with(index + 1, || Slot::Untyped);
            }
            Ok(&mut items[index])
        }
        Slot::Scalar(_) => Err(CodecError::LeafBranchConflict {
            path: path.to_string(),
        }),
    }
}

fn finish(slot: Slot) -> Node {
    match slot {
        Slot::Untyped => Node::empty_mapping(),
        Slot::Scalar(value) => Node::Scalar(value),
        Slot::Sequence(items) => Node::Sequence(items.into_iter().map(finish).collect()),
        Slot::Mapping(map) => {
            Node::Mapping(map.into_iter().map(|(k, v)| (k, finish(v))).collect())
        }
    }
}
