//! Paths into locale trees, with tolerant lookup and materializing writes

use crate::error::{MtError, MtResult};
use serde_json::{Map, Value};
use std::fmt;

/// One step of a path: a mapping key or a sequence index
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// Location of a node inside a tree. The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreePath(Vec<Segment>);

impl TreePath {
    pub fn root() -> Self {
        TreePath(Vec::new())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Segment>> for TreePath {
    fn from(segments: Vec<Segment>) -> Self {
        TreePath(segments)
    }
}

/// Renders as `a.b[0].c`; the root renders as `$`
impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "$");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => write!(f, "{}", key)?,
                Segment::Key(key) => write!(f, ".{}", key)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// Look up the node at `path`
///
/// Returns `None` when any segment is missing, out of bounds, or applied to the
/// wrong kind of node (an index into a mapping, a key into a sequence or leaf).
pub fn get<'a>(tree: &'a Value, path: &TreePath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(tree, |node, segment| match (segment, node) {
            (Segment::Key(key), Value::Object(map)) => map.get(key),
            (Segment::Index(index), Value::Array(items)) => items.get(*index),
            _ => None,
        })
}

/// Write `value` at `path`, creating intermediate containers as needed
///
/// A key segment turns any non-mapping node into an empty mapping. An index
/// segment turns any non-sequence node into an empty sequence and pads it with
/// `null` up to the index. The one refusal is an index applied to a non-empty
/// mapping: that target disagrees with the reference about the shape of the
/// tree, and replacing it would discard its content.
pub fn set(tree: &mut Value, path: &TreePath, value: Value) -> MtResult<()> {
    let mut node = tree;
    for (depth, segment) in path.segments().iter().enumerate() {
        node = descend_mut(node, segment, path, depth)?;
    }
    *node = value;
    Ok(())
}

fn descend_mut<'a>(
    node: &'a mut Value,
    segment: &Segment,
    path: &TreePath,
    depth: usize,
) -> MtResult<&'a mut Value> {
    match segment {
        Segment::Key(key) => {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            match node {
                Value::Object(map) => Ok(map.entry(key.clone()).or_insert(Value::Null)),
                _ => Err(structural(path, depth, "expected a mapping")),
            }
        }
        Segment::Index(index) => {
            let coerce = match &*node {
                Value::Array(_) => false,
                Value::Object(map) if !map.is_empty() => {
                    return Err(structural(
                        path,
                        depth,
                        "index into a non-empty mapping",
                    ));
                }
                _ => true,
            };
            if coerce {
                *node = Value::Array(Vec::new());
            }
            match node {
                Value::Array(items) => {
                    if items.len() <= *index {
                        items.resize(index + 1, Value::Null);
                    }
                    Ok(&mut items[*index])
                }
                _ => Err(structural(path, depth, "expected a sequence")),
            }
        }
    }
}

fn structural(path: &TreePath, depth: usize, reason: &str) -> MtError {
    let prefix = TreePath::from(path.segments()[..depth].to_vec());
    MtError::Structural {
        path: path.to_string(),
        reason: format!("{} at '{}'", reason, prefix),
    }
}
