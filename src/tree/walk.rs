//! Depth-first enumeration of leaf paths
//!
//! The walk uses an explicit stack rather than recursion, so it is lazy and
//! deep catalogs cannot overflow the call stack. Order follows the containers:
//! insertion order for mappings, position for sequences.

use super::path::{Segment, TreePath};
use serde_json::{Value, map};
use std::iter::Enumerate;
use std::slice;

enum Frame<'a> {
    Mapping(map::Iter<'a>),
    Sequence(Enumerate<slice::Iter<'a, Value>>),
}

impl<'a> Frame<'a> {
    fn open(value: &'a Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Frame::Mapping(map.iter())),
            Value::Array(items) => Some(Frame::Sequence(items.iter().enumerate())),
            _ => None,
        }
    }

    fn next_child(&mut self) -> Option<(Segment, &'a Value)> {
        match self {
            Frame::Mapping(entries) => entries
                .next()
                .map(|(key, value)| (Segment::Key(key.clone()), value)),
            Frame::Sequence(items) => items
                .next()
                .map(|(index, value)| (Segment::Index(index), value)),
        }
    }
}

/// Iterator over `(path, leaf)` pairs of a tree
pub struct Leaves<'a> {
    root: Option<&'a Value>,
    stack: Vec<Frame<'a>>,
    // Segments leading to the container on top of the stack
    prefix: Vec<Segment>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = (TreePath, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            match Frame::open(root) {
                Some(frame) => self.stack.push(frame),
                None => return Some((TreePath::root(), root)),
            }
        }

        loop {
            let frame = self.stack.last_mut()?;
            match frame.next_child() {
                Some((segment, child)) => match Frame::open(child) {
                    Some(child_frame) => {
                        self.prefix.push(segment);
                        self.stack.push(child_frame);
                    }
                    None => {
                        let mut segments = self.prefix.clone();
                        segments.push(segment);
                        return Some((TreePath::from(segments), child));
                    }
                },
                None => {
                    self.stack.pop();
                    self.prefix.pop();
                }
            }
        }
    }
}

/// Every leaf of `tree` with its path, depth-first
///
/// Empty mappings and sequences contain no leaves and yield nothing. A scalar
/// root yields the root path once.
pub fn leaves(tree: &Value) -> Leaves<'_> {
    Leaves {
        root: Some(tree),
        stack: Vec::new(),
        prefix: Vec::new(),
    }
}

/// Every leaf path of `tree`, strings and other scalars alike
pub fn walk(tree: &Value) -> impl Iterator<Item = TreePath> + '_ {
    leaves(tree).map(|(path, _)| path)
}
