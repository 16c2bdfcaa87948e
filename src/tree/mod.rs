//! Locale trees and locations inside them
//!
//! A locale catalog is any JSON document: mappings (key order preserved),
//! sequences, and leaves. Only string leaves are translatable; numbers,
//! booleans and null are carried along untouched.
//!
//! ```ignore
//! use locale_mt::tree::{self, TreePath};
//! use serde_json::json;
//!
//! let mut target = json!({});
//! let path: TreePath = vec!["list".into(), 1usize.into()].into();
//! tree::set(&mut target, &path, json!("Two"))?;
//! assert_eq!(target, json!({"list": [null, "Two"]}));
//! ```

pub mod path;
pub mod walk;

pub use path::{Segment, TreePath, get, set};
pub use walk::{Leaves, leaves, walk};

use serde_json::{Map, Value};

/// A locale tree. Built with `preserve_order`, so mappings iterate in insertion order.
pub type Tree = Value;

/// Closed view over a tree node
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind<'a> {
    Mapping(&'a Map<String, Value>),
    Sequence(&'a [Value]),
    StringLeaf(&'a str),
    /// Number, boolean or null
    OtherLeaf,
}

impl<'a> NodeKind<'a> {
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => NodeKind::Mapping(map),
            Value::Array(items) => NodeKind::Sequence(items),
            Value::String(text) => NodeKind::StringLeaf(text),
            Value::Null | Value::Bool(_) | Value::Number(_) => NodeKind::OtherLeaf,
        }
    }
}

/// Empty or whitespace-only
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// An empty tree, used in place of a missing or unreadable target file
pub fn empty() -> Tree {
    Value::Object(Map::new())
}
