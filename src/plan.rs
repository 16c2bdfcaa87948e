//! Diff planner: which reference strings still need a translation
//!
//! A reference string leaf is selected when the target has nothing usable at
//! the same path: the path is absent, the value there is blank, or it is not
//! a string at all. Existing non-blank translations are never selected, which
//! is what makes repeated runs idempotent. A blank reference string counts as
//! settled once the target holds any string there.

use crate::tree::{NodeKind, TreePath, get, is_blank, leaves};
use serde_json::Value;

/// One reference string scheduled for translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    pub path: TreePath,
    pub source: String,
}

fn needs_translation(target: Option<&Value>, path: &TreePath, source: &str) -> bool {
    match target.and_then(|tree| get(tree, path)) {
        // A blank reference string is settled by any string at all
        Some(Value::String(existing)) => is_blank(existing) && !is_blank(source),
        Some(_) | None => true,
    }
}

/// Untranslated string paths, in reference walk order
pub fn plan(reference: &Value, target: Option<&Value>) -> Vec<TreePath> {
    plan_units(reference, target)
        .into_iter()
        .map(|unit| unit.path)
        .collect()
}

/// Untranslated strings with their source text, in reference walk order
pub fn plan_units(reference: &Value, target: Option<&Value>) -> Vec<TranslationUnit> {
    leaves(reference)
        .filter_map(|(path, value)| match NodeKind::of(value) {
            NodeKind::StringLeaf(source) if needs_translation(target, &path, source) => {
                Some(TranslationUnit {
                    path,
                    source: source.to_string(),
                })
            }
            _ => None,
        })
        .collect()
}
