//! Tree patcher: commits translated strings into the target tree

use crate::error::MtResult;
use crate::plan::TranslationUnit;
use crate::tree;
use serde_json::Value;
use tracing::debug;

/// Write `text` into `target` at the unit's path, creating containers on the way
pub fn commit(target: &mut Value, unit: &TranslationUnit, text: String) -> MtResult<()> {
    debug!(path = %unit.path, "commit");
    tree::set(target, &unit.path, Value::String(text))
}
