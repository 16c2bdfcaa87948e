//! Coverage of a target catalog against the reference

use crate::tree::{NodeKind, TreePath, get, is_blank, leaves};
use serde::Serialize;
use serde_json::Value;

/// How much of the reference a target already covers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    /// String leaves in the reference
    pub total: usize,
    /// Reference strings with a non-blank string in the target, plus blank
    /// reference strings with any string in the target
    pub translated: usize,
    /// Reference strings whose target value is an empty or whitespace string
    pub blank: usize,
    /// Reference strings with no usable target value (absent, blank or not a string)
    #[serde(serialize_with = "serialize_paths")]
    pub missing: Vec<TreePath>,
    /// Target leaves with no counterpart in the reference
    #[serde(serialize_with = "serialize_paths")]
    pub extra: Vec<TreePath>,
}

impl CoverageReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

fn serialize_paths<S: serde::Serializer>(
    paths: &[TreePath],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(paths.iter().map(|path| path.to_string()))
}

/// Compare `target` against `reference`
pub fn coverage(reference: &Value, target: &Value) -> CoverageReport {
    let mut report = CoverageReport::default();

    for (path, value) in leaves(reference) {
        let NodeKind::StringLeaf(source) = NodeKind::of(value) else {
            continue;
        };
        report.total += 1;
        match get(target, &path) {
            Some(Value::String(text)) if !is_blank(text) || is_blank(source) => {
                report.translated += 1
            }
            Some(Value::String(_)) => {
                report.blank += 1;
                report.missing.push(path);
            }
            _ => report.missing.push(path),
        }
    }

    report.extra = leaves(target)
        .filter(|(path, _)| get(reference, path).is_none())
        .map(|(path, _)| path)
        .collect();

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_complete_target() {
        let reference = json!({"a": "A", "b": {"c": "C"}});
        let target = json!({"a": "Ah", "b": {"c": "Ceh"}});
        let report = coverage(&reference, &target);
        assert_eq!(report.total, 2);
        assert_eq!(report.translated, 2);
        assert!(report.is_complete());
        assert!(report.extra.is_empty());
    }

    #[test]
    fn test_missing_blank_and_extra() {
        let reference = json!({"a": "A", "b": "B", "c": "C", "n": 5});
        let target = json!({"a": "Ah", "b": " ", "old": "Gone", "n": 5});
        let report = coverage(&reference, &target);
        assert_eq!(report.total, 3);
        assert_eq!(report.translated, 1);
        assert_eq!(report.blank, 1);
        let missing: Vec<String> = report.missing.iter().map(|p| p.to_string()).collect();
        assert_eq!(missing, vec!["b", "c"]);
        let extra: Vec<String> = report.extra.iter().map(|p| p.to_string()).collect();
        assert_eq!(extra, vec!["old"]);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_blank_reference_string_is_complete_when_blank_in_target() {
        let reference = json!({"a": "A", "e": ""});
        let report = coverage(&reference, &json!({"a": "Ah", "e": ""}));
        assert_eq!(report.translated, 2);
        assert_eq!(report.blank, 0);
        assert!(report.is_complete());

        let report = coverage(&reference, &json!({"a": "Ah"}));
        assert_eq!(report.missing.len(), 1);
    }

    #[test]
    fn test_serializes_paths_as_strings() {
        let report = coverage(&json!({"l": ["x"]}), &json!({}));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["missing"], json!(["l[0]"]));
        assert_eq!(value["total"], json!(1));
    }
}
