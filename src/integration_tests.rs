//! End-to-End Integration Tests for the translation pipeline
//!
//! Plan, mask, translate, unmask and patch together, driven by
//! `MockTranslator` so that every run is deterministic and offline.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --lib integration_tests
//! ```

#[cfg(test)]
mod tests {
    use crate::config::{BackendConfig, BackendKind, Settings};
    use crate::fill::{Filler, LocaleOutcome};
    use crate::mt::{BatchDriver, MockMode, MockTranslator, PlaceholderSet, RunSummary};
    use crate::plan::plan_units;
    use crate::report::coverage;
    use crate::tree::{NodeKind, get, leaves};
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    async fn translate(
        translator: &MockTranslator,
        reference: &Value,
        target: &mut Value,
        batch_size: usize,
    ) -> RunSummary {
        let placeholders = PlaceholderSet::default();
        let units = plan_units(reference, Some(&target.clone()));
        BatchDriver::new(translator, &placeholders, "en")
            .with_batch_size(batch_size)
            .run(target, &units, "fr")
            .await
            .unwrap()
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn french(pairs: &[(&str, &str)]) -> MockTranslator {
        let map: HashMap<(String, String), String> = pairs
            .iter()
            .map(|(from, to)| ((from.to_string(), "fr".to_string()), to.to_string()))
            .collect();
        MockTranslator::new(MockMode::Mappings(map))
    }

    // ============================================================================
    // Scenarios
    // ============================================================================

    #[tokio::test]
    async fn test_nested_message_with_placeholder() {
        let reference = json!({"a": {"b": "Hello {{name}}"}});
        let mut target = json!({});
        // The backend sees the masked text and answers with the placeholder restored
        let translator = french(&[("Hello __PH0__", "Bonjour {{name}}")]);

        translate(&translator, &reference, &mut target, 50).await;

        assert_eq!(target, json!({"a": {"b": "Bonjour {{name}}"}}));
        assert_eq!(translator.calls(), 1);
    }

    #[tokio::test]
    async fn test_whitespace_value_is_retranslated() {
        let reference = json!({"x": "Save"});
        let mut target = json!({"x": "  "});
        let translator = french(&[("Save", "Enregistrer")]);

        let summary = translate(&translator, &reference, &mut target, 50).await;

        assert_eq!(summary.units, 1);
        assert_eq!(target, json!({"x": "Enregistrer"}));
    }

    #[tokio::test]
    async fn test_list_is_materialized() {
        let reference = json!({"list": ["One", "Two"]});
        let mut target = json!({});
        let translator = french(&[("One", "Un"), ("Two", "Deux")]);

        translate(&translator, &reference, &mut target, 50).await;

        assert_eq!(target, json!({"list": ["Un", "Deux"]}));
    }

    #[tokio::test]
    async fn test_short_response_keeps_source_for_whole_batch() {
        let reference = json!({"a": "First", "b": "Second {n}", "c": "Third"});
        let mut target = json!({});
        let translator = MockTranslator::new(MockMode::ShortResponse);

        let summary = translate(&translator, &reference, &mut target, 3).await;

        assert_eq!(target, reference);
        assert_eq!(summary.fallbacks, 3);
        assert_eq!(summary.failed_batches, 1);
    }

    // ============================================================================
    // Merge properties
    // ============================================================================

    #[tokio::test]
    async fn test_second_run_changes_nothing() {
        let reference = json!({"a": "One", "b": {"c": "Two %s"}, "l": ["x", "y"]});
        let mut target = json!({});
        // Each call tags its output with the call number, so a second pass
        // that re-translated anything would show up as a changed value
        let translator = MockTranslator::new(MockMode::Counter);

        translate(&translator, &reference, &mut target, 2).await;
        let after_first = target.clone();
        let calls = translator.calls();

        let summary = translate(&translator, &reference, &mut target, 2).await;

        assert_eq!(target, after_first);
        assert_eq!(summary, RunSummary::default());
        assert_eq!(translator.calls(), calls);
    }

    #[tokio::test]
    async fn test_existing_values_are_untouched() {
        let reference = json!({
            "title": "Title",
            "menu": {"open": "Open", "close": "Close"},
            "count": 3
        });
        let mut target = json!({
            "menu": {"close": "Fermer", "legacy": "Ancien"},
            "title": "Titre",
            "count": "trois"
        });
        let translator = MockTranslator::new(MockMode::Suffix);

        translate(&translator, &reference, &mut target, 50).await;

        assert_eq!(target["title"], "Titre");
        assert_eq!(target["menu"]["close"], "Fermer");
        assert_eq!(target["menu"]["legacy"], "Ancien");
        assert_eq!(target["menu"]["open"], "Open_fr");
        // Non-string reference leaves are never planned
        assert_eq!(target["count"], "trois");
        let order: Vec<&String> = target["menu"].as_object().unwrap().keys().collect();
        assert_eq!(order, vec!["close", "legacy", "open"]);
    }

    #[tokio::test]
    async fn test_every_reference_string_ends_up_a_string() {
        let reference = json!({
            "a": "A",
            "b": {"c": ["C0", {"d": "D"}], "e": null, "f": true},
            "g": [["G"]],
            "h": {"i": 1.5, "j": "J {x}"}
        });
        let mut target = json!({"b": {"c": ["", 7]}, "g": "flat"});
        let translator = MockTranslator::new(MockMode::Reorder);

        translate(&translator, &reference, &mut target, 2).await;

        for (path, value) in leaves(&reference) {
            if matches!(NodeKind::of(value), NodeKind::StringLeaf(_)) {
                assert!(
                    matches!(get(&target, &path), Some(Value::String(_))),
                    "{} is not a string in {}",
                    path,
                    target
                );
            }
        }
        assert!(coverage(&reference, &target).is_complete());
    }

    #[tokio::test]
    async fn test_masked_tokens_never_reach_the_tree() {
        let reference = json!({
            "a": "Hi {{user}}, you have %(count)d new <b>messages</b>",
            "b": "Path :id and {0}"
        });
        let mut target = json!({});
        // Drop the tokens entirely, as a careless backend would
        let translator = french(&[
            ("Hi __PH0__, you have __PH1__ new __PH2__messages__PH3__", "Salut"),
            ("Path __PH0__ and __PH1__", "Chemin __PH0__ et __PH1__"),
        ]);

        translate(&translator, &reference, &mut target, 50).await;

        assert_eq!(target["a"], reference["a"]);
        assert_eq!(target["b"], "Chemin :id et {0}");
        assert!(!target.to_string().contains("__PH"));
    }

    // ============================================================================
    // Files on disk
    // ============================================================================

    #[tokio::test]
    async fn test_fill_then_check_round() {
        let dir = tempdir().unwrap();
        let reference_path = dir.path().join("en.json");
        fs::write(
            &reference_path,
            r#"{"app": {"title": "Notes", "greet": "Hello {{name}}"}, "items": ["A", "B"]}"#,
        )
        .unwrap();
        let outdir = dir.path().join("locales");
        fs::create_dir(&outdir).unwrap();
        fs::write(
            outdir.join("fr.json"),
            r#"{"app": {"title": "Carnet", "greet": ""}}"#,
        )
        .unwrap();

        let settings = Settings {
            pace_ms: 0,
            backend: BackendConfig {
                kind: BackendKind::Mock,
                ..BackendConfig::default()
            },
            ..Settings::default()
        };
        let translator = settings.translator().unwrap();
        let reports = Filler::new(&settings, translator.as_ref(), &outdir)
            .unwrap()
            .run(&reference_path, &["fr".to_string(), "ja".to_string()])
            .await
            .unwrap();

        assert!(
            reports
                .iter()
                .all(|r| matches!(r.outcome, LocaleOutcome::Written { .. }))
        );

        let fr = read_json(&outdir.join("fr.json"));
        assert_eq!(
            fr,
            json!({
                "app": {"title": "Carnet", "greet": "Hello {{name}}_fr"},
                "items": ["A_fr", "B_fr"]
            })
        );
        assert_eq!(
            fs::read_to_string(outdir.join("fr.json.bak")).unwrap(),
            r#"{"app": {"title": "Carnet", "greet": ""}}"#
        );
        assert!(!outdir.join("ja.json.bak").exists());

        let reference = read_json(&reference_path);
        let ja = read_json(&outdir.join("ja.json"));
        let report = coverage(&reference, &ja);
        assert_eq!(report.total, 4);
        assert_eq!(report.translated, 4);
        assert!(report.is_complete());
    }
}
