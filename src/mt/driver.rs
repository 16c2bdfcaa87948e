//! Batch translation driver
//!
//! Takes the planned units for one locale, masks them, sends them to the
//! translator in fixed-size batches, unmasks the answers and commits each
//! result into the target tree in plan order.
//!
//! A bad batch never aborts a run. When the backend fails, times out, or
//! answers with the wrong number of texts, every unit of that batch is
//! committed with its original source text. A single answer that comes back
//! blank, or that lost one of its placeholders, falls back the same way on
//! its own. Masked tokens therefore never reach the target tree.

use crate::error::{MtError, MtResult};
use crate::mt::mask::{PlaceholderMapping, PlaceholderSet, unmask};
use crate::mt::translator::MachineTranslator;
use crate::patch;
use crate::plan::TranslationUnit;
use crate::tree::is_blank;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Counters for one driver run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Units committed, translated or not
    pub units: usize,
    /// Units committed with a backend translation
    pub translated: usize,
    /// Units committed with their source text
    pub fallbacks: usize,
    /// Blank sources copied without a backend call
    pub blank: usize,
    pub batches: usize,
    /// Batches whose backend call failed as a whole
    pub failed_batches: usize,
}

/// Sequential batch translator bound to one backend
pub struct BatchDriver<'a> {
    translator: &'a dyn MachineTranslator,
    placeholders: &'a PlaceholderSet,
    source_locale: String,
    batch_size: usize,
    pace: Duration,
    call_timeout: Option<Duration>,
}

impl<'a> BatchDriver<'a> {
    pub fn new(
        translator: &'a dyn MachineTranslator,
        placeholders: &'a PlaceholderSet,
        source_locale: &str,
    ) -> Self {
        Self {
            translator,
            placeholders,
            source_locale: source_locale.to_string(),
            batch_size: 50,
            pace: Duration::ZERO,
            call_timeout: None,
        }
    }

    /// Maximum units per backend call; zero is treated as one
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Pause between consecutive backend calls
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    /// Upper bound on a single backend call, on top of any transport timeout
    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Translate `units` into `target_locale` and commit them into `target`
    ///
    /// Only a structural conflict in the target tree is returned as an error;
    /// every backend problem is absorbed by the fallback policy. Blank sources
    /// are committed as they are, without a backend call.
    pub async fn run(
        &self,
        target: &mut Value,
        units: &[TranslationUnit],
        target_locale: &str,
    ) -> MtResult<RunSummary> {
        let mut summary = RunSummary::default();
        let total_batches = units.len().div_ceil(self.batch_size);

        for (batch_index, chunk) in units.chunks(self.batch_size).enumerate() {
            let pending: Vec<&TranslationUnit> =
                chunk.iter().filter(|unit| !is_blank(&unit.source)).collect();

            let texts = if pending.is_empty() {
                Some(Vec::new())
            } else {
                if summary.batches > 0 && !self.pace.is_zero() {
                    tokio::time::sleep(self.pace).await;
                }
                debug!(
                    locale = target_locale,
                    batch = batch_index + 1,
                    of = total_batches,
                    size = pending.len(),
                    "translating batch"
                );
                summary.batches += 1;
                let texts = self.translate_chunk(&pending, target_locale).await;
                if texts.is_none() {
                    summary.failed_batches += 1;
                }
                texts
            };

            let mut answers = texts.into_iter().flatten();
            for unit in chunk {
                if is_blank(&unit.source) {
                    patch::commit(target, unit, unit.source.clone())?;
                    summary.blank += 1;
                } else {
                    match answers.next().flatten() {
                        Some(text) => {
                            patch::commit(target, unit, text)?;
                            summary.translated += 1;
                        }
                        None => {
                            patch::commit(target, unit, unit.source.clone())?;
                            summary.fallbacks += 1;
                        }
                    }
                }
                summary.units += 1;
            }
        }

        info!(
            locale = target_locale,
            provider = self.translator.provider_name(),
            units = summary.units,
            translated = summary.translated,
            fallbacks = summary.fallbacks,
            blank = summary.blank,
            batches = summary.batches,
            failed_batches = summary.failed_batches,
            "translation pass finished"
        );
        Ok(summary)
    }

    /// One backend round-trip for the non-blank units of a chunk
    ///
    /// `None` means all of them fall back. Otherwise entry `i` belongs to
    /// unit `i`, and a `None` entry falls back for that unit alone.
    async fn translate_chunk(
        &self,
        pending: &[&TranslationUnit],
        target_locale: &str,
    ) -> Option<Vec<Option<String>>> {
        let (masked, mappings): (Vec<String>, Vec<PlaceholderMapping>) = pending
            .iter()
            .map(|unit| self.placeholders.mask(&unit.source))
            .unzip();

        let outcome = match self.call_backend(&masked, target_locale).await {
            Ok(texts) if texts.len() == masked.len() => Ok(texts),
            Ok(texts) => Err(MtError::ResponseMismatch {
                expected: masked.len(),
                actual: texts.len(),
            }),
            Err(err) => Err(err),
        };

        let texts = match outcome {
            Ok(texts) => texts,
            Err(err) => {
                warn!(
                    locale = target_locale,
                    size = pending.len(),
                    error = %err,
                    "batch failed, keeping source text"
                );
                return None;
            }
        };

        let restored = pending
            .iter()
            .zip(texts.iter().zip(mappings.iter()))
            .map(|(unit, (text, mapping))| restore(unit, text, mapping, target_locale))
            .collect();
        Some(restored)
    }

    async fn call_backend(&self, texts: &[String], target_locale: &str) -> MtResult<Vec<String>> {
        let call = self
            .translator
            .translate_batch(texts, &self.source_locale, target_locale);
        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| MtError::Timeout(limit))?,
            None => call.await,
        }
    }
}

/// Unmask one answer, or `None` when it is unusable
fn restore(
    unit: &TranslationUnit,
    text: &str,
    mapping: &PlaceholderMapping,
    target_locale: &str,
) -> Option<String> {
    let restored = unmask(text, mapping);
    if is_blank(&restored) {
        warn!(locale = target_locale, path = %unit.path, "blank translation, keeping source text");
        return None;
    }
    let missing = mapping.missing_in(&restored);
    if !missing.is_empty() {
        warn!(
            locale = target_locale,
            path = %unit.path,
            missing = ?missing,
            "translation lost placeholders, keeping source text"
        );
        return None;
    }
    Some(restored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mt::mock::{MockMode, MockTranslator};
    use crate::plan::plan_units;
    use serde_json::json;
    use std::collections::HashMap;

    fn mappings(pairs: &[(&str, &str)]) -> MockMode {
        let map: HashMap<(String, String), String> = pairs
            .iter()
            .map(|(from, to)| ((from.to_string(), "fr".to_string()), to.to_string()))
            .collect();
        MockMode::Mappings(map)
    }

    async fn run_with(
        mode: MockMode,
        reference: &Value,
        target: &mut Value,
        batch_size: usize,
    ) -> RunSummary {
        let translator = MockTranslator::new(mode);
        let placeholders = PlaceholderSet::default();
        let units = plan_units(reference, Some(&target.clone()));
        BatchDriver::new(&translator, &placeholders, "en")
            .with_batch_size(batch_size)
            .run(target, &units, "fr")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_batches_are_partitioned() {
        let translator = MockTranslator::new(MockMode::Suffix);
        let placeholders = PlaceholderSet::default();
        let reference = json!({"a": "1", "b": "2", "c": "3", "d": "4", "e": "5"});
        let units = plan_units(&reference, None);
        let mut target = json!({});

        let summary = BatchDriver::new(&translator, &placeholders, "en")
            .with_batch_size(2)
            .run(&mut target, &units, "fr")
            .await
            .unwrap();

        assert_eq!(translator.calls(), 3);
        assert_eq!(summary.batches, 3);
        assert_eq!(summary.translated, 5);
        assert_eq!(
            target,
            json!({"a": "1_fr", "b": "2_fr", "c": "3_fr", "d": "4_fr", "e": "5_fr"})
        );
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_one() {
        let translator = MockTranslator::new(MockMode::NoOp);
        let placeholders = PlaceholderSet::default();
        let units = plan_units(&json!({"a": "1", "b": "2"}), None);
        let mut target = json!({});
        BatchDriver::new(&translator, &placeholders, "en")
            .with_batch_size(0)
            .run(&mut target, &units, "fr")
            .await
            .unwrap();
        assert_eq!(translator.calls(), 2);
    }

    #[tokio::test]
    async fn test_placeholders_survive_round_trip() {
        let reference = json!({"a": {"b": "Hello {{name}}"}});
        let mut target = json!({});
        let summary = run_with(
            mappings(&[("Hello __PH0__", "Bonjour __PH0__")]),
            &reference,
            &mut target,
            50,
        )
        .await;
        assert_eq!(target, json!({"a": {"b": "Bonjour {{name}}"}}));
        assert_eq!(summary.translated, 1);
    }

    #[tokio::test]
    async fn test_short_response_falls_back_to_source() {
        let reference = json!({"a": "One {x}", "b": "Two", "c": "Three"});
        let mut target = json!({});
        let summary = run_with(MockMode::ShortResponse, &reference, &mut target, 3).await;
        assert_eq!(target, json!({"a": "One {x}", "b": "Two", "c": "Three"}));
        assert_eq!(summary.fallbacks, 3);
        assert_eq!(summary.failed_batches, 1);
    }

    #[tokio::test]
    async fn test_backend_error_falls_back_per_batch() {
        let reference = json!({"a": "Hello %s", "b": "Bye"});
        let mut target = json!({});
        let summary = run_with(
            MockMode::Error("503".to_string()),
            &reference,
            &mut target,
            1,
        )
        .await;
        assert_eq!(target, json!({"a": "Hello %s", "b": "Bye"}));
        assert_eq!(summary.failed_batches, 2);
        assert_eq!(summary.fallbacks, 2);
    }

    #[tokio::test]
    async fn test_blank_answer_falls_back_individually() {
        let reference = json!({"a": "Yes", "b": "No"});
        let mut target = json!({});
        let summary = run_with(
            mappings(&[("Yes", "Oui"), ("No", "   ")]),
            &reference,
            &mut target,
            10,
        )
        .await;
        assert_eq!(target, json!({"a": "Oui", "b": "No"}));
        assert_eq!(summary.translated, 1);
        assert_eq!(summary.fallbacks, 1);
        assert_eq!(summary.failed_batches, 0);
    }

    #[tokio::test]
    async fn test_lost_placeholder_falls_back() {
        let reference = json!({"a": "{count} files"});
        let mut target = json!({});
        run_with(
            mappings(&[("__PH0__ files", "des fichiers")]),
            &reference,
            &mut target,
            10,
        )
        .await;
        assert_eq!(target, json!({"a": "{count} files"}));
    }

    #[tokio::test]
    async fn test_reordered_placeholders_are_accepted() {
        let reference = json!({"a": "{user} sent {count}"});
        let mut target = json!({});
        run_with(MockMode::Reorder, &reference, &mut target, 10).await;
        assert_eq!(target, json!({"a": "{count} sent {user}"}));
    }

    #[tokio::test]
    async fn test_call_timeout_falls_back() {
        let translator = MockTranslator::with_delay(MockMode::Suffix, Duration::from_millis(200));
        let placeholders = PlaceholderSet::default();
        let units = plan_units(&json!({"a": "Slow"}), None);
        let mut target = json!({});
        let summary = BatchDriver::new(&translator, &placeholders, "en")
            .with_call_timeout(Some(Duration::from_millis(10)))
            .run(&mut target, &units, "fr")
            .await
            .unwrap();
        assert_eq!(target, json!({"a": "Slow"}));
        assert_eq!(summary.failed_batches, 1);
    }

    #[tokio::test]
    async fn test_pace_between_batches() {
        let translator = MockTranslator::new(MockMode::NoOp);
        let placeholders = PlaceholderSet::default();
        let units = plan_units(&json!({"a": "1", "b": "2", "c": "3"}), None);
        let mut target = json!({});
        let start = std::time::Instant::now();
        BatchDriver::new(&translator, &placeholders, "en")
            .with_batch_size(1)
            .with_pace(Duration::from_millis(15))
            .run(&mut target, &units, "fr")
            .await
            .unwrap();
        // Two pauses: between batches 1-2 and 2-3, none after the last
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_blank_sources_skip_the_backend() {
        let translator = MockTranslator::new(MockMode::Suffix);
        let placeholders = PlaceholderSet::default();
        let units = plan_units(&json!({"e": "", "w": "  ", "a": "Hi"}), None);
        let mut target = json!({});

        let summary = BatchDriver::new(&translator, &placeholders, "en")
            .with_batch_size(2)
            .run(&mut target, &units, "fr")
            .await
            .unwrap();

        // First chunk holds only blanks, so only the second one is sent
        assert_eq!(translator.calls(), 1);
        assert_eq!(summary.batches, 1);
        assert_eq!(summary.blank, 2);
        assert_eq!(summary.translated, 1);
        assert_eq!(target, json!({"e": "", "w": "  ", "a": "Hi_fr"}));
    }

    #[tokio::test]
    async fn test_empty_plan_makes_no_calls() {
        let translator = MockTranslator::new(MockMode::Suffix);
        let placeholders = PlaceholderSet::default();
        let mut target = json!({"a": "done"});
        let summary = BatchDriver::new(&translator, &placeholders, "en")
            .run(&mut target, &[], "fr")
            .await
            .unwrap();
        assert_eq!(summary, RunSummary::default());
        assert_eq!(translator.calls(), 0);
    }

    #[tokio::test]
    async fn test_structural_conflict_is_returned() {
        let translator = MockTranslator::new(MockMode::Suffix);
        let placeholders = PlaceholderSet::default();
        let reference = json!({"list": ["One"]});
        let mut target = json!({"list": {"keep": "me"}});
        let units = plan_units(&reference, Some(&target.clone()));
        let result = BatchDriver::new(&translator, &placeholders, "en")
            .run(&mut target, &units, "fr")
            .await;
        assert!(matches!(result, Err(MtError::Structural { .. })));
    }
}
