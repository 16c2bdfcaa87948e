//! Mock machine translator for tests and offline runs
//!
//! Deterministic, API-free translator. `--backend mock` uses the suffix mode;
//! `--backend none` uses the no-op mode, which fills every gap with the
//! source text.
//!
//! # Example
//!
//! ```ignore
//! let mock = MockTranslator::new(MockMode::Suffix);
//! let result = mock.translate("hello", "en", "fr").await?;
//! assert_eq!(result, "hello_fr");
//! ```

use crate::error::{MtError, MtResult};
use crate::mt::translator::MachineTranslator;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append locale suffix: "hello" → "hello_fr"
    Suffix,

    /// Predefined (text, target_locale) → translation; unknown texts get the suffix
    Mappings(HashMap<(String, String), String>),

    /// Reverse word order, like a backend for a language with different word order
    Reorder,

    /// Fail every call with a translation error
    Error(String),

    /// Return input unchanged
    NoOp,

    /// Answer every batch with an empty list
    ShortResponse,

    /// Tag each text with the number of the call: "hello" → "hello#1"
    Counter,
}

/// Mock translator that simulates various backend behaviors
///
/// Clones share the call counter, so a test can hand one clone to the driver
/// and inspect the other.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    /// Simulated network delay per batch
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a MockTranslator that sleeps before answering each batch
    pub fn with_delay(mode: MockMode, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(mode)
        }
    }

    /// Number of batch calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn apply_translation(&self, text: &str, target: &str, call: usize) -> MtResult<String> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::Reorder => Ok(text
                .split_whitespace()
                .rev()
                .collect::<Vec<_>>()
                .join(" ")),
            MockMode::Error(msg) => Err(MtError::Translation(msg.clone())),
            MockMode::NoOp => Ok(text.to_string()),
            MockMode::ShortResponse => Ok(String::new()),
            MockMode::Counter => Ok(format!("{}#{}", text, call)),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate_batch(
        &self,
        texts: &[String],
        _source_locale: &str,
        target_locale: &str,
    ) -> MtResult<Vec<String>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if matches!(self.mode, MockMode::ShortResponse) {
            return Ok(Vec::new());
        }

        texts
            .iter()
            .map(|text| self.apply_translation(text, target_locale, call))
            .collect()
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}
