/// Machine translation
///
/// Everything between a planned unit and the value committed for it:
///
/// 1. **Placeholder masking** - Interpolation tokens are swapped for opaque
///    `__PH<n>__` markers before a text leaves the process, and put back after
/// 2. **MT Trait & Providers** - Generic async trait with LibreTranslate,
///    Google Translate and mock implementations
/// 3. **Batch driver** - Sends masked units in ordered batches and falls
///    back to the source text when a batch or a single answer is unusable
///
/// # Example
///
/// ```ignore
/// use locale_mt::mt::{BatchDriver, MockMode, MockTranslator, PlaceholderSet};
/// use locale_mt::plan::plan_units;
///
/// let reference = serde_json::json!({"greeting": "Hello {{name}}"});
/// let mut target = serde_json::json!({});
/// let units = plan_units(&reference, None);
///
/// let translator = MockTranslator::new(MockMode::Suffix);
/// let placeholders = PlaceholderSet::default();
/// let summary = BatchDriver::new(&translator, &placeholders, "en")
///     .run(&mut target, &units, "fr")
///     .await?;
/// ```
pub mod driver;
pub mod google_translate;
mod http;
pub mod libretranslate;
pub mod mask;
pub mod mock;
pub mod translator;

pub use driver::{BatchDriver, RunSummary};
pub use google_translate::GoogleTranslateProvider;
pub use libretranslate::LibreTranslateProvider;
pub use mask::{PlaceholderFamily, PlaceholderMapping, PlaceholderSet, unmask};
pub use mock::{MockMode, MockTranslator};
pub use translator::{MachineTranslator, api_locale, validate_locale};
