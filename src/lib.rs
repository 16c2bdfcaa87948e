//! Incremental machine translation of nested JSON locale catalogs
//!
//! A reference catalog (usually `en.json`) is walked leaf by leaf. Every string
//! the target catalog lacks, or holds only blank, is sent to a translation
//! backend with its placeholders masked, and the answer is patched into the
//! target at the same path. Existing translations are never touched.
//!
//! # Workflow Example
//!
//! ```ignore
//! use locale_mt::{BatchDriver, MockMode, MockTranslator, PlaceholderSet, plan_units, store};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Load both sides
//!     let reference = store::load_reference("locales/en.json".as_ref())?;
//!     let mut loaded = store::load_target("locales/fr.json".as_ref())?;
//!
//!     // 2. Plan what is missing
//!     let units = plan_units(&reference, loaded.existing());
//!
//!     // 3. Translate and patch
//!     let translator = MockTranslator::new(MockMode::Suffix);
//!     let placeholders = PlaceholderSet::default();
//!     BatchDriver::new(&translator, &placeholders, "en")
//!         .run(&mut loaded.tree, &units, "fr")
//!         .await?;
//!
//!     // 4. Persist
//!     store::save_tree("locales/fr.json".as_ref(), &loaded.tree, true)?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod fill;
pub mod logging;
pub mod mt;
pub mod patch;
pub mod plan;
pub mod report;
pub mod store;
pub mod tree;

// Integration tests (only available during testing)
#[cfg(test)]
mod integration_tests;

// Re-export main types for convenient access
pub use config::{BackendKind, Settings};
pub use error::{MtError, MtResult};
pub use fill::{Filler, LocaleOutcome, LocaleReport};
pub use mt::{
    BatchDriver, GoogleTranslateProvider, LibreTranslateProvider, MachineTranslator, MockMode,
    MockTranslator, PlaceholderFamily, PlaceholderSet, RunSummary,
};
pub use plan::{TranslationUnit, plan, plan_units};
pub use report::{CoverageReport, coverage};
pub use tree::{NodeKind, Segment, Tree, TreePath};
