//! Machine translation trait and locale helpers
//!
//! The batch driver only ever talks to a `MachineTranslator`, so the backend
//! (LibreTranslate, Google Translate, the offline mock) is chosen at startup
//! without the engine knowing which one it got.
//!
//! # Example
//!
//! ```ignore
//! use locale_mt::mt::{LibreTranslateProvider, MachineTranslator};
//!
//! let provider = LibreTranslateProvider::new("http://localhost:5000", None, timeout)?;
//! let texts = vec!["Hello".to_string(), "Goodbye".to_string()];
//! let results = provider.translate_batch(&texts, "en", "fr").await?;
//! assert_eq!(results.len(), 2);
//! ```

use crate::error::{MtError, MtResult};
use async_trait::async_trait;

/// Generic trait for machine translation backends
///
/// All methods are async to support network-bound providers.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text string from source to target locale
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        let mut results = self
            .translate_batch(&[text.to_string()], source_locale, target_locale)
            .await?;
        match results.len() {
            1 => Ok(results.remove(0)),
            actual => Err(MtError::ResponseMismatch {
                expected: 1,
                actual,
            }),
        }
    }

    /// Translate multiple strings in one ordered request
    ///
    /// # Guarantees expected from implementations
    ///
    /// - Output order matches input order
    /// - Output length equals input length, or the call fails
    ///
    /// The batch driver does not trust the second guarantee and checks the
    /// length itself.
    async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<Vec<String>>;

    /// Name of this provider, for logs
    fn provider_name(&self) -> &str;
}

/// Locale code as sent to a remote API
///
/// Region and script subtags are kept (`zh-TW`, `pt-BR`, `zh-Hant` all name
/// different outputs); only the POSIX underscore becomes a hyphen.
pub fn api_locale(locale: &str) -> String {
    locale.replace('_', "-")
}

/// Validate that a locale code only contains ASCII letters, digits, `-` and `_`
///
/// Locale codes also name the target files (`<outdir>/<locale>.json`), so this
/// keeps path separators and dots out of them.
pub fn validate_locale(locale: &str) -> MtResult<()> {
    if locale.is_empty() {
        return Err(MtError::InvalidLocale("Locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MtError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}
