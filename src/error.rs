//! Error types for the translation engine
use std::path::PathBuf;
use std::time::Duration;

/// Errors raised while planning, translating, patching or persisting locale trees
#[derive(Debug, thiserror::Error)]
pub enum MtError {
    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),
    /// Locale code with characters outside `[A-Za-z0-9_-]`
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),
    /// Transport failure talking to a translation backend
    #[error("Network error: {0}")]
    Network(String),
    /// Backend answered, but not with usable translations
    #[error("Translation error: {0}")]
    Translation(String),
    /// Backend call did not finish within the configured bound
    #[error("Translation call timed out after {0:?}")]
    Timeout(Duration),
    /// Backend returned a different number of texts than it was sent
    #[error("Backend returned {actual} texts for {expected} inputs")]
    ResponseMismatch { expected: usize, actual: usize },
    /// Target tree cannot be patched at a path without destroying content
    #[error("Structural error at '{path}': {reason}")]
    Structural { path: String, reason: String },
    /// Reference catalog missing or unparsable; nothing can be translated
    #[error("Reference catalog error: {0}")]
    Reference(String),
    /// Filesystem failure on a specific file
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Placeholder pattern that does not compile
    #[error("Invalid placeholder pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl MtError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MtError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs can carry credentials
        let err = err.without_url();
        if err.is_timeout() {
            MtError::Network(format!("request timed out: {}", err))
        } else {
            MtError::Network(err.to_string())
        }
    }
}

/// Result type for engine operations
pub type MtResult<T> = Result<T, MtError>;
