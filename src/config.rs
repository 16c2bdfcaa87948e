//! Run settings: TOML file first, command-line flags and environment on top
//!
//! Every field has a default, so an empty (or absent) file is a valid
//! configuration for the offline backends.

use crate::error::{MtError, MtResult};
use crate::mt::google_translate::{self, GoogleTranslateProvider};
use crate::mt::libretranslate::LibreTranslateProvider;
use crate::mt::mask::{PlaceholderFamily, PlaceholderSet};
use crate::mt::mock::{MockMode, MockTranslator};
use crate::mt::translator::{MachineTranslator, validate_locale};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Which translation backend to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// LibreTranslate-compatible HTTP server
    #[default]
    Libre,
    Google,
    /// Offline suffix translator, for trying the tool out
    Mock,
    /// Fill gaps with the source text
    None,
}

impl std::str::FromStr for BackendKind {
    type Err = MtError;

    fn from_str(name: &str) -> MtResult<Self> {
        match name {
            "libre" => Ok(BackendKind::Libre),
            "google" => Ok(BackendKind::Google),
            "mock" => Ok(BackendKind::Mock),
            "none" => Ok(BackendKind::None),
            other => Err(MtError::Config(format!(
                "Unknown backend '{}' (expected libre, google, mock or none)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Server URL for `libre`
    pub url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaceholderConfig {
    /// Enabled built-in families, by name
    pub families: Vec<String>,
    /// Extra regular expressions, matched before the built-in families
    pub extra: Vec<String>,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            families: PlaceholderFamily::ALL
                .iter()
                .map(|family| family.name().to_string())
                .collect(),
            extra: Vec::new(),
        }
    }
}

/// Settings for a `fill` run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub source_locale: String,
    pub batch_size: usize,
    /// Pause between batches, in milliseconds
    pub pace_ms: u64,
    /// Bound on one backend call, in seconds
    pub timeout_secs: u64,
    /// Keep `<locale>.json.bak` when rewriting an existing file
    pub backup: bool,
    pub backend: BackendConfig,
    pub placeholders: PlaceholderConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_locale: "en".to_string(),
            batch_size: 50,
            pace_ms: 200,
            timeout_secs: 30,
            backup: true,
            backend: BackendConfig::default(),
            placeholders: PlaceholderConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_toml(text: &str) -> MtResult<Self> {
        toml::from_str(text).map_err(|e| MtError::Config(format!("Invalid settings: {}", e)))
    }

    pub fn from_file(path: &Path) -> MtResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| MtError::io(path, e))?;
        Self::from_toml(&text).map_err(|e| match e {
            MtError::Config(msg) => MtError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    pub fn pace(&self) -> Duration {
        Duration::from_millis(self.pace_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the settings before any file is touched
    pub fn validate(&self) -> MtResult<()> {
        validate_locale(&self.source_locale)?;
        if self.batch_size == 0 {
            return Err(MtError::Config("batch_size must be at least 1".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(MtError::Config("timeout_secs must be at least 1".to_string()));
        }
        match self.backend.kind {
            BackendKind::Libre
                if self
                    .backend
                    .url
                    .as_deref()
                    .is_none_or(|url| url.trim().is_empty()) =>
            {
                Err(MtError::Config(
                    "the libre backend needs a server URL (--engine or backend.url)".to_string(),
                ))
            }
            BackendKind::Google
                if self
                    .backend
                    .api_key
                    .as_deref()
                    .is_none_or(|key| key.trim().is_empty()) =>
            {
                Err(MtError::Config(format!(
                    "the google backend needs an API key (--api-key or {})",
                    google_translate::API_KEY_ENV
                )))
            }
            _ => Ok(()),
        }
    }

    /// Compile the configured placeholder families and extra patterns
    pub fn placeholder_set(&self) -> MtResult<PlaceholderSet> {
        let families = self
            .placeholders
            .families
            .iter()
            .map(|name| name.parse::<PlaceholderFamily>())
            .collect::<MtResult<Vec<_>>>()?;
        PlaceholderSet::new(&families, &self.placeholders.extra)
    }

    /// Build the configured translation backend
    pub fn translator(&self) -> MtResult<Box<dyn MachineTranslator>> {
        let api_key = self.backend.api_key.clone();
        Ok(match self.backend.kind {
            BackendKind::Libre => {
                let url = self.backend.url.as_deref().unwrap_or_default();
                Box::new(LibreTranslateProvider::new(url, api_key, self.timeout())?)
            }
            BackendKind::Google => Box::new(GoogleTranslateProvider::new(
                api_key.unwrap_or_default(),
                self.timeout(),
            )?),
            BackendKind::Mock => Box::new(MockTranslator::new(MockMode::Suffix)),
            BackendKind::None => Box::new(MockTranslator::new(MockMode::NoOp)),
        })
    }
}
