//! Google Translate API v2 provider
//!
//! # Authentication
//!
//! Needs an API key, passed explicitly or read from `GOOGLE_TRANSLATE_API_KEY`.
//! Obtain one from: https://console.cloud.google.com/

use crate::error::{MtError, MtResult};
use crate::mt::http;
use crate::mt::translator::{MachineTranslator, api_locale, validate_locale};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

/// Environment variable holding the Google Translate API key
pub const API_KEY_ENV: &str = "GOOGLE_TRANSLATE_API_KEY";

const ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

/// The v2 API takes at most 128 `q` entries per request
const MAX_TEXTS_PER_REQUEST: usize = 128;

/// Per-text limit of the v2 API
const MAX_CHARS_PER_TEXT: usize = 30_000;

#[derive(Clone)]
pub struct GoogleTranslateProvider {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl GoogleTranslateProvider {
    pub fn new(api_key: String, timeout: Duration) -> MtResult<Self> {
        if api_key.trim().is_empty() {
            return Err(MtError::Config("API key cannot be empty".to_string()));
        }
        Ok(Self {
            api_key,
            endpoint: ENDPOINT.to_string(),
            client: http::client(timeout)?,
        })
    }

    pub fn from_env(timeout: Duration) -> MtResult<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            MtError::Config(format!("{} environment variable not set", API_KEY_ENV))
        })?;
        Self::new(api_key, timeout)
    }

    /// One v2 request for at most `MAX_TEXTS_PER_REQUEST` texts
    async fn request(&self, texts: &[String], source: &str, target: &str) -> MtResult<Vec<String>> {
        let body = json!({
            "q": texts,
            "source": source,
            "target": target,
            "format": "text"
        });
        let request = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key);
        let answer = http::post_json(request, &body, self.provider_name()).await?;
        parse_v2_response(&answer)
    }
}

/// Extract `data.translations[].translatedText` from a v2 response
fn parse_v2_response(answer: &Value) -> MtResult<Vec<String>> {
    let Some(translations) = answer.pointer("/data/translations").and_then(Value::as_array) else {
        return Err(MtError::Translation(
            "Invalid API response: missing 'data.translations' array".to_string(),
        ));
    };

    translations
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.get("translatedText")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    MtError::Translation(format!(
                        "Invalid API response: translation {} has no 'translatedText'",
                        i
                    ))
                })
        })
        .collect()
}

impl std::fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("api_key", &"***")
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for GoogleTranslateProvider {
    async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<Vec<String>> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        if let Some(i) = texts.iter().position(|t| t.chars().count() > MAX_CHARS_PER_TEXT) {
            return Err(MtError::Translation(format!(
                "Text at index {} exceeds maximum length of {} characters",
                i, MAX_CHARS_PER_TEXT
            )));
        }

        let source = api_locale(source_locale);
        let target = api_locale(target_locale);
        let mut results = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(MAX_TEXTS_PER_REQUEST) {
            debug!(size = chunk.len(), %source, %target, "google request");
            let answers = self.request(chunk, &source, &target).await?;
            if answers.len() != chunk.len() {
                return Err(MtError::ResponseMismatch {
                    expected: chunk.len(),
                    actual: answers.len(),
                });
            }
            results.extend(answers);
        }
        Ok(results)
    }

    fn provider_name(&self) -> &str {
        "Google Translate"
    }
}
