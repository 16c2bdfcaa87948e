//! LibreTranslate-compatible provider
//!
//! Talks to any server exposing the LibreTranslate `POST /translate` endpoint
//! (self-hosted LibreTranslate, Argos-based proxies). A whole batch goes out
//! as one request with `q` set to the list of texts.
//!
//! # Example
//!
//! ```ignore
//! let timeout = Duration::from_secs(30);
//! let provider = LibreTranslateProvider::new("http://localhost:5000", None, timeout)?;
//! let results = provider.translate_batch(&texts, "en", "fr").await?;
//! ```

use crate::error::{MtError, MtResult};
use crate::mt::http;
use crate::mt::translator::{MachineTranslator, api_locale, validate_locale};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;

/// LibreTranslate HTTP provider
#[derive(Clone)]
pub struct LibreTranslateProvider {
    /// Server base URL, without the `/translate` suffix
    base_url: String,
    /// Optional API key, sent in the request body
    api_key: Option<String>,
    client: reqwest::Client,
}

impl LibreTranslateProvider {
    /// Create a provider for the server at `base_url`
    ///
    /// `timeout` bounds every request; a timed-out request surfaces as a
    /// `MtError::Network` and the batch driver falls back for that batch.
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> MtResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(MtError::Config(
                "LibreTranslate URL cannot be empty".to_string(),
            ));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(MtError::Config(format!(
                "LibreTranslate URL must start with http:// or https://: {}",
                base_url
            )));
        }

        Ok(Self {
            base_url,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            client: http::client(timeout)?,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/translate", self.base_url)
    }

    fn request_body(&self, texts: &[String], source_locale: &str, target_locale: &str) -> Value {
        let mut body = json!({
            "q": texts,
            "source": api_locale(source_locale),
            "target": api_locale(target_locale),
            "format": "text"
        });
        if let (Some(key), Some(map)) = (&self.api_key, body.as_object_mut()) {
            map.insert("api_key".to_string(), Value::String(key.clone()));
        }
        body
    }
}

/// Pull the translated texts out of a LibreTranslate response
///
/// Servers differ in how they answer a list request, so all of these are accepted:
/// `{"translatedText": ["..", ".."]}`, `{"translatedText": ".."}`,
/// `[{"translatedText": ".."}, ..]` and a bare `".."`.
pub fn parse_translate_response(body: &Value) -> MtResult<Vec<String>> {
    fn text_of(item: &Value) -> MtResult<String> {
        match item {
            Value::String(text) => Ok(text.clone()),
            Value::Object(map) => map
                .get("translatedText")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    MtError::Translation(
                        "Invalid response: missing 'translatedText' field".to_string(),
                    )
                }),
            other => Err(MtError::Translation(format!(
                "Invalid response item: {}",
                other
            ))),
        }
    }

    match body {
        Value::Object(map) => match map.get("translatedText") {
            Some(Value::Array(items)) => items.iter().map(text_of).collect(),
            Some(Value::String(text)) => Ok(vec![text.clone()]),
            _ => match map.get("error").and_then(Value::as_str) {
                Some(error) => Err(MtError::Translation(format!("Server error: {}", error))),
                None => Err(MtError::Translation(
                    "Invalid response: missing 'translatedText'".to_string(),
                )),
            },
        },
        Value::Array(items) => items.iter().map(text_of).collect(),
        Value::String(text) => Ok(vec![text.clone()]),
        other => Err(MtError::Translation(format!(
            "Invalid response: unexpected {}",
            other
        ))),
    }
}

impl std::fmt::Debug for LibreTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibreTranslateProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for LibreTranslateProvider {
    async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<Vec<String>> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = self.request_body(texts, source_locale, target_locale);
        let request = self.client.post(self.endpoint());
        let answer = http::post_json(request, &body, self.provider_name()).await?;
        parse_translate_response(&answer)
    }

    fn provider_name(&self) -> &str {
        "LibreTranslate"
    }
}
