//! HTTP plumbing shared by the remote providers

use crate::error::{MtError, MtResult};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Longest slice of an error body kept in the error message
const MAX_ERROR_BODY: usize = 512;

/// Client whose every request is bounded by `timeout`
pub(crate) fn client(timeout: Duration) -> MtResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| MtError::Network(format!("Failed to create HTTP client: {}", e)))
}

/// POST `body` as JSON and decode the JSON answer
///
/// A non-2xx status becomes `MtError::Translation` carrying the status and
/// the start of the response body.
pub(crate) async fn post_json(
    request: reqwest::RequestBuilder,
    body: &Value,
    provider: &str,
) -> MtResult<Value> {
    let response = request.json(body).send().await?;
    let status = response.status();
    debug!(provider, %status, "response received");

    if !status.is_success() {
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(MtError::Translation(format!(
            "{} returned {}: {}",
            provider,
            status,
            truncate(&text, MAX_ERROR_BODY)
        )));
    }

    response
        .json()
        .await
        .map_err(|e| MtError::Translation(format!("Failed to parse {} response: {}", provider, e)))
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
