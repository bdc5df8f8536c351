use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::BatchTranslator;
use crate::errors::ProviderError;

/// Client for a LibreTranslate-compatible `/translate` endpoint.
///
/// The API accepts an array for `q` and answers with an array in the same
/// order, so this client satisfies the index-preserving batch contract
/// directly. Large batches are split into sequential chunks whose results are
/// concatenated in submission order.
#[derive(Debug)]
pub struct LibreTranslate {
    /// HTTP client for making requests
    client: Client,
    /// Full URL of the translate endpoint
    translate_url: Url,
    /// Optional API key
    api_key: Option<String>,
    /// Maximum texts per request
    max_batch_size: usize,
}

/// Translate request body
#[derive(Debug, Serialize)]
pub struct TranslateRequest<'a> {
    q: &'a [String],
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

/// Translate response body for batch input
#[derive(Debug, Deserialize)]
pub struct TranslateResponse {
    #[serde(rename = "translatedText")]
    pub translated_text: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl LibreTranslate {
    /// Create a client for `endpoint` (the server root, e.g. `http://localhost:5000`)
    pub fn new(endpoint: &str, api_key: Option<String>, timeout_secs: u64, max_batch_size: usize) -> Result<Self, ProviderError> {
        let base = Url::parse(endpoint)
            .map_err(|e| ProviderError::ConnectionError(format!("Invalid endpoint '{}': {}", endpoint, e)))?;
        let translate_url = base
            .join("translate")
            .map_err(|e| ProviderError::ConnectionError(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        Ok(LibreTranslate {
            client,
            translate_url,
            api_key: api_key.filter(|key| !key.is_empty()),
            max_batch_size: max_batch_size.max(1),
        })
    }

    pub fn translate_url(&self) -> &Url {
        &self.translate_url
    }

    async fn translate_chunk(&self, source: &str, target: &str, chunk: &[String]) -> Result<Vec<String>, ProviderError> {
        let request = TranslateRequest {
            q: chunk,
            source,
            target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(self.translate_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ProviderError::ConnectionError(e.to_string())
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|err| err.error)
                .unwrap_or(body);
            error!("Translation API error ({}): {}", status, message);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        parse_translate_response(&body, chunk.len())
    }
}

/// Parse a batch response, requiring exactly `expected` translations.
///
/// Chunks are concatenated, so a short chunk followed by a long one could
/// add up to the right total while shifting every later text; each chunk is
/// therefore checked on its own.
pub fn parse_translate_response(body: &str, expected: usize) -> Result<Vec<String>, ProviderError> {
    let response: TranslateResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::ParseError(format!("Invalid translate response: {}", e)))?;

    if response.translated_text.len() != expected {
        return Err(ProviderError::ParseError(format!(
            "Translate response has {} text(s) for {} submitted",
            response.translated_text.len(),
            expected
        )));
    }

    Ok(response.translated_text)
}

#[async_trait]
impl BatchTranslator for LibreTranslate {
    async fn translate_batch(
        &self,
        source_language: &str,
        target_language: &str,
        texts: &[String],
    ) -> Result<Vec<String>, ProviderError> {
        let mut translated = Vec::with_capacity(texts.len());

        for (i, chunk) in texts.chunks(self.max_batch_size).enumerate() {
            debug!("Translating chunk {} ({} texts) {} -> {}", i + 1, chunk.len(), source_language, target_language);
            translated.extend(self.translate_chunk(source_language, target_language, chunk).await?);
        }

        Ok(translated)
    }
}
