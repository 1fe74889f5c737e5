use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::errors::ProviderError;
use crate::language_utils::normalize_to_part1_or_part2t;
use super::TranslationClient;

/// Default endpoint of the free DeepL API tier
pub const DEFAULT_ENDPOINT: &str = "https://api-free.deepl.com/v2/translate";

/// DeepL client for interacting with the DeepL translate API
#[derive(Debug)]
pub struct DeepL {
    /// HTTP client for API requests
    client: Client,
    /// Authentication key
    api_key: String,
    /// Full URL of the translate endpoint
    endpoint: String,
}

/// DeepL translate response
#[derive(Debug, Deserialize)]
pub struct DeepLResponse {
    /// One entry per submitted text
    #[serde(default)]
    pub translations: Vec<DeepLTranslation>,
}

/// Individual translation in a DeepL response
#[derive(Debug, Deserialize)]
pub struct DeepLTranslation {
    /// Source language detected by the provider
    #[serde(default)]
    pub detected_source_language: Option<String>,

    /// The translated text
    pub text: String,
}

impl DeepL {
    /// Create a new DeepL client
    ///
    /// Fails if the HTTP client cannot be built with the requested timeout.
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let endpoint = endpoint.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: if endpoint.is_empty() { DEFAULT_ENDPOINT.to_string() } else { endpoint },
        })
    }

    /// Endpoint the client posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Convert a language code into DeepL's upper-case target code
    pub fn target_code(target_language: &str) -> String {
        normalize_to_part1_or_part2t(target_language)
            .unwrap_or_else(|_| target_language.trim().to_string())
            .to_uppercase()
    }

    /// Extract the translated text from a raw response body
    pub fn parse_response(body: &str) -> Result<String, ProviderError> {
        let response: DeepLResponse = serde_json::from_str(body)
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let translation = response.translations.into_iter().next();
        if let Some(source) = translation.as_ref().and_then(|t| t.detected_source_language.as_deref()) {
            debug!("DeepL detected source language {}", source);
        }

        translation
            .map(|t| t.text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ProviderError::ParseError("response contains no translation".to_string()))
    }

    /// Map a non-success status to a provider error
    fn status_error(status: StatusCode, body: String) -> ProviderError {
        match status.as_u16() {
            401 | 403 => ProviderError::AuthenticationError(body),
            // DeepL answers 456 when the character quota is exhausted
            429 | 456 => ProviderError::RateLimitExceeded(format!("{}: {}", status, body)),
            code => ProviderError::ApiError { status_code: code, message: body },
        }
    }
}

#[async_trait]
impl TranslationClient for DeepL {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        let target = Self::target_code(target_language);
        let params = [("text", text), ("target_lang", target.as_str())];

        let response = self.client.post(&self.endpoint)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .form(&params)
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
        let body = response.text().await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            error!("DeepL API error ({}): {}", status, body);
            return Err(Self::status_error(status, body));
        }

        Self::parse_response(&body)
    }
}
