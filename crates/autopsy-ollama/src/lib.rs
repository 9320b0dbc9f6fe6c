//! Ollama text completion provider
//!
//! Implements [`TextCompletionProvider`] over a local Ollama server's
//! non-streaming `/api/generate` endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use autopsy_core::{LlmConfig, TextCompletionProvider};
//! use autopsy_ollama::OllamaProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = OllamaProvider::new(&LlmConfig::default())?;
//! let text = provider.complete("Classify this failure ...").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

use async_trait::async_trait;
use autopsy_core::{LlmConfig, ProviderError, TextCompletionProvider};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request body for `/api/generate`
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    /// Model name
    pub model: &'a str,
    /// Full prompt
    pub prompt: &'a str,
    /// Always false: one JSON body per request
    pub stream: bool,
}

/// Response body from `/api/generate`
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    /// Generated text
    pub response: String,
    /// Whether generation completed
    #[serde(default)]
    pub done: bool,
}

/// Ollama HTTP client
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    timeout_secs: u64,
}

impl OllamaProvider {
    /// Build a provider from config
    ///
    /// # Errors
    /// `ProviderError::Unavailable` if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Unavailable(format!("http client: {e}")))?;

        Ok(Self {
            http,
            endpoint: format!("{}/api/generate", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// Model requested from the server
    #[inline]
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full generate endpoint URL
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_transport_error(&self, error: &reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            ProviderError::Unavailable(error.to_string())
        }
    }
}

#[async_trait]
impl TextCompletionProvider for OllamaProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "sending generate request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        if !body.done {
            tracing::warn!(model = %self.model, "generation reported as incomplete");
        }
        Ok(body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_trims_trailing_slash() {
        let config = LlmConfig {
            base_url: "http://localhost:11434/".into(),
            ..LlmConfig::default()
        };
        let provider = OllamaProvider::new(&config).unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:11434/api/generate");
        assert_eq!(provider.model(), "llama3");
    }

    #[test]
    fn request_serializes_non_streaming() {
        let request = GenerateRequest {
            model: "llama3",
            prompt: "hi",
            stream: false,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, serde_json::json!({"model": "llama3", "prompt": "hi", "stream": false}));
    }
}
