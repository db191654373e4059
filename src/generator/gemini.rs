//! Google Gemini `generateContent` client.
//!
//! Sends one non-streaming request per call. The API key travels in the
//! `x-goog-api-key` header so it never shows up in URLs or error messages.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Serialize;

use super::{GenerationRequest, GenerationResponse, SafetySetting, TextGenerator};
use crate::config::Config;
use crate::error::{ReadmeError, Result};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for the Gemini text generation API
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Creates a client for `model` at `base_url`
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ReadmeError::Config("Gemini API key is empty".into()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReadmeError::Llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Builds a client from the application config.
    ///
    /// Fails with [`ReadmeError::Config`] when no API key is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.gemini_api_key()?,
            config.gemini.model.clone(),
            config.gemini.base_url.clone(),
            config.generation_timeout(),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    safety_settings: &'a [SafetySetting],
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart {
                    text: &request.prompt,
                }],
            }],
            safety_settings: &request.safety_settings,
        };

        debug!("Sending request to Gemini model {}", self.model);
        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ReadmeError::Llm(format!("Failed to send request to Gemini API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ReadmeError::Llm(format!(
                "Gemini API request failed with status {}: {}",
                status, error_body
            )));
        }

        let parsed: GenerationResponse = response
            .json()
            .await
            .map_err(|e| ReadmeError::Llm(format!("Failed to parse Gemini API response: {}", e)))?;
        debug!(
            "Gemini returned {} candidate(s)",
            parsed.candidates.len()
        );
        Ok(parsed)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
