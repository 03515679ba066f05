//! Gemini streaming implementation of the summary provider.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use serde_json::Value;

use crate::github::error::ActivityError;

use super::prompt::ActivityPrompt;
use super::provider::{SummaryProvider, SummaryStream};
use super::transport::{data_payload_stream, ensure_success, http_client};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`GeminiSummaryProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    /// Base API URL.
    pub base_url: String,
    /// Model identifier in the request path.
    pub model: String,
    /// API key passed as a query parameter.
    pub api_key: Option<String>,
    /// HTTP timeout.
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GeminiConfig {
    /// Default configuration carrying the given API key.
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }
}

/// Gemini-backed summary provider.
#[derive(Debug, Clone, Default)]
pub struct GeminiSummaryProvider {
    config: GeminiConfig,
}

impl GeminiSummaryProvider {
    /// Creates a provider from explicit configuration.
    #[must_use]
    pub const fn new(config: GeminiConfig) -> Self {
        Self { config }
    }

    fn require_api_key(&self) -> Result<&str, ActivityError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ActivityError::Configuration {
                message: "Gemini API key is required (set GEMINI_API_KEY)".to_owned(),
            })
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    role: &'static str,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[async_trait]
impl SummaryProvider for GeminiSummaryProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn stream_summary(
        &self,
        prompt: &ActivityPrompt,
    ) -> Result<SummaryStream, ActivityError> {
        let api_key = self.require_api_key()?;
        let endpoint = format!(
            "{base}/v1beta/models/{model}:streamGenerateContent",
            base = self.config.base_url.trim_end_matches('/'),
            model = self.config.model
        );
        let payload = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart {
                    text: prompt.combined(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.8,
                max_output_tokens: 4000,
            },
        };

        let client = http_client(self.config.timeout)?;
        let response = client
            .post(endpoint)
            .query(&[("alt", "sse"), ("key", api_key)])
            .json(&payload)
            .send()
            .await
            .map_err(|error| ActivityError::Network {
                message: format!("Gemini request transport failed: {error}"),
            })?;
        let checked = ensure_success("Gemini", response).await?;

        Ok(data_payload_stream("gemini", checked)
            .filter_map(|item| {
                futures::future::ready(match item {
                    Ok(payload) => extract_text(&payload).map(Ok),
                    Err(error) => Some(Err(error)),
                })
            })
            .boxed())
    }
}

fn extract_text(payload: &str) -> Option<String> {
    serde_json::from_str::<Value>(payload)
        .ok()?
        .pointer("/candidates/0/content/parts/0/text")?
        .as_str()
        .map(ToOwned::to_owned)
}
