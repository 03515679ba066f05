//! Grok (OpenAI-compatible) streaming implementation of the summary provider.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use serde_json::Value;

use crate::github::error::ActivityError;

use super::prompt::ActivityPrompt;
use super::provider::{SummaryProvider, SummaryStream};
use super::transport::{data_payload_stream, ensure_success, http_client};

const DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";
const DEFAULT_MODEL: &str = "grok-2-latest";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Terminal payload of an OpenAI-compatible stream.
const DONE_MARKER: &str = "[DONE]";

/// Configuration for [`GrokSummaryProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrokConfig {
    /// Base API URL.
    pub base_url: String,
    /// Model identifier sent in chat-completions requests.
    pub model: String,
    /// API key used for bearer authentication.
    pub api_key: Option<String>,
    /// HTTP timeout.
    pub timeout: Duration,
}

impl Default for GrokConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GrokConfig {
    /// Default configuration carrying the given API key.
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }
}

/// Grok-backed summary provider.
#[derive(Debug, Clone, Default)]
pub struct GrokSummaryProvider {
    config: GrokConfig,
}

impl GrokSummaryProvider {
    /// Creates a provider from explicit configuration.
    #[must_use]
    pub const fn new(config: GrokConfig) -> Self {
        Self { config }
    }

    fn require_api_key(&self) -> Result<&str, ActivityError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ActivityError::Configuration {
                message: "Grok API key is required (set GROK_API_KEY)".to_owned(),
            })
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: Vec<ChatCompletionsMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionsMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[async_trait]
impl SummaryProvider for GrokSummaryProvider {
    fn name(&self) -> &'static str {
        "grok"
    }

    async fn stream_summary(
        &self,
        prompt: &ActivityPrompt,
    ) -> Result<SummaryStream, ActivityError> {
        let api_key = self.require_api_key()?;
        let endpoint = format!(
            "{base}/chat/completions",
            base = self.config.base_url.trim_end_matches('/')
        );
        let payload = ChatCompletionsRequest {
            model: self.config.model.as_str(),
            stream: true,
            messages: vec![
                ChatCompletionsMessage {
                    role: "system",
                    content: prompt.system(),
                },
                ChatCompletionsMessage {
                    role: "user",
                    content: prompt.user(),
                },
            ],
        };

        let client = http_client(self.config.timeout)?;
        let response = client
            .post(endpoint)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| ActivityError::Network {
                message: format!("Grok request transport failed: {error}"),
            })?;
        let checked = ensure_success("Grok", response).await?;

        Ok(data_payload_stream("grok", checked)
            .take_while(|item| {
                futures::future::ready(!matches!(item, Ok(payload) if payload == DONE_MARKER))
            })
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
        .pointer("/choices/0/delta/content")?
        .as_str()
        .map(ToOwned::to_owned)
}
