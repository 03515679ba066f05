//! Anthropic streaming implementation of the summary provider.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use serde_json::Value;

use crate::github::error::ActivityError;

use super::prompt::ActivityPrompt;
use super::provider::{SummaryProvider, SummaryStream};
use super::transport::{data_payload_stream, ensure_success, http_client};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const API_VERSION: &str = "2023-06-01";

/// Configuration for [`AnthropicSummaryProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnthropicConfig {
    /// Base API URL.
    pub base_url: String,
    /// Model identifier sent in the request body.
    pub model: String,
    /// API key sent in the `x-api-key` header.
    pub api_key: Option<String>,
    /// HTTP timeout.
    pub timeout: Duration,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AnthropicConfig {
    /// Default configuration carrying the given API key.
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }
}

/// Anthropic-backed summary provider.
#[derive(Debug, Clone, Default)]
pub struct AnthropicSummaryProvider {
    config: AnthropicConfig,
}

impl AnthropicSummaryProvider {
    /// Creates a provider from explicit configuration.
    #[must_use]
    pub const fn new(config: AnthropicConfig) -> Self {
        Self { config }
    }

    fn require_api_key(&self) -> Result<&str, ActivityError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ActivityError::Configuration {
                message: "Anthropic API key is required (set ANTHROPIC_API_KEY)".to_owned(),
            })
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    temperature: f32,
    stream: bool,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[async_trait]
impl SummaryProvider for AnthropicSummaryProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn stream_summary(
        &self,
        prompt: &ActivityPrompt,
    ) -> Result<SummaryStream, ActivityError> {
        let api_key = self.require_api_key()?;
        let endpoint = format!(
            "{base}/v1/messages",
            base = self.config.base_url.trim_end_matches('/')
        );
        // The assistant turn pre-fills the opening tag so the model continues
        // straight into the breakdown, as the summary format expects.
        let payload = MessagesRequest {
            model: self.config.model.as_str(),
            max_tokens: 4000,
            system: prompt.system(),
            temperature: 0.8,
            stream: true,
            messages: vec![
                RequestMessage {
                    role: "user",
                    content: prompt.user(),
                },
                RequestMessage {
                    role: "assistant",
                    content: "<contribution_breakdown>",
                },
            ],
        };

        let client = http_client(self.config.timeout)?;
        let response = client
            .post(endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&payload)
            .send()
            .await
            .map_err(|error| ActivityError::Network {
                message: format!("Anthropic request transport failed: {error}"),
            })?;
        let checked = ensure_success("Anthropic", response).await?;

        Ok(data_payload_stream("anthropic", checked)
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
    let value = serde_json::from_str::<Value>(payload).ok()?;
    if value.get("type").and_then(Value::as_str) != Some("content_block_delta") {
        return None;
    }
    value
        .pointer("/delta/text")?
        .as_str()
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::github::error::ActivityError;
    use crate::summarize::prompt::ActivityPrompt;
    use crate::summarize::provider::SummaryProvider;

    use super::{AnthropicConfig, AnthropicSummaryProvider};

    fn provider_for(server: &MockServer) -> AnthropicSummaryProvider {
        AnthropicSummaryProvider::new(AnthropicConfig {
            base_url: server.uri(),
            api_key: Some("anthropic-key".to_owned()),
            ..AnthropicConfig::default()
        })
    }

    #[tokio::test]
    async fn streams_only_content_block_deltas() {
        let server = MockServer::start().await;
        let body = concat!(
            "event: message_start\n",
            "data: {\"type\":\"message_start\"}\n\n",
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"Summary \"}}\n\n",
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"text\"}}\n\n",
            "event: message_stop\n",
            "data: {\"type\":\"message_stop\"}\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "anthropic-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let stream = provider_for(&server)
            .stream_summary(&ActivityPrompt::new(&[], &[], "octocat"))
            .await
            .expect("stream should open");

        let text: String = stream
            .filter_map(|item| async move { item.ok() })
            .collect::<Vec<String>>()
            .await
            .concat();
        assert_eq!(text, "Summary text");
    }

    #[tokio::test]
    async fn non_success_status_fails_before_streaming() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let error = provider_for(&server)
            .stream_summary(&ActivityPrompt::new(&[], &[], "octocat"))
            .await
            .err()
            .expect("request should fail");

        assert!(
            matches!(error, ActivityError::Api { status: Some(529), .. }),
            "expected Api error, got {error:?}"
        );
    }
}
