//! HTTP and server-sent-event plumbing shared by the summary providers.

use std::collections::VecDeque;
use std::time::Duration;

use futures::StreamExt;
use futures::stream::BoxStream;

use crate::github::error::ActivityError;

/// Builds a reqwest client with the provider's timeout.
pub(super) fn http_client(timeout: Duration) -> Result<reqwest::Client, ActivityError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|error| ActivityError::Configuration {
            message: format!("failed to configure summary HTTP client: {error}"),
        })
}

/// Passes a successful response through; otherwise reads the body, truncates
/// it into the error message, and fails with the transport status.
pub(super) async fn ensure_success(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ActivityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.map_or_else(
        |_| "(failed to read error response body)".to_owned(),
        |content| truncate_for_message(content.as_str(), 160),
    );
    Err(ActivityError::Api {
        status: Some(status.as_u16()),
        message: format!(
            "{provider} request failed with status {status}: {body}",
            status = status.as_u16()
        ),
    })
}

pub(super) fn truncate_for_message(message: &str, max_chars: usize) -> String {
    let mut output = String::new();
    let mut chars = message.chars();

    for _ in 0..max_chars {
        let Some(character) = chars.next() else {
            return output;
        };
        output.push(character);
    }

    if chars.next().is_some() {
        output.push_str("...");
    }

    output
}

/// Incremental decoder for `data:`-framed event-stream lines.
#[derive(Debug, Default)]
pub(super) struct SseLineDecoder {
    buffer: String,
}

impl SseLineDecoder {
    pub(super) const fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Feeds one transport chunk and returns every completed data payload.
    pub(super) fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut payloads = Vec::new();
        while let Some(newline_at) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline_at).collect();
            if let Some(payload) = data_payload(&line) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Flushes any unterminated trailing line.
    pub(super) fn finish(&mut self) -> Option<String> {
        let line = std::mem::take(&mut self.buffer);
        data_payload(&line)
    }
}

fn data_payload(line: &str) -> Option<String> {
    let rest = line.trim_end_matches(['\r', '\n']).strip_prefix("data:")?;
    Some(rest.strip_prefix(' ').unwrap_or(rest).to_owned())
}

struct DecodeState {
    frames: BoxStream<'static, Result<Vec<u8>, reqwest::Error>>,
    decoder: SseLineDecoder,
    pending: VecDeque<String>,
    provider: &'static str,
    done: bool,
}

/// Turns a streaming response body into a stream of `data:` payloads.
///
/// Transport failures surface once as an error item; the stream ends after.
pub(super) fn data_payload_stream(
    provider: &'static str,
    response: reqwest::Response,
) -> impl futures::Stream<Item = Result<String, ActivityError>> + Send + 'static {
    let frames = response
        .bytes_stream()
        .map(|result| result.map(|chunk| chunk.to_vec()))
        .boxed();
    let state = DecodeState {
        frames,
        decoder: SseLineDecoder::new(),
        pending: VecDeque::new(),
        provider,
        done: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(payload) = state.pending.pop_front() {
                return Some((Ok(payload), state));
            }
            if state.done {
                return None;
            }

            match state.frames.next().await {
                Some(Ok(chunk)) => state.pending.extend(state.decoder.push(&chunk)),
                Some(Err(error)) => {
                    state.done = true;
                    let provider = state.provider;
                    return Some((
                        Err(ActivityError::Network {
                            message: format!("{provider} stream failed: {error}"),
                        }),
                        state,
                    ));
                }
                None => {
                    state.done = true;
                    if let Some(tail) = state.decoder.finish() {
                        state.pending.push_back(tail);
                    }
                }
            }
        }
    })
}
