//! Summary endpoint: streams the provider chain's output as plain text.
//!
//! The body is raw text deltas terminated by a literal `[DONE]` marker; once
//! streaming has begun, a provider failure closes the connection without an
//! in-band error (the marker's absence tells the consumer the stream died).

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use serde::Deserialize;
use tracing::warn;

use crate::github::error::ActivityError;
use crate::github::models::{CommitRecord, IssueOrPrRecord};
use crate::summarize::ActivityPrompt;

use super::{AppState, error_response};

/// Terminal marker appended after the last delta.
const DONE_MARKER: &str = "[DONE]";

/// Request body of the summary endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct SummaryRequest {
    commits: Vec<CommitRecord>,
    #[serde(rename = "issuesAndPRs")]
    issues_and_prs: Vec<IssueOrPrRecord>,
    username: String,
}

pub(super) async fn stream_summary(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> Response {
    if request.username.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Invalid request body");
    }
    if state.summarizer.is_empty() {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "No AI service API keys configured",
        );
    }

    let prompt = ActivityPrompt::new(
        &request.commits,
        &request.issues_and_prs,
        request.username.trim(),
    );
    match state.summarizer.stream_summary(&prompt).await {
        Ok(stream) => {
            let terminated = stream.chain(futures::stream::once(async {
                Ok::<String, ActivityError>(DONE_MARKER.to_owned())
            }));
            (
                [
                    (header::CONTENT_TYPE, "text/event-stream"),
                    (header::CACHE_CONTROL, "no-cache"),
                ],
                Body::from_stream(terminated),
            )
                .into_response()
        }
        Err(error) => {
            warn!(%error, "summary generation failed before streaming");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate summary",
            )
        }
    }
}
