//! Aggregation endpoint: a server-push event stream of progress frames and
//! one terminal result frame.
//!
//! The producer task runs the batch orchestrator and pushes frames into an
//! unbounded channel; the response side drains the channel, so a slow
//! consumer buffers in the transport and never stalls the run. The stream
//! closing is the completion signal; an explicit `error` frame precedes an
//! early close when the terminal payload cannot be produced.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error};

use crate::github::error::ActivityError;
use crate::github::gateway::ActivityGateway;
use crate::github::models::RepositoryRef;
use crate::github::orchestrator::BatchOrchestrator;
use crate::github::progress::{ProgressEvent, ProgressSink};
use crate::github::window::{Actor, ActorKind, TimeWindow, parse_timestamp};

use super::{AppState, error_response};

/// Query parameters of the aggregation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct CommitsQuery {
    username: Option<String>,
    from: Option<String>,
    to: Option<String>,
    repos: Option<String>,
    #[serde(rename = "isOrg", default)]
    is_org: bool,
}

/// A validated aggregation request.
#[derive(Debug, Clone)]
struct AggregationRequest {
    actor: Actor,
    window: TimeWindow,
    repositories: Vec<RepositoryRef>,
}

pub(super) async fn stream_commits(
    State(state): State<AppState>,
    Query(query): Query<CommitsQuery>,
) -> Response {
    let request = match parse_request(&query) {
        Ok(request) => request,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let (sender, receiver) = mpsc::unbounded_channel::<Event>();
    let gateway = Arc::clone(&state.gateway);
    tokio::spawn(async move {
        run_aggregation(gateway, request, sender).await;
    });

    Sse::new(UnboundedReceiverStream::new(receiver).map(Ok::<_, Infallible>)).into_response()
}

/// Validates the raw query into a runnable request.
///
/// Error messages are client-facing and intentionally terse.
fn parse_request(query: &CommitsQuery) -> Result<AggregationRequest, &'static str> {
    let username = query
        .username
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or("Missing required parameters")?;
    let from_raw = query.from.as_deref().ok_or("Missing required parameters")?;
    let repos_raw = query.repos.as_deref().ok_or("Missing required parameters")?;

    let from = parse_timestamp(from_raw).map_err(|_| "Invalid date format")?;
    let to = match query.to.as_deref() {
        Some(to_raw) => Some(parse_timestamp(to_raw).map_err(|_| "Invalid to date format")?),
        None => None,
    };
    let window = TimeWindow::new(from, to).map_err(|_| "Invalid date range")?;

    let names: Vec<String> =
        serde_json::from_str(repos_raw).map_err(|_| "Invalid repos parameter")?;
    let repositories: Vec<RepositoryRef> = names
        .iter()
        .map(RepositoryRef::new)
        .collect::<Result<_, _>>()
        .map_err(|_| "Invalid repos parameter")?;

    let kind = if query.is_org {
        ActorKind::Organization
    } else {
        ActorKind::User
    };
    let actor = Actor::new(username, kind).map_err(|_| "Missing required parameters")?;

    Ok(AggregationRequest {
        actor,
        window,
        repositories,
    })
}

/// Progress sink that frames batch completions for the event stream.
struct ChannelProgressSink {
    sender: mpsc::UnboundedSender<Event>,
}

impl ProgressSink for ChannelProgressSink {
    fn record(&self, event: ProgressEvent) {
        if let ProgressEvent::BatchCompleted { processed, total } = event {
            let frame =
                Event::default().data(format!("{processed} of {total} repositories processed"));
            let _ignored = self.sender.send(frame);
        }
    }
}

async fn run_aggregation(
    gateway: Arc<dyn ActivityGateway>,
    request: AggregationRequest,
    sender: mpsc::UnboundedSender<Event>,
) {
    let sink = ChannelProgressSink {
        sender: sender.clone(),
    };
    let orchestrator = BatchOrchestrator::new(gateway.as_ref());
    let result = orchestrator
        .run(
            &request.repositories,
            &request.actor,
            request.window,
            &sink,
        )
        .await;

    let terminal = match serde_json::to_string(&result) {
        Ok(payload) => Event::default().data(payload),
        Err(serialise_error) => {
            error!(%serialise_error, "failed to serialise the aggregation result");
            let message = ActivityError::Schema {
                message: "aggregation result could not be serialised".to_owned(),
            };
            Event::default()
                .event("error")
                .data(json!({ "error": message.to_string() }).to_string())
        }
    };

    if sender.send(terminal).is_err() {
        debug!("aggregation consumer went away before the terminal frame");
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{CommitsQuery, parse_request};

    fn query(
        username: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
        repos: Option<&str>,
    ) -> CommitsQuery {
        CommitsQuery {
            username: username.map(ToOwned::to_owned),
            from: from.map(ToOwned::to_owned),
            to: to.map(ToOwned::to_owned),
            repos: repos.map(ToOwned::to_owned),
            is_org: false,
        }
    }

    #[test]
    fn valid_requests_parse_into_typed_parts() {
        let parsed = parse_request(&query(
            Some("octocat"),
            Some("2024-01-01T00:00:00Z"),
            Some("2024-02-01T00:00:00Z"),
            Some(r#"["octocat/hello-world","octocat/spoon-knife"]"#),
        ))
        .expect("request should parse");

        assert_eq!(parsed.actor.name(), "octocat");
        assert_eq!(parsed.repositories.len(), 2);
        assert!(parsed.window.to().is_some());
    }

    #[rstest]
    #[case::missing_username(
        query(None, Some("2024-01-01T00:00:00Z"), None, Some("[]")),
        "Missing required parameters"
    )]
    #[case::missing_from(query(Some("octocat"), None, None, Some("[]")), "Missing required parameters")]
    #[case::missing_repos(
        query(Some("octocat"), Some("2024-01-01T00:00:00Z"), None, None),
        "Missing required parameters"
    )]
    #[case::bad_from(
        query(Some("octocat"), Some("yesterday"), None, Some("[]")),
        "Invalid date format"
    )]
    #[case::bad_to(
        query(
            Some("octocat"),
            Some("2024-01-01T00:00:00Z"),
            Some("later"),
            Some("[]")
        ),
        "Invalid to date format"
    )]
    #[case::inverted_range(
        query(
            Some("octocat"),
            Some("2024-02-01T00:00:00Z"),
            Some("2024-01-01T00:00:00Z"),
            Some("[]")
        ),
        "Invalid date range"
    )]
    #[case::unparsable_repos(
        query(Some("octocat"), Some("2024-01-01T00:00:00Z"), None, Some("not json")),
        "Invalid repos parameter"
    )]
    #[case::malformed_repo_entry(
        query(
            Some("octocat"),
            Some("2024-01-01T00:00:00Z"),
            None,
            Some(r#"["not-owner-qualified"]"#)
        ),
        "Invalid repos parameter"
    )]
    fn invalid_requests_fail_with_client_messages(
        #[case] raw: CommitsQuery,
        #[case] expected: &str,
    ) {
        let error = parse_request(&raw).expect_err("request should be rejected");
        assert_eq!(error, expected);
    }
}
