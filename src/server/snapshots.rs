//! Share endpoints: persist a finished run and read it back by id.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::github::models::{CommitRecord, IssueOrPrRecord};
use crate::snapshot::{Snapshot, snapshot_id};

use super::{AppState, error_response, error_status};

/// Request body of the share endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ShareRequest {
    actor: String,
    start_time: DateTime<Utc>,
    /// Absent for open-ended runs; the capture time stands in.
    end_time: Option<DateTime<Utc>>,
    summary: String,
    commits: Vec<CommitRecord>,
    issues: Vec<IssueOrPrRecord>,
    pull_requests: Vec<IssueOrPrRecord>,
}

pub(super) async fn create_snapshot(
    State(state): State<AppState>,
    Json(request): Json<ShareRequest>,
) -> Response {
    let actor = request.actor.trim();
    if actor.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Invalid request body");
    }

    let end_time = request.end_time.unwrap_or_else(Utc::now);
    let id = snapshot_id(actor, request.start_time, end_time);
    let snapshot = Snapshot {
        id: id.clone(),
        actor: actor.to_owned(),
        start_time: request.start_time,
        end_time,
        summary: request.summary,
        commits: request.commits,
        issues: request.issues,
        pull_requests: request.pull_requests,
    };

    match state.snapshots.put(snapshot).await {
        Ok(stored_id) => Json(json!({ "id": stored_id })).into_response(),
        Err(error) => {
            warn!(%error, "snapshot write failed");
            error_response(error_status(&error), &error.to_string())
        }
    }
}

pub(super) async fn read_snapshot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state.snapshots.get(&id).await {
        Ok(Some(snapshot)) => Json(snapshot).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "snapshot not found"),
        Err(error) => {
            warn!(%error, "snapshot read failed");
            error_response(error_status(&error), &error.to_string())
        }
    }
}
