//! Discovery endpoint: resolves the repository set before an aggregation
//! stream is opened.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::github::discovery::RepositoryDiscovery;
use crate::github::models::RepositoryRef;
use crate::github::progress::NoopProgressSink;
use crate::github::window::{Actor, ActorKind, TimeWindow, parse_timestamp};

use super::{AppState, error_response, error_status};

/// Query parameters of the discovery endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct RepositoriesQuery {
    username: Option<String>,
    from: Option<String>,
    to: Option<String>,
    #[serde(rename = "isOrg", default)]
    is_org: bool,
}

pub(super) async fn list_repositories(
    State(state): State<AppState>,
    Query(query): Query<RepositoriesQuery>,
) -> Response {
    let (actor, window) = match parse_request(&query) {
        Ok(parts) => parts,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let discovery = RepositoryDiscovery::new(state.gateway.as_ref());
    match discovery.discover(&actor, window, &NoopProgressSink).await {
        Ok(found) => {
            let names: Vec<&str> = found.iter().map(RepositoryRef::name_with_owner).collect();
            Json(json!({ "repositories": names })).into_response()
        }
        Err(error) => {
            warn!(%error, actor = actor.name(), "repository discovery failed");
            error_response(error_status(&error), &error.to_string())
        }
    }
}

fn parse_request(query: &RepositoriesQuery) -> Result<(Actor, TimeWindow), &'static str> {
    let username = query
        .username
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or("Missing required parameters")?;
    let from_raw = query.from.as_deref().ok_or("Missing required parameters")?;

    let from = parse_timestamp(from_raw).map_err(|_| "Invalid date format")?;
    let to = match query.to.as_deref() {
        Some(to_raw) => Some(parse_timestamp(to_raw).map_err(|_| "Invalid to date format")?),
        None => None,
    };
    let window = TimeWindow::new(from, to).map_err(|_| "Invalid date range")?;

    let kind = if query.is_org {
        ActorKind::Organization
    } else {
        ActorKind::User
    };
    let actor = Actor::new(username, kind).map_err(|_| "Missing required parameters")?;

    Ok((actor, window))
}
