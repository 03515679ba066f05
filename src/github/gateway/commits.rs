//! GraphQL queries backing the commit history walk.
//!
//! One batched query pulls a repository's default branch name plus a page of
//! branches, each carrying its first page of in-window history. A focused
//! per-branch query drains any branch whose history spans more pages than the
//! batched shape can address.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::github::error::ActivityError;
use crate::github::models::RepositoryRef;
use crate::github::window::TimeWindow;

use super::CommitGateway;
use super::client::OctocrabActivityGateway;
use super::error_mapping::map_octocrab_error_with_rate_limit;
use super::types::{BranchCommits, CommitHistoryPage, CommitNode, RepositoryCommitsPage};

const REPO_COMMITS_QUERY: &str = r#"
  query RepoCommits(
    $owner: String!
    $repo: String!
    $since: GitTimestamp!
    $until: GitTimestamp
    $branchCursor: String
  ) {
    repository(owner: $owner, name: $repo) {
      name
      nameWithOwner
      defaultBranchRef {
        name
      }
      refs(
        first: 25,
        refPrefix: "refs/heads/",
        after: $branchCursor,
        orderBy: {field: TAG_COMMIT_DATE, direction: DESC}
      ) {
        nodes {
          name
          target {
            ... on Commit {
              history(first: 100, since: $since, until: $until) {
                nodes {
                  messageHeadline
                  oid
                  committedDate
                  url
                  additions
                  deletions
                  author {
                    user {
                      login
                    }
                  }
                }
                pageInfo {
                  hasNextPage
                  endCursor
                }
              }
            }
          }
        }
        pageInfo {
          hasNextPage
          endCursor
        }
      }
    }
  }
"#;

const BRANCH_HISTORY_QUERY: &str = r"
  query BranchHistory(
    $owner: String!
    $repo: String!
    $branch: String!
    $since: GitTimestamp!
    $until: GitTimestamp
    $commitCursor: String
  ) {
    repository(owner: $owner, name: $repo) {
      ref(qualifiedName: $branch) {
        target {
          ... on Commit {
            history(first: 100, since: $since, until: $until, after: $commitCursor) {
              nodes {
                messageHeadline
                oid
                committedDate
                url
                additions
                deletions
                author {
                  user {
                    login
                  }
                }
              }
              pageInfo {
                hasNextPage
                endCursor
              }
            }
          }
        }
      }
    }
  }
";

#[async_trait]
impl CommitGateway for OctocrabActivityGateway {
    async fn repository_commits(
        &self,
        repository: &RepositoryRef,
        window: TimeWindow,
        branch_cursor: Option<String>,
    ) -> Result<RepositoryCommitsPage, ActivityError> {
        let payload = json!({
            "query": REPO_COMMITS_QUERY,
            "variables": {
                "owner": repository.owner(),
                "repo": repository.name(),
                "since": window.git_since(),
                "until": window.git_until(),
                "branchCursor": branch_cursor,
            }
        });

        let response = self
            .graphql_value(&payload, &format!("fetch commits for {repository}"))
            .await?;
        parse_repository_page(&response)
    }

    async fn branch_history(
        &self,
        repository: &RepositoryRef,
        branch: &str,
        window: TimeWindow,
        commit_cursor: String,
    ) -> Result<CommitHistoryPage, ActivityError> {
        let payload = json!({
            "query": BRANCH_HISTORY_QUERY,
            "variables": {
                "owner": repository.owner(),
                "repo": repository.name(),
                "branch": format!("refs/heads/{branch}"),
                "since": window.git_since(),
                "until": window.git_until(),
                "commitCursor": commit_cursor,
            }
        });

        let response = self
            .graphql_value(
                &payload,
                &format!("fetch {branch} history for {repository}"),
            )
            .await?;
        parse_branch_history(&response)
    }
}

impl OctocrabActivityGateway {
    async fn graphql_value(
        &self,
        payload: &Value,
        operation: &str,
    ) -> Result<Value, ActivityError> {
        let response: Value = match self.client().graphql(payload).await {
            Ok(response) => response,
            Err(error) => {
                return Err(
                    map_octocrab_error_with_rate_limit(self.client(), operation, &error).await,
                );
            }
        };

        if let Some(message) = first_graphql_error(&response) {
            return Err(ActivityError::Api {
                status: None,
                message: format!("{operation} failed: {message}"),
            });
        }

        Ok(response)
    }
}

/// Returns the first GraphQL-level error message, when the response carries
/// an `errors` array.
fn first_graphql_error(response: &Value) -> Option<String> {
    let errors = response.get("errors")?.as_array()?;
    let first = errors.first()?;
    Some(
        first
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("GraphQL error")
            .to_owned(),
    )
}

fn parse_repository_page(response: &Value) -> Result<RepositoryCommitsPage, ActivityError> {
    let repository = non_null(response.pointer("/data/repository")).ok_or_else(|| {
        ActivityError::Schema {
            message: "response has no repository".to_owned(),
        }
    })?;

    let name = require_str(repository, "/name", "repository name")?;
    let name_with_owner = require_str(repository, "/nameWithOwner", "repository nameWithOwner")?;
    let default_branch = require_str(repository, "/defaultBranchRef/name", "default branch")?;

    let refs = repository
        .pointer("/refs")
        .ok_or_else(|| ActivityError::Schema {
            message: format!("{name_with_owner} has no refs object"),
        })?;
    let nodes = refs
        .pointer("/nodes")
        .and_then(Value::as_array)
        .ok_or_else(|| ActivityError::Schema {
            message: format!("{name_with_owner} has no branch nodes"),
        })?;

    let mut branches = Vec::with_capacity(nodes.len());
    for node in nodes {
        let Some(branch_name) = node.get("name").and_then(Value::as_str) else {
            debug!("dropping unnamed branch node");
            continue;
        };
        let Some(history) = non_null(node.pointer("/target/history")) else {
            debug!(branch = branch_name, "branch has no commit history target");
            continue;
        };
        let (commits, next_commit_cursor) = parse_history_nodes(history);
        branches.push(BranchCommits {
            name: branch_name.to_owned(),
            commits,
            next_commit_cursor,
        });
    }

    Ok(RepositoryCommitsPage {
        name: name.to_owned(),
        name_with_owner: name_with_owner.to_owned(),
        default_branch: default_branch.to_owned(),
        branches,
        next_branch_cursor: page_cursor(refs.pointer("/pageInfo")),
    })
}

fn parse_branch_history(response: &Value) -> Result<CommitHistoryPage, ActivityError> {
    let history = non_null(response.pointer("/data/repository/ref/target/history")).ok_or_else(
        || ActivityError::Schema {
            message: "branch history missing from response".to_owned(),
        },
    )?;

    let (commits, next_commit_cursor) = parse_history_nodes(history);
    Ok(CommitHistoryPage {
        commits,
        next_commit_cursor,
    })
}

/// Parses the commit nodes of one history object, dropping nodes that fail
/// validation rather than failing the whole page.
fn parse_history_nodes(history: &Value) -> (Vec<CommitNode>, Option<String>) {
    let commits = history
        .pointer("/nodes")
        .and_then(Value::as_array)
        .map(|nodes| {
            nodes
                .iter()
                .filter_map(|node| match CommitNode::deserialize(node) {
                    Ok(commit) => Some(commit),
                    Err(error) => {
                        debug!(%error, "dropping malformed commit node");
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    (commits, page_cursor(history.pointer("/pageInfo")))
}

fn page_cursor(page_info: Option<&Value>) -> Option<String> {
    let info = page_info?;
    if info.get("hasNextPage").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    info.get("endCursor")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|inner| !inner.is_null())
}

fn require_str<'a>(
    value: &'a Value,
    pointer: &str,
    description: &str,
) -> Result<&'a str, ActivityError> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| ActivityError::Schema {
            message: format!("response has no {description}"),
        })
}
