//! Wire and page types shared across gateway trait signatures.
//!
//! REST payloads deserialise directly (the API speaks snake_case); the
//! GraphQL commit payloads are assembled by the commits gateway, which
//! validates each commit node individually.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One entry of a repository listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryListing {
    /// Owner-qualified repository name.
    pub full_name: String,
    /// Timestamp of the most recent push, absent for never-pushed repos.
    pub pushed_at: Option<DateTime<Utc>>,
}

/// A validated commit node from the GraphQL commit history.
///
/// Every field is required: a node missing its oid, line counts, or author
/// shape fails validation and is dropped before reaching the walker.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitNode {
    /// First line of the commit message.
    pub message_headline: String,
    /// Commit object id.
    pub oid: String,
    /// Commit timestamp.
    pub committed_date: DateTime<Utc>,
    /// HTML URL of the commit.
    pub url: String,
    /// Lines added.
    pub additions: u64,
    /// Lines removed.
    pub deletions: u64,
    /// Author with nullable linked user.
    pub author: CommitNodeAuthor,
}

/// Author object of a commit node; the linked user may be null.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitNodeAuthor {
    /// Linked GitHub account, if the author email maps to one.
    pub user: Option<CommitNodeUser>,
}

/// The GitHub account linked to a commit node author.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitNodeUser {
    /// Account login.
    pub login: String,
}

impl CommitNode {
    /// Returns the author login when a linked user is present.
    #[must_use]
    pub fn author_login(&self) -> Option<&str> {
        self.author.user.as_ref().map(|user| user.login.as_str())
    }
}

/// One branch's slice of the batched commit query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchCommits {
    /// Branch name.
    pub name: String,
    /// Validated commit nodes on this page.
    pub commits: Vec<CommitNode>,
    /// Cursor for the branch's next history page, when one exists.
    pub next_commit_cursor: Option<String>,
}

/// One page of the batched per-repository commit query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryCommitsPage {
    /// Repository name without the owner.
    pub name: String,
    /// Owner-qualified repository name.
    pub name_with_owner: String,
    /// Default branch name at fetch time.
    pub default_branch: String,
    /// Branches on this page with their first history slice.
    pub branches: Vec<BranchCommits>,
    /// Cursor for the next branch page, when one exists.
    pub next_branch_cursor: Option<String>,
}

/// One further page of a single branch's commit history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitHistoryPage {
    /// Validated commit nodes on this page.
    pub commits: Vec<CommitNode>,
    /// Cursor for the next page, when one exists.
    pub next_commit_cursor: Option<String>,
}

/// Repository object embedded in search results.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchRepository {
    /// Owner-qualified repository name.
    pub full_name: String,
}

/// One raw item from the issue search endpoint.
///
/// The search API mixes issues and pull requests in one response and omits
/// fields freely; classification and repository attribution happen in the
/// issue aggregator, which needs the raw shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueSearchItem {
    /// Stable numeric id.
    pub id: u64,
    /// Item title.
    #[serde(default)]
    pub title: String,
    /// Issue or pull request number.
    pub number: u64,
    /// State string (e.g. `open`, `closed`).
    pub state: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// HTML URL, when present.
    pub html_url: Option<String>,
    /// API URL of the item itself, when present.
    pub url: Option<String>,
    /// API URL of the owning repository, when present.
    pub repository_url: Option<String>,
    /// Explicit repository object, rarely present on search results.
    pub repository: Option<SearchRepository>,
    /// Pull-request marker object; presence alone classifies the item.
    pub pull_request: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{CommitNode, IssueSearchItem, RepositoryListing};

    #[test]
    fn repository_listing_tolerates_null_pushed_at() {
        let listing: RepositoryListing = serde_json::from_value(json!({
            "full_name": "octocat/empty",
            "pushed_at": null
        }))
        .expect("listing should deserialise");

        assert!(listing.pushed_at.is_none());
    }

    #[test]
    fn commit_node_requires_line_counts() {
        let result: Result<CommitNode, _> = serde_json::from_value(json!({
            "messageHeadline": "broken",
            "oid": "abc",
            "committedDate": "2024-01-01T00:00:00Z",
            "url": "https://example.test",
            "author": { "user": null }
        }));

        assert!(result.is_err(), "node without additions should be rejected");
    }

    #[test]
    fn commit_node_requires_author_shape() {
        let result: Result<CommitNode, _> = serde_json::from_value(json!({
            "messageHeadline": "broken",
            "oid": "abc",
            "committedDate": "2024-01-01T00:00:00Z",
            "url": "https://example.test",
            "additions": 1,
            "deletions": 2
        }));

        assert!(result.is_err(), "node without author should be rejected");
    }

    #[test]
    fn issue_search_item_accepts_minimal_payload() {
        let item: IssueSearchItem = serde_json::from_value(json!({
            "id": 1,
            "number": 2,
            "state": "open",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z"
        }))
        .expect("minimal item should deserialise");

        assert_eq!(item.title, "");
        assert!(item.pull_request.is_none());
        assert!(item.repository.is_none());
    }
}
