//! Data models for aggregated commits, issues, and pull requests.
//!
//! These types are wire-compatible with the dashboard payloads: field names
//! serialise in camelCase and the commit author keeps its nested nullable
//! `user` object, so existing consumers of the event stream keep working.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ActivityError;

/// An owning-account-qualified repository name (`owner/name`).
///
/// Discovery produces a deduplicated set of these; the commit walker consumes
/// them. Identity and ordering are the full `owner/name` string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryRef(String);

impl RepositoryRef {
    /// Validates an `owner/name` reference.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::InvalidRepository`] unless the value contains
    /// a non-empty owner and a non-empty name separated by `/`.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ActivityError> {
        let trimmed = value.as_ref().trim();
        match trimmed.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self(trimmed.to_owned()))
            }
            _ => Err(ActivityError::InvalidRepository {
                value: trimmed.to_owned(),
            }),
        }
    }

    /// Borrow the full `owner/name` value.
    #[must_use]
    pub fn name_with_owner(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the owning account.
    #[must_use]
    pub fn owner(&self) -> &str {
        self.0.split_once('/').map_or("", |(owner, _)| owner)
    }

    /// Returns the repository name without the owner.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.split_once('/').map_or("", |(_, name)| name)
    }
}

impl std::fmt::Display for RepositoryRef {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Commit author as reported by the GraphQL API: a nullable linked user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    /// Linked GitHub user, absent when the commit email matches no account.
    pub user: Option<CommitUser>,
}

impl CommitAuthor {
    /// Returns the author login when a linked user is present.
    #[must_use]
    pub fn login(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.login.as_str())
    }
}

/// The GitHub account linked to a commit author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitUser {
    /// Account login.
    pub login: String,
}

/// Repository display names attached to each commit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRepository {
    /// Repository name without the owner.
    pub name: String,
    /// Owner-qualified repository name.
    #[serde(rename = "nameWithOwner")]
    pub name_with_owner: String,
}

/// One accepted commit, tagged with the repository and branch it was found
/// under. Identity for deduplication is `oid` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
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
    pub author: CommitAuthor,
    /// Repository the commit belongs to.
    pub repository: CommitRepository,
    /// Branch under which the commit was found.
    pub branch: String,
}

/// Whether a search result is an issue or a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Plain issue.
    Issue,
    /// Pull request.
    Pr,
}

/// Repository attribution for an issue or pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRepository {
    /// Owner-qualified repository name, or the literal `unknown`.
    #[serde(rename = "nameWithOwner")]
    pub name_with_owner: String,
}

/// One issue or pull request found by the search pass. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueOrPrRecord {
    /// Stable numeric id from the search payload.
    pub id: u64,
    /// Item title.
    pub title: String,
    /// Issue or pull request number within its repository.
    pub number: u64,
    /// State string as reported by the API (e.g. `open`, `closed`).
    pub state: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// HTML URL.
    pub url: String,
    /// Repository attribution, possibly the `unknown` placeholder.
    pub repository: IssueRepository,
    /// Derived item kind (serialised as `type` for wire compatibility).
    #[serde(rename = "type")]
    pub kind: ItemKind,
}

/// The final commit view: two disjoint partitions keyed by whether a commit's
/// branch is the repository's default branch.
///
/// Both sequences are sorted by `committedDate` descending once a run
/// completes; the ordering is a final-state invariant, not an incremental one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    /// Commits found on each repository's default branch.
    #[serde(rename = "defaultBranch")]
    pub default_branch: Vec<CommitRecord>,
    /// Commits found on any other branch.
    #[serde(rename = "otherBranches")]
    pub other_branches: Vec<CommitRecord>,
}

impl AggregationResult {
    /// Total number of records across both partitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.default_branch.len() + self.other_branches.len()
    }

    /// Returns true when neither partition holds a record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.default_branch.is_empty() && self.other_branches.is_empty()
    }

    /// Sorts both partitions by commit date, newest first.
    pub fn sort_chronologically(&mut self) {
        self.default_branch
            .sort_by(|a, b| b.committed_date.cmp(&a.committed_date));
        self.other_branches
            .sort_by(|a, b| b.committed_date.cmp(&a.committed_date));
    }
}
