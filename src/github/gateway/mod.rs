//! Gateways for reaching GitHub through Octocrab.
//!
//! The trait-based design keeps the pipeline logic (discovery, walking,
//! search) testable against mocks while [`OctocrabActivityGateway`] handles
//! real HTTP traffic, REST and GraphQL alike.

mod client;
mod commits;
mod discovery;
mod error_mapping;
mod paging;
mod search;
mod types;

pub use client::{OctocrabActivityGateway, PersonalAccessToken};
pub use types::{
    BranchCommits, CommitHistoryPage, CommitNode, IssueSearchItem, RepositoryCommitsPage,
    RepositoryListing, SearchRepository,
};

use async_trait::async_trait;

use crate::github::error::ActivityError;
use crate::github::models::RepositoryRef;
use crate::github::window::TimeWindow;

/// Gateway backing repository discovery.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiscoveryGateway: Send + Sync {
    /// Repositories referenced by the account's recent public events.
    async fn public_event_repositories(
        &self,
        actor: &str,
    ) -> Result<Vec<RepositoryRef>, ActivityError>;

    /// The account's repository listing, sorted by most-recently-pushed.
    async fn user_repositories(&self, actor: &str)
    -> Result<Vec<RepositoryListing>, ActivityError>;

    /// One page of an organization's repository listing, sorted by
    /// most-recently-pushed descending. An empty page ends the listing.
    async fn organization_repository_page(
        &self,
        actor: &str,
        page: u32,
    ) -> Result<Vec<RepositoryListing>, ActivityError>;

    /// Repositories referenced by commits matching an author search over the
    /// window. Paginated internally until the search is exhausted.
    async fn commit_search_repositories(
        &self,
        actor: &str,
        window: TimeWindow,
    ) -> Result<Vec<RepositoryRef>, ActivityError>;
}

/// Gateway backing the commit history walk.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommitGateway: Send + Sync {
    /// One page of the batched per-repository commit query: default branch
    /// name plus up to 25 branches each with up to 100 in-window commits.
    async fn repository_commits(
        &self,
        repository: &RepositoryRef,
        window: TimeWindow,
        branch_cursor: Option<String>,
    ) -> Result<RepositoryCommitsPage, ActivityError>;

    /// One further page of a single branch's in-window commit history.
    async fn branch_history(
        &self,
        repository: &RepositoryRef,
        branch: &str,
        window: TimeWindow,
        commit_cursor: String,
    ) -> Result<CommitHistoryPage, ActivityError>;
}

/// Gateway backing the issue/PR search pass.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// One page of the issue search endpoint for the given query.
    async fn issue_search_page(
        &self,
        query: &str,
        sort: &str,
        page: u32,
    ) -> Result<Vec<IssueSearchItem>, ActivityError>;
}

/// Everything the aggregation pipeline needs from GitHub, as one object-safe
/// bound so the server can hold a single shared gateway.
pub trait ActivityGateway: DiscoveryGateway + CommitGateway + SearchGateway {}

impl<T> ActivityGateway for T where T: DiscoveryGateway + CommitGateway + SearchGateway {}
