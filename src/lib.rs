//! Gitrecap library crate: GitHub activity aggregation with streamed
//! progress, LLM-backed summaries, and shareable snapshots.
//!
//! The library discovers which repositories a user or organization touched
//! inside a time window, walks every branch's in-window commit history with
//! bounded concurrency against the GitHub rate limit, aggregates issues and
//! pull requests from the search API, and merges everything into one
//! deduplicated, chronologically ordered view. An HTTP server streams
//! aggregation progress to the caller, fronts a fallback chain of summary
//! providers, and persists shareable snapshots of finished runs.

pub mod config;
pub mod github;
pub mod server;
pub mod snapshot;
pub mod summarize;

pub use config::RecapConfig;
pub use github::{
    ActivityError, Actor, ActorKind, AggregationResult, BatchOrchestrator, CommitRecord,
    CommitWalker, IssueAggregator, IssueOrPrRecord, OctocrabActivityGateway, PersonalAccessToken,
    RepositoryDiscovery, RepositoryRef, TimeWindow, merged_commits,
};
pub use server::AppState;
pub use snapshot::{MemorySnapshotStore, Snapshot, SnapshotStore};
pub use summarize::{ActivityPrompt, SummarizerChain, SummaryProvider};
