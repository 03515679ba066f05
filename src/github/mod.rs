//! GitHub activity aggregation: discovery, commit walking, orchestration,
//! and issue/PR search.
//!
//! The gateway traits isolate HTTP from the pipeline logic so discovery, the
//! walker, the orchestrator, and the issue aggregator are all testable
//! against mocks; [`gateway::OctocrabActivityGateway`] carries the real
//! traffic. Errors are mapped into [`ActivityError`] variants so callers can
//! isolate failures at the right granularity without seeing Octocrab
//! internals.

pub mod discovery;
pub mod error;
pub mod gateway;
pub mod issues;
pub mod merge;
pub mod models;
pub mod orchestrator;
pub mod progress;
pub mod rate_limit;
pub mod walker;
pub mod window;

pub use discovery::RepositoryDiscovery;
pub use error::ActivityError;
pub use gateway::{ActivityGateway, OctocrabActivityGateway, PersonalAccessToken};
pub use issues::IssueAggregator;
pub use merge::merged_commits;
pub use models::{
    AggregationResult, CommitRecord, IssueOrPrRecord, ItemKind, RepositoryRef,
};
pub use orchestrator::{BatchOrchestrator, INTER_BATCH_DELAY, REPO_BATCH_SIZE};
pub use progress::{NoopProgressSink, ProgressEvent, ProgressSink};
pub use walker::CommitWalker;
pub use window::{Actor, ActorKind, TimeWindow, parse_timestamp};
