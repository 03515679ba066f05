//! Shareable snapshots of a completed aggregation run.
//!
//! A snapshot freezes one run's summary and activity under a deterministic
//! id so the result can be read back from a share link. The store is a
//! capability trait; the in-memory implementation backs a single-process
//! deployment and the tests.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::github::error::ActivityError;
use crate::github::models::{CommitRecord, IssueOrPrRecord};

/// One persisted aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Deterministic snapshot id, see [`snapshot_id`].
    pub id: String,
    /// The analysed user or organization.
    pub actor: String,
    /// Window start.
    pub start_time: DateTime<Utc>,
    /// Window end, or the capture time for open-ended runs.
    pub end_time: DateTime<Utc>,
    /// Generated prose summary.
    pub summary: String,
    /// Merged commit view at capture time.
    pub commits: Vec<CommitRecord>,
    /// Issues at capture time.
    pub issues: Vec<IssueOrPrRecord>,
    /// Pull requests at capture time.
    pub pull_requests: Vec<IssueOrPrRecord>,
}

/// Builds the deterministic snapshot id `"<actor>-<from>-to-<to>"` with
/// date-only timestamps.
#[must_use]
pub fn snapshot_id(actor: &str, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> String {
    format!(
        "{actor}-{start}-to-{end}",
        start = start_time.format("%Y-%m-%d"),
        end = end_time.format("%Y-%m-%d")
    )
}

/// Persistence capability for shareable snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Writes a snapshot under its id, replacing any previous capture, and
    /// returns the id for the share link.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::Io`] when the backing store fails.
    async fn put(&self, snapshot: Snapshot) -> Result<String, ActivityError>;

    /// Reads a snapshot back by id.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::Io`] when the backing store fails.
    async fn get(&self, id: &str) -> Result<Option<Snapshot>, ActivityError>;
}

/// In-memory snapshot store.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: RwLock<HashMap<String, Snapshot>>,
}

impl MemorySnapshotStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn put(&self, snapshot: Snapshot) -> Result<String, ActivityError> {
        let id = snapshot.id.clone();
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), snapshot);
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Option<Snapshot>, ActivityError> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned())
    }
}
