//! Final merge of the partitioned commit view.

use std::collections::HashSet;

use super::models::{AggregationResult, CommitRecord};

/// Merges both partitions into one deduplicated, newest-first sequence.
///
/// Default-branch entries are iterated before other-branch entries, so a
/// commit reachable from both keeps its default-branch attribution.
#[must_use]
pub fn merged_commits(result: &AggregationResult) -> Vec<CommitRecord> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged: Vec<CommitRecord> = Vec::new();

    for commit in result
        .default_branch
        .iter()
        .chain(result.other_branches.iter())
    {
        if seen.insert(commit.oid.as_str()) {
            merged.push(commit.clone());
        }
    }

    merged.sort_by(|a, b| b.committed_date.cmp(&a.committed_date));
    merged
}
