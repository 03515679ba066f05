//! Batch orchestration of per-repository commit fetches.
//!
//! Repositories are processed in fixed-size batches: every fetch in a batch
//! is in flight concurrently, failures are contained to the repository that
//! raised them, and the folded result grows on the awaiting task only. A
//! fixed pause separates batches as a courtesy to the external rate limit.

use std::time::Duration;

use futures::future::join_all;
use tokio::time::sleep;
use tracing::warn;

use super::gateway::CommitGateway;
use super::models::{AggregationResult, RepositoryRef};
use super::progress::{ProgressEvent, ProgressSink};
use super::walker::{CommitWalker, RepositoryCommits};
use super::window::{Actor, TimeWindow};

/// Repositories fetched concurrently per batch.
pub const REPO_BATCH_SIZE: usize = 3;

/// Pause between batches; rate-limit courtesy, not a correctness requirement.
pub const INTER_BATCH_DELAY: Duration = Duration::from_secs(1);

/// Drives the commit walker across a repository set.
pub struct BatchOrchestrator<'gateway, Gateway>
where
    Gateway: CommitGateway + ?Sized,
{
    walker: CommitWalker<'gateway, Gateway>,
}

impl<'gateway, Gateway> BatchOrchestrator<'gateway, Gateway>
where
    Gateway: CommitGateway + ?Sized,
{
    /// Creates an orchestrator over the given gateway.
    #[must_use]
    pub const fn new(gateway: &'gateway Gateway) -> Self {
        Self {
            walker: CommitWalker::new(gateway),
        }
    }

    /// Fetches every repository in batches and returns the folded result,
    /// sorted newest-first in both partitions.
    ///
    /// A repository whose fetch fails contributes nothing; the failure is
    /// logged and never aborts its batch. Progress is emitted after each
    /// batch, counting failed repositories as processed.
    pub async fn run(
        &self,
        repositories: &[RepositoryRef],
        actor: &Actor,
        window: TimeWindow,
        progress: &dyn ProgressSink,
    ) -> AggregationResult {
        let total = repositories.len();
        let batch_count = total.div_ceil(REPO_BATCH_SIZE);
        let mut result = AggregationResult::default();
        let mut processed = 0_usize;

        for (index, batch) in repositories.chunks(REPO_BATCH_SIZE).enumerate() {
            let fetches = batch.iter().map(|repository| async move {
                match self.walker.fetch(repository, actor, window).await {
                    Ok(commits) => Some(commits),
                    Err(error) => {
                        warn!(%repository, %error, "repository fetch failed, folding as empty");
                        None
                    }
                }
            });

            // join_all settles every fetch; a failed sibling never cancels
            // the rest. Folding happens here, in batch-input order.
            for repository_commits in join_all(fetches).await.into_iter().flatten() {
                fold(&mut result, repository_commits);
            }

            processed += batch.len();
            progress.record(ProgressEvent::BatchCompleted { processed, total });

            if index + 1 < batch_count {
                sleep(INTER_BATCH_DELAY).await;
            }
        }

        result.sort_chronologically();
        result
    }
}

fn fold(result: &mut AggregationResult, repository_commits: RepositoryCommits) {
    let RepositoryCommits {
        default_branch,
        commits,
    } = repository_commits;

    for commit in commits {
        if commit.branch == default_branch {
            result.default_branch.push(commit);
        } else {
            result.other_branches.push(commit);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::github::error::ActivityError;
    use crate::github::gateway::{BranchCommits, MockCommitGateway, RepositoryCommitsPage};
    use crate::github::models::RepositoryRef;
    use crate::github::progress::test_support::RecordingSink;
    use crate::github::progress::ProgressEvent;
    use crate::github::window::{Actor, ActorKind, TimeWindow, parse_timestamp};

    use super::BatchOrchestrator;

    fn window() -> TimeWindow {
        TimeWindow::since(parse_timestamp("2024-01-01T00:00:00Z").expect("timestamp should parse"))
    }

    fn actor() -> Actor {
        Actor::new("octocat", ActorKind::User).expect("actor should be valid")
    }

    fn repositories(count: usize) -> Vec<RepositoryRef> {
        (0..count)
            .map(|index| {
                RepositoryRef::new(format!("octocat/repo-{index}"))
                    .expect("reference should be valid")
            })
            .collect()
    }

    fn single_branch_page(
        repository: &RepositoryRef,
        branch: &str,
        oid: &str,
        date: &str,
    ) -> RepositoryCommitsPage {
        let commit = serde_json::from_value(serde_json::json!({
            "messageHeadline": format!("commit {oid}"),
            "oid": oid,
            "committedDate": date,
            "url": format!("https://github.com/{repository}/commit/{oid}"),
            "additions": 1,
            "deletions": 0,
            "author": { "user": { "login": "octocat" } }
        }))
        .expect("commit fixture should deserialise");

        RepositoryCommitsPage {
            name: repository.name().to_owned(),
            name_with_owner: repository.name_with_owner().to_owned(),
            default_branch: "main".to_owned(),
            branches: vec![BranchCommits {
                name: branch.to_owned(),
                commits: vec![commit],
                next_commit_cursor: None,
            }],
            next_branch_cursor: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn orchestrator_batches_and_reports_progress() {
        let mut gateway = MockCommitGateway::new();
        gateway
            .expect_repository_commits()
            .times(7)
            .returning(|repository, _, _| {
                Ok(single_branch_page(
                    repository,
                    "main",
                    "aaa",
                    "2024-02-01T00:00:00Z",
                ))
            });

        let sink = RecordingSink::default();
        let repos = repositories(7);
        let result = BatchOrchestrator::new(&gateway)
            .run(&repos, &actor(), window(), &sink)
            .await;

        assert_eq!(result.default_branch.len(), 7);
        assert_eq!(
            sink.take(),
            vec![
                ProgressEvent::BatchCompleted {
                    processed: 3,
                    total: 7,
                },
                ProgressEvent::BatchCompleted {
                    processed: 6,
                    total: 7,
                },
                ProgressEvent::BatchCompleted {
                    processed: 7,
                    total: 7,
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn one_failing_repository_never_aborts_its_batch() {
        let mut gateway = MockCommitGateway::new();
        gateway
            .expect_repository_commits()
            .returning(|repository, _, _| {
                if repository.name_with_owner() == "octocat/repo-1" {
                    Err(ActivityError::Network {
                        message: "connection reset".to_owned(),
                    })
                } else {
                    Ok(single_branch_page(
                        repository,
                        "main",
                        &format!("oid-{}", repository.name()),
                        "2024-02-01T00:00:00Z",
                    ))
                }
            });

        let sink = RecordingSink::default();
        let repos = repositories(3);
        let result = BatchOrchestrator::new(&gateway)
            .run(&repos, &actor(), window(), &sink)
            .await;

        let contributors: Vec<&str> = result
            .default_branch
            .iter()
            .map(|commit| commit.repository.name_with_owner.as_str())
            .collect();
        assert_eq!(contributors, vec!["octocat/repo-0", "octocat/repo-2"]);
        assert_eq!(
            sink.take(),
            vec![ProgressEvent::BatchCompleted {
                processed: 3,
                total: 3,
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn commits_partition_by_default_branch_comparison() {
        let mut gateway = MockCommitGateway::new();
        gateway
            .expect_repository_commits()
            .returning(|repository, _, _| {
                let branch = if repository.name_with_owner() == "octocat/repo-0" {
                    "main"
                } else {
                    "feature/x"
                };
                Ok(single_branch_page(
                    repository,
                    branch,
                    &format!("oid-{}", repository.name()),
                    "2024-02-01T00:00:00Z",
                ))
            });

        let repos = repositories(2);
        let result = BatchOrchestrator::new(&gateway)
            .run(&repos, &actor(), window(), &crate::github::progress::NoopProgressSink)
            .await;

        assert_eq!(result.default_branch.len(), 1);
        assert_eq!(result.other_branches.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn final_partitions_sort_descending_across_batches() {
        let dates = [
            "2024-01-05T00:00:00Z",
            "2024-03-05T00:00:00Z",
            "2024-02-05T00:00:00Z",
            "2024-04-05T00:00:00Z",
        ];
        let mut gateway = MockCommitGateway::new();
        gateway
            .expect_repository_commits()
            .returning(move |repository, _, _| {
                let index: usize = repository
                    .name()
                    .trim_start_matches("repo-")
                    .parse()
                    .expect("fixture name should carry an index");
                let date = *dates.get(index).expect("fixture date should exist");
                Ok(single_branch_page(
                    repository,
                    "main",
                    &format!("oid-{index}"),
                    date,
                ))
            });

        let repos = repositories(4);
        let result = BatchOrchestrator::new(&gateway)
            .run(&repos, &actor(), window(), &crate::github::progress::NoopProgressSink)
            .await;

        let dates_sorted: Vec<_> = result
            .default_branch
            .iter()
            .map(|commit| commit.committed_date)
            .collect();
        let mut expected = dates_sorted.clone();
        expected.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates_sorted, expected);
        assert_eq!(result.default_branch.len(), 4);
    }
}
