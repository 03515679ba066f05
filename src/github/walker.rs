//! Commit history walker for a single repository.
//!
//! Walks every branch of one repository through the batched commit query,
//! draining both cursor levels: the branch list via the batched query's
//! cursor, and any branch with more in-window history via the focused
//! per-branch query. Commits that pass the author and window filters come
//! back tagged with the repository display name and the branch they were
//! found under.

use super::error::ActivityError;
use super::gateway::{CommitGateway, CommitNode, RepositoryCommitsPage};
use super::models::{CommitAuthor, CommitRecord, CommitRepository, CommitUser, RepositoryRef};
use super::window::{Actor, TimeWindow};

/// All accepted commits of one repository, with the default branch name the
/// orchestrator needs for partitioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryCommits {
    /// Default branch name at fetch time.
    pub default_branch: String,
    /// Accepted commits across every branch, in fetch order.
    pub commits: Vec<CommitRecord>,
}

/// Walks one repository's branches and commit history within a window.
pub struct CommitWalker<'gateway, Gateway>
where
    Gateway: CommitGateway + ?Sized,
{
    gateway: &'gateway Gateway,
}

impl<'gateway, Gateway> CommitWalker<'gateway, Gateway>
where
    Gateway: CommitGateway + ?Sized,
{
    /// Creates a walker over the given gateway.
    #[must_use]
    pub const fn new(gateway: &'gateway Gateway) -> Self {
        Self { gateway }
    }

    /// Fetches every accepted in-window commit of the repository.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures; callers isolate them per repository.
    pub async fn fetch(
        &self,
        repository: &RepositoryRef,
        actor: &Actor,
        window: TimeWindow,
    ) -> Result<RepositoryCommits, ActivityError> {
        let mut branch_cursor: Option<String> = None;
        let mut default_branch = String::new();
        let mut commits = Vec::new();

        loop {
            let page = self
                .gateway
                .repository_commits(repository, window, branch_cursor.take())
                .await?;
            let RepositoryCommitsPage {
                name,
                name_with_owner,
                default_branch: page_default_branch,
                branches,
                next_branch_cursor,
            } = page;
            default_branch = page_default_branch;

            for branch in branches {
                collect_accepted(
                    &mut commits,
                    branch.commits,
                    actor,
                    window,
                    &name,
                    &name_with_owner,
                    &branch.name,
                );

                let mut commit_cursor = branch.next_commit_cursor;
                while let Some(cursor) = commit_cursor {
                    let history = self
                        .gateway
                        .branch_history(repository, &branch.name, window, cursor)
                        .await?;
                    collect_accepted(
                        &mut commits,
                        history.commits,
                        actor,
                        window,
                        &name,
                        &name_with_owner,
                        &branch.name,
                    );
                    commit_cursor = history.next_commit_cursor;
                }
            }

            match next_branch_cursor {
                Some(cursor) => branch_cursor = Some(cursor),
                None => break,
            }
        }

        Ok(RepositoryCommits {
            default_branch,
            commits,
        })
    }
}

fn collect_accepted(
    commits: &mut Vec<CommitRecord>,
    nodes: Vec<CommitNode>,
    actor: &Actor,
    window: TimeWindow,
    repository_name: &str,
    name_with_owner: &str,
    branch: &str,
) {
    commits.extend(
        nodes
            .into_iter()
            .filter(|node| window.contains(node.committed_date))
            .filter(|node| actor.matches_login(node.author_login()))
            .map(|node| into_record(node, repository_name, name_with_owner, branch)),
    );
}

fn into_record(
    node: CommitNode,
    repository_name: &str,
    name_with_owner: &str,
    branch: &str,
) -> CommitRecord {
    CommitRecord {
        message_headline: node.message_headline,
        oid: node.oid,
        committed_date: node.committed_date,
        url: node.url,
        additions: node.additions,
        deletions: node.deletions,
        author: CommitAuthor {
            user: node.author.user.map(|user| CommitUser { login: user.login }),
        },
        repository: CommitRepository {
            name: repository_name.to_owned(),
            name_with_owner: name_with_owner.to_owned(),
        },
        branch: branch.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use crate::github::gateway::{
        BranchCommits, CommitHistoryPage, CommitNode, MockCommitGateway, RepositoryCommitsPage,
    };
    use crate::github::models::RepositoryRef;
    use crate::github::window::{Actor, ActorKind, TimeWindow, parse_timestamp};

    use super::CommitWalker;

    fn window() -> TimeWindow {
        TimeWindow::new(
            parse_timestamp("2024-01-01T00:00:00Z").expect("from should parse"),
            Some(parse_timestamp("2024-12-31T00:00:00Z").expect("to should parse")),
        )
        .expect("window should be valid")
    }

    fn node(oid: &str, login: Option<&str>, date: &str) -> CommitNode {
        serde_json::from_value(serde_json::json!({
            "messageHeadline": format!("commit {oid}"),
            "oid": oid,
            "committedDate": date,
            "url": format!("https://github.com/octocat/hello-world/commit/{oid}"),
            "additions": 1,
            "deletions": 0,
            "author": { "user": login.map(|value| serde_json::json!({ "login": value })) }
        }))
        .expect("node fixture should deserialise")
    }

    fn page(
        branches: Vec<BranchCommits>,
        next_branch_cursor: Option<&str>,
    ) -> RepositoryCommitsPage {
        RepositoryCommitsPage {
            name: "hello-world".to_owned(),
            name_with_owner: "octocat/hello-world".to_owned(),
            default_branch: "main".to_owned(),
            branches,
            next_branch_cursor: next_branch_cursor.map(ToOwned::to_owned),
        }
    }

    fn branch(name: &str, commits: Vec<CommitNode>, cursor: Option<&str>) -> BranchCommits {
        BranchCommits {
            name: name.to_owned(),
            commits,
            next_commit_cursor: cursor.map(ToOwned::to_owned),
        }
    }

    fn repository() -> RepositoryRef {
        RepositoryRef::new("octocat/hello-world").expect("reference should be valid")
    }

    #[tokio::test]
    async fn user_actor_keeps_only_case_insensitive_author_matches() {
        let mut gateway = MockCommitGateway::new();
        gateway.expect_repository_commits().returning(|_, _, _| {
            Ok(page(
                vec![branch(
                    "main",
                    vec![
                        node("aaa", Some("OctoCat"), "2024-02-01T00:00:00Z"),
                        node("bbb", Some("hubber"), "2024-02-02T00:00:00Z"),
                        node("ccc", None, "2024-02-03T00:00:00Z"),
                    ],
                    None,
                )],
                None,
            ))
        });

        let actor = Actor::new("octocat", ActorKind::User).expect("actor should be valid");
        let result = CommitWalker::new(&gateway)
            .fetch(&repository(), &actor, window())
            .await
            .expect("walk should succeed");

        let oids: Vec<&str> = result.commits.iter().map(|c| c.oid.as_str()).collect();
        assert_eq!(oids, vec!["aaa"]);
        assert_eq!(result.default_branch, "main");
    }

    #[tokio::test]
    async fn organization_actor_accepts_unattributed_commits() {
        let mut gateway = MockCommitGateway::new();
        gateway.expect_repository_commits().returning(|_, _, _| {
            Ok(page(
                vec![branch(
                    "main",
                    vec![
                        node("aaa", Some("anyone"), "2024-02-01T00:00:00Z"),
                        node("bbb", None, "2024-02-02T00:00:00Z"),
                    ],
                    None,
                )],
                None,
            ))
        });

        let actor = Actor::new("octo-org", ActorKind::Organization).expect("actor should be valid");
        let result = CommitWalker::new(&gateway)
            .fetch(&repository(), &actor, window())
            .await
            .expect("walk should succeed");

        assert_eq!(result.commits.len(), 2);
    }

    #[tokio::test]
    async fn walker_drops_commits_outside_the_window() {
        let mut gateway = MockCommitGateway::new();
        gateway.expect_repository_commits().returning(|_, _, _| {
            Ok(page(
                vec![branch(
                    "main",
                    vec![
                        node("early", Some("octocat"), "2023-12-31T23:59:59Z"),
                        node("inside", Some("octocat"), "2024-06-01T00:00:00Z"),
                    ],
                    None,
                )],
                None,
            ))
        });

        let actor = Actor::new("octocat", ActorKind::User).expect("actor should be valid");
        let result = CommitWalker::new(&gateway)
            .fetch(&repository(), &actor, window())
            .await
            .expect("walk should succeed");

        let oids: Vec<&str> = result.commits.iter().map(|c| c.oid.as_str()).collect();
        assert_eq!(oids, vec!["inside"]);
    }

    #[tokio::test]
    async fn walker_drains_both_cursor_levels() {
        let mut gateway = MockCommitGateway::new();
        gateway
            .expect_repository_commits()
            .with(
                eq(repository()),
                mockall::predicate::always(),
                eq(None::<String>),
            )
            .returning(|_, _, _| {
                Ok(page(
                    vec![branch(
                        "main",
                        vec![node("aaa", Some("octocat"), "2024-02-01T00:00:00Z")],
                        Some("history-1"),
                    )],
                    Some("branches-1"),
                ))
            });
        gateway
            .expect_repository_commits()
            .with(
                eq(repository()),
                mockall::predicate::always(),
                eq(Some("branches-1".to_owned())),
            )
            .returning(|_, _, _| {
                Ok(page(
                    vec![branch(
                        "feature",
                        vec![node("ddd", Some("octocat"), "2024-02-04T00:00:00Z")],
                        None,
                    )],
                    None,
                ))
            });
        gateway
            .expect_branch_history()
            .with(
                eq(repository()),
                eq("main"),
                mockall::predicate::always(),
                eq("history-1".to_owned()),
            )
            .returning(|_, _, _, _| {
                Ok(CommitHistoryPage {
                    commits: vec![node("bbb", Some("octocat"), "2024-02-02T00:00:00Z")],
                    next_commit_cursor: Some("history-2".to_owned()),
                })
            });
        gateway
            .expect_branch_history()
            .with(
                eq(repository()),
                eq("main"),
                mockall::predicate::always(),
                eq("history-2".to_owned()),
            )
            .returning(|_, _, _, _| {
                Ok(CommitHistoryPage {
                    commits: vec![node("ccc", Some("octocat"), "2024-02-03T00:00:00Z")],
                    next_commit_cursor: None,
                })
            });

        let actor = Actor::new("octocat", ActorKind::User).expect("actor should be valid");
        let result = CommitWalker::new(&gateway)
            .fetch(&repository(), &actor, window())
            .await
            .expect("walk should succeed");

        let tagged: Vec<(&str, &str)> = result
            .commits
            .iter()
            .map(|c| (c.oid.as_str(), c.branch.as_str()))
            .collect();
        assert_eq!(
            tagged,
            vec![
                ("aaa", "main"),
                ("bbb", "main"),
                ("ccc", "main"),
                ("ddd", "feature"),
            ]
        );
    }
}
