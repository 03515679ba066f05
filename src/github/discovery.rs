//! Repository discovery: which repositories saw activity in the window.
//!
//! The organization path walks the org's repository listing page by page.
//! The user path merges three overlapping sources: the public event feed,
//! the account's repository listing, and an author commit search. Sources
//! overlap deliberately; the result is a deduplicated set.

use std::collections::BTreeSet;

use tracing::warn;

use super::error::ActivityError;
use super::gateway::DiscoveryGateway;
use super::models::RepositoryRef;
use super::progress::{ProgressEvent, ProgressSink};
use super::window::{Actor, TimeWindow};

/// Discovers the set of repositories to walk for one aggregation run.
pub struct RepositoryDiscovery<'gateway, Gateway>
where
    Gateway: DiscoveryGateway + ?Sized,
{
    gateway: &'gateway Gateway,
}

impl<'gateway, Gateway> RepositoryDiscovery<'gateway, Gateway>
where
    Gateway: DiscoveryGateway + ?Sized,
{
    /// Creates a discovery facade over the given gateway.
    #[must_use]
    pub const fn new(gateway: &'gateway Gateway) -> Self {
        Self { gateway }
    }

    /// Resolves the repository set for the actor within the window.
    ///
    /// The progress sink receives the running size of the set as it grows.
    ///
    /// # Errors
    ///
    /// Fails only when the mandatory primary source fails: the repository
    /// listing for organizations, the public event feed for users. The
    /// user-path listing and commit-search sources are isolated; their
    /// failures are logged and skipped.
    pub async fn discover(
        &self,
        actor: &Actor,
        window: TimeWindow,
        progress: &dyn ProgressSink,
    ) -> Result<BTreeSet<RepositoryRef>, ActivityError> {
        if actor.is_organization() {
            self.discover_organization(actor, window, progress).await
        } else {
            self.discover_user(actor, window, progress).await
        }
    }

    async fn discover_organization(
        &self,
        actor: &Actor,
        window: TimeWindow,
        progress: &dyn ProgressSink,
    ) -> Result<BTreeSet<RepositoryRef>, ActivityError> {
        let mut found = BTreeSet::new();
        let mut page = 1_u32;
        loop {
            let listing = self
                .gateway
                .organization_repository_page(actor.name(), page)
                .await?;
            if listing.is_empty() {
                break;
            }

            // The listing is sorted by push time descending, but push
            // timestamps from this endpoint are noisy; keep paginating until
            // the listing is exhausted rather than stopping at the first
            // page that looks entirely stale.
            for repository in &listing {
                if pushed_in_window(repository.pushed_at, window) {
                    insert_reference(&mut found, &repository.full_name, progress);
                }
            }

            page += 1;
        }

        Ok(found)
    }

    async fn discover_user(
        &self,
        actor: &Actor,
        window: TimeWindow,
        progress: &dyn ProgressSink,
    ) -> Result<BTreeSet<RepositoryRef>, ActivityError> {
        let mut found = BTreeSet::new();

        // The event feed is the mandatory primary source. Events are already
        // recency-bounded by the API, so every referenced repository counts.
        let event_repositories = self
            .gateway
            .public_event_repositories(actor.name())
            .await?;
        for reference in event_repositories {
            insert_found(&mut found, reference, progress);
        }

        match self.gateway.user_repositories(actor.name()).await {
            Ok(listing) => {
                for repository in &listing {
                    if pushed_in_window(repository.pushed_at, window) {
                        insert_reference(&mut found, &repository.full_name, progress);
                    }
                }
            }
            Err(error) => warn!(%error, "user repository listing unavailable, skipping source"),
        }

        match self
            .gateway
            .commit_search_repositories(actor.name(), window)
            .await
        {
            Ok(references) => {
                for reference in references {
                    insert_found(&mut found, reference, progress);
                }
            }
            Err(error) => warn!(%error, "commit search unavailable, skipping source"),
        }

        Ok(found)
    }
}

fn pushed_in_window(pushed_at: Option<chrono::DateTime<chrono::Utc>>, window: TimeWindow) -> bool {
    pushed_at.is_some_and(|timestamp| timestamp >= window.from())
}

fn insert_reference(
    found: &mut BTreeSet<RepositoryRef>,
    full_name: &str,
    progress: &dyn ProgressSink,
) {
    if let Ok(reference) = RepositoryRef::new(full_name) {
        insert_found(found, reference, progress);
    }
}

fn insert_found(
    found: &mut BTreeSet<RepositoryRef>,
    reference: RepositoryRef,
    progress: &dyn ProgressSink,
) {
    if found.insert(reference) {
        progress.record(ProgressEvent::RepositoriesDiscovered { count: found.len() });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::github::error::ActivityError;
    use crate::github::gateway::{MockDiscoveryGateway, RepositoryListing};
    use crate::github::models::RepositoryRef;
    use crate::github::progress::test_support::RecordingSink;
    use crate::github::progress::{NoopProgressSink, ProgressEvent};
    use crate::github::window::{Actor, ActorKind, TimeWindow, parse_timestamp};

    use super::RepositoryDiscovery;

    fn window() -> TimeWindow {
        TimeWindow::since(parse_timestamp("2024-01-01T00:00:00Z").expect("timestamp should parse"))
    }

    fn listing(full_name: &str, pushed_at: &str) -> RepositoryListing {
        RepositoryListing {
            full_name: full_name.to_owned(),
            pushed_at: Some(parse_timestamp(pushed_at).expect("timestamp should parse")),
        }
    }

    fn reference(value: &str) -> RepositoryRef {
        RepositoryRef::new(value).expect("reference should be valid")
    }

    fn names(found: &BTreeSet<RepositoryRef>) -> Vec<&str> {
        found.iter().map(RepositoryRef::name_with_owner).collect()
    }

    #[tokio::test]
    async fn user_discovery_merges_sources_and_filters_stale_listings() {
        let mut gateway = MockDiscoveryGateway::new();
        gateway
            .expect_public_event_repositories()
            .returning(|_| Ok(vec![reference("a/b")]));
        gateway.expect_user_repositories().returning(|_| {
            Ok(vec![
                listing("a/b", "2024-02-01T00:00:00Z"),
                listing("a/c", "2023-06-01T00:00:00Z"),
            ])
        });
        gateway
            .expect_commit_search_repositories()
            .returning(|_, _| Ok(vec![]));

        let actor = Actor::new("someone", ActorKind::User).expect("actor should be valid");
        let found = RepositoryDiscovery::new(&gateway)
            .discover(&actor, window(), &NoopProgressSink)
            .await
            .expect("discovery should succeed");

        assert_eq!(names(&found), vec!["a/b"]);
    }

    #[tokio::test]
    async fn user_discovery_collects_commit_search_contributions() {
        let mut gateway = MockDiscoveryGateway::new();
        gateway
            .expect_public_event_repositories()
            .returning(|_| Ok(vec![reference("a/b")]));
        gateway
            .expect_user_repositories()
            .returning(|_| Ok(vec![]));
        gateway
            .expect_commit_search_repositories()
            .returning(|_, _| Ok(vec![reference("upstream/tool"), reference("a/b")]));

        let actor = Actor::new("someone", ActorKind::User).expect("actor should be valid");
        let found = RepositoryDiscovery::new(&gateway)
            .discover(&actor, window(), &NoopProgressSink)
            .await
            .expect("discovery should succeed");

        assert_eq!(names(&found), vec!["a/b", "upstream/tool"]);
    }

    #[tokio::test]
    async fn user_discovery_survives_secondary_source_failures() {
        let mut gateway = MockDiscoveryGateway::new();
        gateway
            .expect_public_event_repositories()
            .returning(|_| Ok(vec![reference("a/b")]));
        gateway.expect_user_repositories().returning(|_| {
            Err(ActivityError::Api {
                status: Some(500),
                message: "listing broke".to_owned(),
            })
        });
        gateway.expect_commit_search_repositories().returning(|_, _| {
            Err(ActivityError::RateLimitExceeded {
                rate_limit: None,
                message: "search throttled".to_owned(),
            })
        });

        let actor = Actor::new("someone", ActorKind::User).expect("actor should be valid");
        let found = RepositoryDiscovery::new(&gateway)
            .discover(&actor, window(), &NoopProgressSink)
            .await
            .expect("discovery should survive secondary failures");

        assert_eq!(names(&found), vec!["a/b"]);
    }

    #[tokio::test]
    async fn user_discovery_fails_when_event_feed_fails() {
        let mut gateway = MockDiscoveryGateway::new();
        gateway.expect_public_event_repositories().returning(|_| {
            Err(ActivityError::Api {
                status: Some(503),
                message: "events down".to_owned(),
            })
        });

        let actor = Actor::new("someone", ActorKind::User).expect("actor should be valid");
        let error = RepositoryDiscovery::new(&gateway)
            .discover(&actor, window(), &NoopProgressSink)
            .await
            .expect_err("discovery should fail");

        assert!(matches!(error, ActivityError::Api { status: Some(503), .. }));
    }

    #[tokio::test]
    async fn organization_discovery_paginates_to_the_empty_page() {
        let mut gateway = MockDiscoveryGateway::new();
        gateway
            .expect_organization_repository_page()
            .times(3)
            .returning(|_, page| {
                Ok(match page {
                    1 => vec![
                        listing("octo-org/api", "2024-03-01T00:00:00Z"),
                        listing("octo-org/attic", "2022-01-01T00:00:00Z"),
                    ],
                    // A fully-stale page must not stop the walk.
                    2 => vec![listing("octo-org/museum", "2021-01-01T00:00:00Z")],
                    _ => vec![],
                })
            });

        let actor = Actor::new("octo-org", ActorKind::Organization).expect("actor should be valid");
        let found = RepositoryDiscovery::new(&gateway)
            .discover(&actor, window(), &NoopProgressSink)
            .await
            .expect("discovery should succeed");

        assert_eq!(names(&found), vec!["octo-org/api"]);
    }

    #[tokio::test]
    async fn discovery_reports_the_growing_set_size() {
        let mut gateway = MockDiscoveryGateway::new();
        gateway
            .expect_public_event_repositories()
            .returning(|_| Ok(vec![reference("a/b"), reference("a/b"), reference("a/c")]));
        gateway
            .expect_user_repositories()
            .returning(|_| Ok(vec![]));
        gateway
            .expect_commit_search_repositories()
            .returning(|_, _| Ok(vec![]));

        let sink = RecordingSink::default();
        let actor = Actor::new("someone", ActorKind::User).expect("actor should be valid");
        RepositoryDiscovery::new(&gateway)
            .discover(&actor, window(), &sink)
            .await
            .expect("discovery should succeed");

        assert_eq!(
            sink.take(),
            vec![
                ProgressEvent::RepositoriesDiscovered { count: 1 },
                ProgressEvent::RepositoriesDiscovered { count: 2 },
            ]
        );
    }
}
