//! Issue and pull request aggregation over the search endpoint.
//!
//! One search query per run, shaped by the actor kind, paginated while pages
//! come back full. The search API mixes issues and pull requests in one
//! response, so each item's kind is derived from an ordered list of
//! predicates, and its repository is recovered through an ordered fallback
//! chain that bottoms out at the literal `unknown`.

use std::sync::LazyLock;

use regex::Regex;

use super::error::ActivityError;
use super::gateway::{IssueSearchItem, SearchGateway};
use super::models::{IssueOrPrRecord, IssueRepository, ItemKind};
use super::progress::{ProgressEvent, ProgressSink};
use super::window::{Actor, TimeWindow};

/// Page cap of the search endpoint; a short page ends the walk.
pub const SEARCH_PAGE_SIZE: usize = 100;

/// Placeholder repository name when every fallback tier fails.
pub const UNKNOWN_REPOSITORY: &str = "unknown";

const REPOS_API_PREFIX: &str = "https://api.github.com/repos/";

static REPO_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::expect_used, reason = "the pattern is a checked literal")]
    let pattern = Regex::new(r"https://api\.github\.com/repos/([^/]+/[^/]+)")
        .expect("repository URL pattern should compile");
    pattern
});

/// Collects issues and pull requests for one actor within a window.
pub struct IssueAggregator<'gateway, Gateway>
where
    Gateway: SearchGateway + ?Sized,
{
    gateway: &'gateway Gateway,
}

impl<'gateway, Gateway> IssueAggregator<'gateway, Gateway>
where
    Gateway: SearchGateway + ?Sized,
{
    /// Creates an aggregator over the given gateway.
    #[must_use]
    pub const fn new(gateway: &'gateway Gateway) -> Self {
        Self { gateway }
    }

    /// Collects every in-window issue and pull request for the actor.
    ///
    /// Organizations search by `updated` over the whole org; users search by
    /// `created` over their authored items.
    ///
    /// # Errors
    ///
    /// Propagates the first search page failure.
    pub async fn collect(
        &self,
        actor: &Actor,
        window: TimeWindow,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<IssueOrPrRecord>, ActivityError> {
        let range = window.search_range();
        let (query, sort) = if actor.is_organization() {
            (format!("org:{} updated:{range}", actor.name()), "updated")
        } else {
            (format!("author:{} created:{range}", actor.name()), "created")
        };

        let mut records = Vec::new();
        let mut page = 1_u32;
        loop {
            let items = self.gateway.issue_search_page(&query, sort, page).await?;
            let page_len = items.len();
            records.extend(items.into_iter().map(normalise_item));
            progress.record(ProgressEvent::IssuesFetched {
                count: records.len(),
            });

            if page_len < SEARCH_PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(records)
    }
}

fn normalise_item(item: IssueSearchItem) -> IssueOrPrRecord {
    let kind = classify(&item);
    let repository = repository_name(&item);

    IssueOrPrRecord {
        id: item.id,
        title: item.title,
        number: item.number,
        state: item.state,
        created_at: item.created_at,
        updated_at: item.updated_at,
        url: item.html_url.unwrap_or_default(),
        repository: IssueRepository {
            name_with_owner: repository,
        },
        kind,
    }
}

/// Derives the item kind from an ordered list of predicates; the first
/// matching test wins, and no match means `issue`.
fn classify(item: &IssueSearchItem) -> ItemKind {
    if item.pull_request.is_some() {
        return ItemKind::Pr;
    }
    if item
        .url
        .as_deref()
        .is_some_and(|url| url.contains("/pulls/"))
    {
        return ItemKind::Pr;
    }
    if item
        .html_url
        .as_deref()
        .is_some_and(|url| url.contains("/pull/"))
    {
        return ItemKind::Pr;
    }
    ItemKind::Issue
}

/// Recovers the owner-qualified repository name through the ordered fallback
/// chain: explicit repository object, then the repository API URL, then a
/// pattern match on the item's own API URL, then the `unknown` placeholder.
fn repository_name(item: &IssueSearchItem) -> String {
    if let Some(repository) = &item.repository {
        return repository.full_name.clone();
    }

    if let Some(stripped) = item
        .repository_url
        .as_deref()
        .and_then(|url| url.strip_prefix(REPOS_API_PREFIX))
    {
        return stripped.to_owned();
    }

    if let Some(captured) = item
        .url
        .as_deref()
        .and_then(|url| REPO_URL_PATTERN.captures(url))
        .and_then(|captures| captures.get(1))
    {
        return captured.as_str().to_owned();
    }

    UNKNOWN_REPOSITORY.to_owned()
}
