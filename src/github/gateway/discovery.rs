//! REST endpoints backing repository discovery.

use async_trait::async_trait;
use serde::Deserialize;

use crate::github::error::ActivityError;
use crate::github::models::RepositoryRef;
use crate::github::window::TimeWindow;

use super::client::OctocrabActivityGateway;
use super::error_mapping::map_octocrab_error_with_rate_limit;
use super::paging::{MAX_PER_PAGE, drain_pages};
use super::types::{RepositoryListing, SearchRepository};
use super::DiscoveryGateway;

/// One entry of the public event feed; only the repository reference matters.
#[derive(Debug, Clone, Deserialize)]
struct ApiEvent {
    repo: Option<ApiEventRepo>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiEventRepo {
    name: String,
}

/// Envelope of the search endpoints.
#[derive(Debug, Clone, Deserialize)]
struct ApiSearchPage<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

/// One commit search hit; only the owning repository matters.
#[derive(Debug, Clone, Deserialize)]
struct ApiCommitSearchItem {
    repository: Option<SearchRepository>,
}

#[async_trait]
impl DiscoveryGateway for OctocrabActivityGateway {
    async fn public_event_repositories(
        &self,
        actor: &str,
    ) -> Result<Vec<RepositoryRef>, ActivityError> {
        let route = format!("/users/{actor}/events/public");
        let events: Vec<ApiEvent> = match self.client().get(&route, None::<&()>).await {
            Ok(events) => events,
            Err(error) => {
                return Err(map_octocrab_error_with_rate_limit(
                    self.client(),
                    "list public events",
                    &error,
                )
                .await);
            }
        };

        Ok(events
            .into_iter()
            .filter_map(|event| event.repo)
            .filter_map(|repo| RepositoryRef::new(&repo.name).ok())
            .collect())
    }

    async fn user_repositories(
        &self,
        actor: &str,
    ) -> Result<Vec<RepositoryListing>, ActivityError> {
        let route = format!("/users/{actor}/repos");
        let params = [("sort", "pushed"), ("direction", "desc")];
        match self.client().get(&route, Some(&params)).await {
            Ok(listing) => Ok(listing),
            Err(error) => Err(map_octocrab_error_with_rate_limit(
                self.client(),
                "list user repositories",
                &error,
            )
            .await),
        }
    }

    async fn organization_repository_page(
        &self,
        actor: &str,
        page: u32,
    ) -> Result<Vec<RepositoryListing>, ActivityError> {
        let route = format!("/orgs/{actor}/repos");
        let page_str = page.to_string();
        let per_page_str = MAX_PER_PAGE.to_string();
        let params = [
            ("type", "all"),
            ("sort", "pushed"),
            ("direction", "desc"),
            ("per_page", per_page_str.as_str()),
            ("page", page_str.as_str()),
        ];
        match self.client().get(&route, Some(&params)).await {
            Ok(listing) => Ok(listing),
            Err(error) => Err(map_octocrab_error_with_rate_limit(
                self.client(),
                "list organization repositories",
                &error,
            )
            .await),
        }
    }

    async fn commit_search_repositories(
        &self,
        actor: &str,
        window: TimeWindow,
    ) -> Result<Vec<RepositoryRef>, ActivityError> {
        let query = format!(
            "author:{actor} committer-date:>={since}",
            since = window.git_since()
        );
        let items = drain_pages(MAX_PER_PAGE, |page| {
            let search_query = query.as_str();
            async move {
                let page_str = page.to_string();
                let per_page_str = MAX_PER_PAGE.to_string();
                let params = [
                    ("q", search_query),
                    ("sort", "committer-date"),
                    ("order", "desc"),
                    ("per_page", per_page_str.as_str()),
                    ("page", page_str.as_str()),
                ];
                let response: ApiSearchPage<ApiCommitSearchItem> =
                    match self.client().get("/search/commits", Some(&params)).await {
                        Ok(response) => response,
                        Err(error) => {
                            return Err(map_octocrab_error_with_rate_limit(
                                self.client(),
                                "search commits",
                                &error,
                            )
                            .await);
                        }
                    };
                Ok(response.items)
            }
        })
        .await?;

        Ok(items
            .into_iter()
            .filter_map(|item| item.repository)
            .filter_map(|repo| RepositoryRef::new(&repo.full_name).ok())
            .collect())
    }
}
