//! Issue search endpoint backing the issue/PR aggregation pass.

use async_trait::async_trait;
use serde::Deserialize;

use crate::github::error::ActivityError;

use super::SearchGateway;
use super::client::OctocrabActivityGateway;
use super::error_mapping::map_octocrab_error_with_rate_limit;
use super::paging::MAX_PER_PAGE;
use super::types::IssueSearchItem;

#[derive(Debug, Clone, Deserialize)]
struct ApiIssueSearchPage {
    #[serde(default)]
    items: Vec<IssueSearchItem>,
}

#[async_trait]
impl SearchGateway for OctocrabActivityGateway {
    async fn issue_search_page(
        &self,
        query: &str,
        sort: &str,
        page: u32,
    ) -> Result<Vec<IssueSearchItem>, ActivityError> {
        let page_str = page.to_string();
        let per_page_str = MAX_PER_PAGE.to_string();
        let params = [
            ("q", query),
            ("sort", sort),
            ("order", "desc"),
            ("per_page", per_page_str.as_str()),
            ("page", page_str.as_str()),
        ];

        let response: ApiIssueSearchPage =
            match self.client().get("/search/issues", Some(&params)).await {
                Ok(response) => response,
                Err(error) => {
                    return Err(map_octocrab_error_with_rate_limit(
                        self.client(),
                        "search issues",
                        &error,
                    )
                    .await);
                }
            };

        Ok(response.items)
    }
}
