//! Page-draining helper shared by the REST gateway implementations.
//!
//! GitHub's page-numbered endpoints signal exhaustion by returning a page
//! shorter than the requested size. [`drain_pages`] encodes that contract
//! once: callers supply a page fetcher and receive the concatenated items.
//! Retry policy stays with the caller; this layer reports the first failure.

use std::future::Future;

use crate::github::error::ActivityError;

/// Upper bound the API accepts for `per_page`.
pub(super) const MAX_PER_PAGE: u8 = 100;

/// Validates a `per_page` value against the API's accepted range.
pub(super) fn validate_per_page(per_page: u8) -> Result<(), ActivityError> {
    if per_page == 0 {
        return Err(ActivityError::InvalidPagination {
            message: "per_page must be at least 1".to_owned(),
        });
    }

    if per_page > MAX_PER_PAGE {
        return Err(ActivityError::InvalidPagination {
            message: format!("per_page must not exceed {MAX_PER_PAGE}"),
        });
    }

    Ok(())
}

/// Fetches numbered pages starting at 1 until a page comes back shorter than
/// `per_page`, returning every item in order.
pub(super) async fn drain_pages<T, F, Fut>(
    per_page: u8,
    mut fetch_page: F,
) -> Result<Vec<T>, ActivityError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, ActivityError>>,
{
    validate_per_page(per_page)?;

    let mut items = Vec::new();
    let mut page = 1_u32;
    loop {
        let batch = fetch_page(page).await?;
        let batch_len = batch.len();
        items.extend(batch);
        if batch_len < usize::from(per_page) {
            return Ok(items);
        }
        page += 1;
    }
}
