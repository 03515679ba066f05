//! Error mapping helpers for the Octocrab gateway implementation.

use http::StatusCode;
use octocrab::Octocrab;

use crate::github::error::ActivityError;
use crate::github::rate_limit::RateLimitInfo;

/// Checks if a GitHub error status indicates an authentication failure.
pub(super) const fn is_auth_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Checks if an octocrab error represents a network/transport issue.
pub(super) const fn is_network_error(error: &octocrab::Error) -> bool {
    matches!(
        error,
        octocrab::Error::Http { .. }
            | octocrab::Error::Hyper { .. }
            | octocrab::Error::Service { .. }
    )
}

/// Checks whether the GitHub error represents a rate limit error based on the
/// HTTP status and message / documentation URL content.
pub(super) fn is_rate_limit_error(source: &octocrab::GitHubError) -> bool {
    let is_rate_limit_status = matches!(
        source.status_code,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
    );

    let message_indicates_rate_limit = source.message.to_lowercase().contains("rate limit")
        || source
            .documentation_url
            .as_deref()
            .is_some_and(|url| url.contains("rate-limit"));

    is_rate_limit_status && message_indicates_rate_limit
}

pub(super) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> ActivityError {
    if let octocrab::Error::GitHub { source, .. } = error {
        return if is_auth_failure(source.status_code) {
            ActivityError::Authentication {
                message: format!(
                    "{operation} failed: GitHub returned {status} {message}",
                    status = source.status_code,
                    message = source.message
                ),
            }
        } else {
            ActivityError::Api {
                status: Some(source.status_code.as_u16()),
                message: format!(
                    "{operation} failed with status {status}: {message}",
                    status = source.status_code,
                    message = source.message
                ),
            }
        };
    }

    if is_network_error(error) {
        return ActivityError::Network {
            message: format!("{operation} failed: {error}"),
        };
    }

    ActivityError::Api {
        status: None,
        message: format!("{operation} failed: {error}"),
    }
}

/// Maps an octocrab error, upgrading rate-limit failures with quota details
/// fetched from the `/rate_limit` endpoint.
pub(super) async fn map_octocrab_error_with_rate_limit(
    client: &Octocrab,
    operation: &str,
    error: &octocrab::Error,
) -> ActivityError {
    match error {
        octocrab::Error::GitHub { source, .. } if is_rate_limit_error(source) => {
            let rate_limit = fetch_rate_limit_info(client).await;
            let base_message = format!("{operation} failed: {message}", message = source.message);
            let message = match &rate_limit {
                Some(info) => format!(
                    "{base_message} (resets at {reset})",
                    reset = info.reset_at()
                ),
                None => base_message,
            };

            ActivityError::RateLimitExceeded {
                rate_limit,
                message,
            }
        }
        _ => map_octocrab_error(operation, error),
    }
}

async fn fetch_rate_limit_info(client: &Octocrab) -> Option<RateLimitInfo> {
    let rate = client.ratelimit().get().await.ok()?.rate;
    let Ok(limit) = u32::try_from(rate.limit) else {
        return None;
    };
    let Ok(remaining) = u32::try_from(rate.remaining) else {
        return None;
    };
    Some(RateLimitInfo::new(limit, remaining, rate.reset))
}
