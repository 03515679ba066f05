//! Error types exposed by the activity aggregation layer.

use thiserror::Error;

use super::rate_limit::RateLimitInfo;

/// Errors surfaced while validating input or communicating with GitHub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActivityError {
    /// A timestamp could not be parsed as RFC 3339.
    #[error("invalid timestamp: {value}")]
    InvalidTimestamp {
        /// The value that failed to parse.
        value: String,
    },

    /// The requested time window is inverted or otherwise unusable.
    #[error("invalid time window: {message}")]
    InvalidWindow {
        /// Description of the violated constraint.
        message: String,
    },

    /// The actor (user or organization) name was blank.
    #[error("actor name is required")]
    MissingActor,

    /// A repository reference did not contain an owner and a name.
    #[error("repository reference is invalid: {value}")]
    InvalidRepository {
        /// The offending `owner/name` candidate.
        value: String,
    },

    /// The authentication token was missing.
    #[error("GitHub token is required")]
    MissingToken,

    /// The authentication token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub returned a non-success API response.
    #[error("GitHub API error: {message}")]
    Api {
        /// HTTP status code when one was received.
        status: Option<u16>,
        /// Response body or error detail from GitHub.
        message: String,
    },

    /// Networking failed while calling an external service.
    #[error("network error: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// A payload did not conform to the expected shape.
    #[error("schema error: {message}")]
    Schema {
        /// Description of the shape mismatch.
        message: String,
    },

    /// Rate limit exceeded - the API returned 403 with a rate limit message.
    #[error("GitHub API rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Rate limit info if available from response headers.
        rate_limit: Option<RateLimitInfo>,
        /// Error message from GitHub.
        message: String,
    },

    /// Invalid pagination parameters.
    #[error("invalid pagination: {message}")]
    InvalidPagination {
        /// Description of the invalid parameter.
        message: String,
    },

    /// Configuration could not be loaded or is incomplete.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// Every configured summary provider failed.
    #[error("summary unavailable: {message}")]
    SummaryUnavailable {
        /// Description of the final failure.
        message: String,
    },
}
