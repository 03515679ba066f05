//! Octocrab client construction for the activity gateway.

use http::Uri;
use octocrab::Octocrab;

use crate::github::error::ActivityError;

use super::error_mapping::map_octocrab_error;

/// Personal access token wrapper enforcing presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::MissingToken`] when the supplied string is
    /// blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, ActivityError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ActivityError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// Octocrab-backed implementation of the activity gateway traits.
pub struct OctocrabActivityGateway {
    client: Octocrab,
}

impl OctocrabActivityGateway {
    /// Creates a gateway from an existing Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds an authenticated gateway against the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::Configuration`] when the base URI cannot be
    /// parsed or [`ActivityError::Api`] when Octocrab fails to construct a
    /// client.
    pub fn for_token(token: &PersonalAccessToken, api_base: &str) -> Result<Self, ActivityError> {
        let base_uri: Uri = api_base
            .parse::<Uri>()
            .map_err(|error| ActivityError::Configuration {
                message: format!("invalid GitHub API base URL: {error}"),
            })?;

        let client = Octocrab::builder()
            .personal_token(token.as_ref())
            .base_uri(base_uri)
            .map_err(|error| ActivityError::Api {
                status: None,
                message: format!("build client failed: {error}"),
            })?
            .build()
            .map_err(|error| map_octocrab_error("build client", &error))?;

        Ok(Self::new(client))
    }

    /// Borrow the underlying Octocrab client.
    pub(super) const fn client(&self) -> &Octocrab {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::PersonalAccessToken;
    use crate::github::error::ActivityError;

    #[test]
    fn token_rejects_blank_values() {
        let error = PersonalAccessToken::new(" \t").expect_err("blank token should fail");
        assert_eq!(error, ActivityError::MissingToken);
    }

    #[test]
    fn token_trims_whitespace() {
        let token = PersonalAccessToken::new(" ghp_example ").expect("token should be valid");
        assert_eq!(token.value(), "ghp_example");
    }
}
