//! Validated identity and time-window value types for an aggregation run.
//!
//! An aggregation run is parameterised by one [`Actor`] (the user or
//! organization being analysed) and one [`TimeWindow`]. Both are validated at
//! construction so the pipeline never carries a blank actor or an inverted
//! window.

use chrono::{DateTime, Utc};

use super::error::ActivityError;

/// Whether the actor is a user account or an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
    /// Individual user account; commit acceptance requires an author match.
    User,
    /// Organization account; commits by any contributor are accepted.
    Organization,
}

/// The account whose activity is being aggregated.
///
/// Resolved once per run and immutable for its duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    name: String,
    kind: ActorKind,
}

impl Actor {
    /// Validates that the actor name is non-blank and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::MissingActor`] when the name is blank.
    pub fn new(name: impl AsRef<str>, kind: ActorKind) -> Result<Self, ActivityError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ActivityError::MissingActor);
        }
        Ok(Self {
            name: trimmed.to_owned(),
            kind,
        })
    }

    /// Borrow the actor name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the actor kind.
    #[must_use]
    pub const fn kind(&self) -> ActorKind {
        self.kind
    }

    /// Returns true for organization actors.
    #[must_use]
    pub const fn is_organization(&self) -> bool {
        matches!(self.kind, ActorKind::Organization)
    }

    /// Case-insensitive comparison of a commit author login against the actor.
    ///
    /// Organization actors match any login, including an absent one; user
    /// actors require a present, case-insensitively equal login.
    #[must_use]
    pub fn matches_login(&self, login: Option<&str>) -> bool {
        match self.kind {
            ActorKind::Organization => true,
            ActorKind::User => login.is_some_and(|value| value.eq_ignore_ascii_case(&self.name)),
        }
    }
}

/// The inclusive time range constraining which records are in scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    from: DateTime<Utc>,
    to: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Creates a window, validating `from <= to` when `to` is present.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::InvalidWindow`] for an inverted range.
    pub fn new(from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> Result<Self, ActivityError> {
        if let Some(end) = to
            && end < from
        {
            return Err(ActivityError::InvalidWindow {
                message: format!("from ({from}) is after to ({end})"),
            });
        }
        Ok(Self { from, to })
    }

    /// Creates an open-ended window starting at `from`.
    #[must_use]
    pub const fn since(from: DateTime<Utc>) -> Self {
        Self { from, to: None }
    }

    /// Returns the window start.
    #[must_use]
    pub const fn from(&self) -> DateTime<Utc> {
        self.from
    }

    /// Returns the window end, if bounded.
    #[must_use]
    pub const fn to(&self) -> Option<DateTime<Utc>> {
        self.to
    }

    /// Returns true when the timestamp lies inside the window (inclusive).
    #[must_use]
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.from && self.to.is_none_or(|end| timestamp <= end)
    }

    /// Renders the window start as a second-precision Git timestamp.
    #[must_use]
    pub fn git_since(&self) -> String {
        git_timestamp(self.from)
    }

    /// Renders the window end as a second-precision Git timestamp, if bounded.
    #[must_use]
    pub fn git_until(&self) -> Option<String> {
        self.to.map(git_timestamp)
    }

    /// Renders the window as a search-qualifier date range.
    ///
    /// Produces `<from>..<to>` for a bounded window and `>=<from>` for an
    /// open-ended one, using date-only precision as the search API expects.
    #[must_use]
    pub fn search_range(&self) -> String {
        let from_date = self.from.format("%Y-%m-%d");
        self.to.map_or_else(
            || format!(">={from_date}"),
            |end| format!("{from_date}..{}", end.format("%Y-%m-%d")),
        )
    }
}

/// Second-precision RFC 3339 rendering with a `Z` suffix, as the GraphQL
/// `GitTimestamp` scalar expects.
fn git_timestamp(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parses an RFC 3339 timestamp into UTC.
///
/// # Errors
///
/// Returns [`ActivityError::InvalidTimestamp`] when the value does not parse.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ActivityError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| ActivityError::InvalidTimestamp {
            value: value.to_owned(),
        })
}
