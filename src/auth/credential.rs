//! Credential and connect-URL values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

/// Bearer credential for one caller.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default)]
    pub scopes: BTreeSet<String>,
    /// Absent when the broker does not know the expiry.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            scopes: BTreeSet::new(),
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// True when the token expires within `skew` of `now`. Unknown expiry is
    /// never considered expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let skew = chrono::Duration::from_std(skew).unwrap_or(chrono::Duration::zero());
                // Underflow means the deadline is before any representable instant
                expires_at
                    .checked_sub_signed(skew)
                    .map_or(true, |deadline| deadline <= now)
            }
            None => false,
        }
    }

    /// Whether the credential grants `scope`. An empty scope set means the
    /// broker did not report scopes, which is treated as "unknown, allow".
    pub fn covers(&self, scope: &str) -> bool {
        self.scopes.is_empty()
            || self.scopes.contains(scope)
            || self.scopes.contains(crate::tools::SCOPE_CALENDAR)
    }

    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("scopes", &self.scopes)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// One-time link a human opens to grant calendar access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectUrl(String);

impl ConnectUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
