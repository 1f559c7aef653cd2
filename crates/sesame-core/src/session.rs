//! Session data: the token bundle plus expiration bookkeeping.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use crate::tokens::{AccessToken, RefreshToken};
use crate::user::User;

/// What the identity API returns from login and refresh: fresh tokens
/// plus the basic user projection.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    /// The new access token.
    pub access_token: AccessToken,
    /// The new refresh token.
    pub refresh_token: RefreshToken,
    /// Token scheme for the Authorization header (typically `bearer`).
    pub token_type: String,
    /// Seconds until the access token expires, counted from issue.
    pub expires_in: i64,
    /// The basic user projection issued with the grant.
    pub user: User,
}

/// The authenticated client's token bundle.
///
/// A session is created from a [`SessionGrant`] at login, restored from a
/// credential store at startup, and replaced in place on refresh. The
/// absolute expiry is derived once at creation so later checks need no
/// reference to the grant.
///
/// # Thread safety
///
/// Sessions are plain data; the session manager owns the single mutable
/// copy and hands out clones as snapshots.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    access_token: AccessToken,
    refresh_token: RefreshToken,
    token_type: String,
    expires_in: i64,
    expires_at: i64,
    remember: bool,
}

impl Session {
    /// Create a session from a grant, deriving the absolute expiry
    /// (epoch milliseconds) from the current time.
    pub fn from_grant(grant: &SessionGrant, remember: bool) -> Self {
        let expires_at = Utc::now().timestamp_millis() + grant.expires_in * 1000;
        Self {
            access_token: grant.access_token.clone(),
            refresh_token: grant.refresh_token.clone(),
            token_type: grant.token_type.clone(),
            expires_in: grant.expires_in,
            expires_at,
            remember,
        }
    }

    /// Reassemble a session from persisted fields.
    ///
    /// The caller is responsible for supplying the expiry that was derived
    /// when the session was originally created.
    pub fn from_parts(
        access_token: AccessToken,
        refresh_token: RefreshToken,
        token_type: impl Into<String>,
        expires_in: i64,
        expires_at: i64,
        remember: bool,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: token_type.into(),
            expires_in,
            expires_at,
            remember,
        }
    }

    /// Build the successor session after a refresh.
    ///
    /// Tokens and expiry come from the new grant; the storage scope is
    /// inherited unchanged.
    pub fn renewed(&self, grant: &SessionGrant) -> Self {
        Self::from_grant(grant, self.remember)
    }

    /// Returns the access token.
    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    /// Returns the refresh token.
    pub fn refresh_token(&self) -> &RefreshToken {
        &self.refresh_token
    }

    /// Returns the token scheme for the Authorization header.
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Returns the seconds-until-expiry granted at issue time.
    pub fn expires_in(&self) -> i64 {
        self.expires_in
    }

    /// Returns the absolute expiry as epoch milliseconds.
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Returns the absolute expiry as a UTC timestamp, when representable.
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.expires_at).single()
    }

    /// Returns true if the session was persisted to the durable scope.
    pub fn remember(&self) -> bool {
        self.remember
    }

    /// Returns true once the absolute expiry has passed.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() >= self.expires_at
    }

    /// Returns true if the session expires within the given lead window.
    ///
    /// An already-expired session is trivially within every window.
    pub fn expires_within(&self, lead: Duration) -> bool {
        let lead_ms = i64::try_from(lead.as_millis()).unwrap_or(i64::MAX);
        Utc::now().timestamp_millis() + lead_ms >= self.expires_at
    }
}

// Custom Debug impl that hides the token values
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("remember", &self.remember)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
