//! Remote identity API trait.

use async_trait::async_trait;

use crate::session::SessionGrant;
use crate::tokens::{AccessToken, RefreshToken};
use crate::user::UserProfile;
use crate::{Credentials, Result};

/// The remote identity API consumed by the session manager.
///
/// Implementations perform the network calls and translate responses into
/// the core types; the manager owns all client-side state.
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// Exchange credentials for a fresh session grant.
    ///
    /// Rejected credentials surface as
    /// [`AuthError::InvalidCredentials`](crate::error::AuthError).
    async fn login(&self, credentials: &Credentials) -> Result<SessionGrant>;

    /// Exchange a refresh token for a fresh session grant.
    ///
    /// A rejected refresh token surfaces as
    /// [`AuthError::TokenExpired`](crate::error::AuthError).
    async fn refresh(&self, refresh_token: &RefreshToken) -> Result<SessionGrant>;

    /// Fetch the extended profile for the authenticated user.
    async fn fetch_profile(&self, token: &AccessToken) -> Result<UserProfile>;

    /// Notify the server of a logout.
    ///
    /// Best-effort: callers log failures and proceed.
    async fn logout(&self, token: &AccessToken) -> Result<()>;

    /// Request a password-reset email for the given address.
    async fn request_password_reset(&self, email: &str) -> Result<()>;

    /// Complete a password reset with the emailed token.
    async fn reset_password(&self, reset_token: &str, new_password: &str) -> Result<()>;
}
