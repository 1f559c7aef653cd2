//! REST-backed identity API implementation.

use async_trait::async_trait;
use tracing::{debug, instrument};

use sesame_core::error::{AuthError, Error};
use sesame_core::{
    AccessToken, ApiUrl, Credentials, IdentityApi, RefreshToken, Result, SessionGrant, UserProfile,
};

use crate::client::HttpClient;
use crate::endpoints::*;

/// A network-backed identity API over REST/JSON.
#[derive(Debug, Clone)]
pub struct HttpIdentityApi {
    base: ApiUrl,
    client: HttpClient,
}

impl HttpIdentityApi {
    /// Create a new client for the given API base URL.
    pub fn new(base: ApiUrl) -> Self {
        let client = HttpClient::new(base.clone());
        Self { base, client }
    }

    /// Returns the API base URL for this instance.
    pub fn url(&self) -> &ApiUrl {
        &self.base
    }
}

#[async_trait]
impl IdentityApi for HttpIdentityApi {
    #[instrument(skip(self, credentials), fields(base = %self.base))]
    async fn login(&self, credentials: &Credentials) -> Result<SessionGrant> {
        debug!(username = credentials.username(), "Logging in");

        let request = LoginRequest {
            username: credentials.username(),
            password: credentials.password(),
            remember_me: credentials.remember(),
        };

        let response: GrantResponse = match self.client.post(LOGIN, &request).await {
            Ok(response) => response,
            // The backend answers rejected credentials with a spread of
            // 4xx statuses; all of them mean the same thing to the caller.
            Err(Error::Api(err)) if err.is_auth_rejection() => {
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(err) => return Err(err),
        };

        Ok(response.into_grant())
    }

    #[instrument(skip(self, refresh_token), fields(base = %self.base))]
    async fn refresh(&self, refresh_token: &RefreshToken) -> Result<SessionGrant> {
        debug!("Refreshing token");

        let request = RefreshRequest { refresh_token };

        let response: GrantResponse = match self.client.post(REFRESH_TOKEN, &request).await {
            Ok(response) => response,
            Err(Error::Api(err)) if err.is_auth_rejection() => {
                return Err(AuthError::TokenExpired.into());
            }
            Err(err) => return Err(err),
        };

        Ok(response.into_grant())
    }

    #[instrument(skip(self, token), fields(base = %self.base))]
    async fn fetch_profile(&self, token: &AccessToken) -> Result<UserProfile> {
        debug!("Fetching profile");
        self.client.get_authed(ME, token.as_str()).await
    }

    #[instrument(skip(self, token), fields(base = %self.base))]
    async fn logout(&self, token: &AccessToken) -> Result<()> {
        debug!("Notifying server of logout");
        self.client
            .post_authed_no_response(LOGOUT, &LogoutRequest {}, token.as_str())
            .await
    }

    #[instrument(skip(self), fields(base = %self.base))]
    async fn request_password_reset(&self, email: &str) -> Result<()> {
        debug!("Requesting password reset");
        let request = RequestPasswordResetRequest { email };
        self.client
            .post_no_response(REQUEST_PASSWORD_RESET, &request)
            .await
    }

    #[instrument(skip(self, reset_token, new_password), fields(base = %self.base))]
    async fn reset_password(&self, reset_token: &str, new_password: &str) -> Result<()> {
        debug!("Completing password reset");
        let request = ResetPasswordRequest {
            token: reset_token,
            new_password,
        };
        self.client.post_no_response(RESET_PASSWORD, &request).await
    }
}
