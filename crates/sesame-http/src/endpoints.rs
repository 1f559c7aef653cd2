//! Identity API endpoint definitions and request/response types.
//!
//! The wire uses the backend's mixed key convention: token fields are
//! camelCase (`refreshToken`, `newPassword`), the rest snake_case.

use std::fmt;

use serde::{Deserialize, Serialize};

use sesame_core::{AccessToken, RefreshToken, SessionGrant, User};

// ============================================================================
// Endpoint Paths
// ============================================================================

/// POST /auth/login
pub const LOGIN: &str = "/auth/login";

/// GET /auth/me
pub const ME: &str = "/auth/me";

/// POST /auth/logout
pub const LOGOUT: &str = "/auth/logout";

/// POST /auth/refresh-token
pub const REFRESH_TOKEN: &str = "/auth/refresh-token";

/// POST /auth/request-password-reset
pub const REQUEST_PASSWORD_RESET: &str = "/auth/request-password-reset";

/// POST /auth/reset-password
pub const RESET_PASSWORD: &str = "/auth/reset-password";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for login.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub remember_me: bool,
}

// Intentionally hide the password in Debug output
impl fmt::Debug for LoginRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("remember_me", &self.remember_me)
            .finish()
    }
}

/// Response from login and refresh: the token grant plus the basic user.
#[derive(Debug, Deserialize)]
pub struct GrantResponse {
    pub token: AccessToken,
    #[serde(rename = "refreshToken")]
    pub refresh_token: RefreshToken,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

impl GrantResponse {
    pub fn into_grant(self) -> SessionGrant {
        SessionGrant {
            access_token: self.token,
            refresh_token: self.refresh_token,
            token_type: self.token_type,
            expires_in: self.expires_in,
            user: self.user,
        }
    }
}

/// Request body for refresh-token.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    #[serde(rename = "refreshToken")]
    pub refresh_token: &'a RefreshToken,
}

/// Request body for logout. Serializes as an empty object.
#[derive(Debug, Serialize)]
pub struct LogoutRequest {}

/// Request body for request-password-reset.
#[derive(Debug, Serialize)]
pub struct RequestPasswordResetRequest<'a> {
    pub email: &'a str,
}

/// Request body for reset-password.
#[derive(Serialize)]
pub struct ResetPasswordRequest<'a> {
    pub token: &'a str,
    #[serde(rename = "newPassword")]
    pub new_password: &'a str,
}

// Intentionally hide the new password in Debug output
impl fmt::Debug for ResetPasswordRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetPasswordRequest")
            .field("token", &self.token)
            .field("new_password", &"[REDACTED]")
            .finish()
    }
}

/// Identity API error response format.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(alias = "error")]
    pub code: Option<String>,
    pub message: Option<String>,
}
