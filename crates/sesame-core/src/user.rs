//! User and profile projections returned by the identity API.

use serde::{Deserialize, Serialize};

use crate::permissions::PermissionSet;

/// The basic user projection issued with a login or refresh grant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned user id.
    pub id: i64,
    /// Login name.
    pub username: String,
    /// Contact address, also the target of password-reset requests.
    pub email: String,
    /// Optional human-readable name.
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    /// Role names. Informational here; permission checks use the flat set.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Permissions granted with the basic projection.
    #[serde(default)]
    pub permissions: PermissionSet,
}

/// The extended profile served by `/auth/me`.
///
/// Carries the authoritative permission set plus server-side settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The user this profile belongs to.
    pub user: User,
    /// The authoritative permission set.
    pub permissions: PermissionSet,
    /// Opaque server-side settings blob.
    #[serde(default)]
    pub settings: serde_json::Value,
}

/// The authenticated account: the basic user plus, once the best-effort
/// profile fetch has succeeded, the extended profile.
///
/// All reads that depend on which projection is fresher go through the
/// accessors here; in particular [`Account::permissions`] is the only
/// place the profile-over-user precedence lives.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    user: User,
    profile: Option<UserProfile>,
}

impl Account {
    /// Create an account from the basic user, with no profile yet.
    pub fn new(user: User) -> Self {
        Self {
            user,
            profile: None,
        }
    }

    /// Attach the extended profile.
    pub fn set_profile(&mut self, profile: UserProfile) {
        self.profile = Some(profile);
    }

    /// Replace the basic user projection, keeping any fetched profile.
    ///
    /// Refresh grants carry a fresh basic projection; the profile stays
    /// authoritative until it is re-fetched.
    pub fn set_user(&mut self, user: User) {
        self.user = user;
    }

    /// Returns the freshest user projection: the profile's when present,
    /// the basic one otherwise.
    pub fn user(&self) -> &User {
        match &self.profile {
            Some(profile) => &profile.user,
            None => &self.user,
        }
    }

    /// Returns the extended profile, if it has been fetched.
    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Returns the effective permission set.
    ///
    /// The profile's set is authoritative whenever a profile is present,
    /// even if it grants less than the basic user's.
    pub fn permissions(&self) -> &PermissionSet {
        match &self.profile {
            Some(profile) => &profile.permissions,
            None => &self.user.permissions,
        }
    }

    /// Returns a name suitable for display, falling back to the username.
    pub fn display_name(&self) -> &str {
        let user = self.user();
        user.display_name.as_deref().unwrap_or(&user.username)
    }
}
