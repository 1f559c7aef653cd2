//! Login credentials type.

use std::fmt;

/// Login credentials for the identity API.
///
/// This type holds the username and password required to authenticate,
/// plus the remember flag that selects the storage scope for the
/// resulting session (durable when set, process-scoped otherwise).
///
/// # Security
///
/// The password is never exposed in Debug output to prevent accidental
/// logging. Credentials are transient and never persisted.
///
/// # Example
///
/// ```
/// use sesame_core::Credentials;
///
/// let creds = Credentials::new("msato", "hunter2").with_remember(true);
/// assert_eq!(creds.username(), "msato");
/// assert!(creds.remember());
/// ```
pub struct Credentials {
    username: String,
    password: String,
    remember: bool,
}

impl Credentials {
    /// Create new credentials with the remember flag unset.
    ///
    /// # Arguments
    ///
    /// * `username` - The account username
    /// * `password` - The account password
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            remember: false,
        }
    }

    /// Set the remember flag, requesting a durable session.
    pub fn with_remember(mut self, remember: bool) -> Self {
        self.remember = remember;
        self
    }

    /// Returns the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    ///
    /// # Security
    ///
    /// Use this only when constructing the login request.
    /// Never log or display this value.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns true if the resulting session should be persisted durably.
    pub fn remember(&self) -> bool {
        self.remember
    }
}

// Intentionally hide password in Debug output
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("remember", &self.remember)
            .finish()
    }
}

// Clone is intentionally derived to allow credentials to be reused,
// but the type is not Copy to make credential passing explicit.
impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            username: self.username.clone(),
            password: self.password.clone(),
            remember: self.remember,
        }
    }
}
