//! sesame-core - Core session and permission types for the sesame toolkit.

pub mod api_url;
pub mod credentials;
pub mod error;
pub mod permissions;
pub mod session;
pub mod tokens;
pub mod traits;
pub mod user;

pub use api_url::ApiUrl;
pub use credentials::Credentials;
pub use error::Error;
pub use permissions::PermissionSet;
pub use session::{Session, SessionGrant};
pub use tokens::{AccessToken, RefreshToken};
pub use traits::{CredentialStore, IdentityApi, StoredAuth};
pub use user::{Account, User, UserProfile};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
