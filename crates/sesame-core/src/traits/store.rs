//! Credential persistence trait.

use async_trait::async_trait;

use crate::Result;
use crate::session::Session;
use crate::user::User;

/// A persisted session together with the user it was granted to.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAuth {
    /// The persisted token bundle.
    pub session: Session,
    /// The basic user recorded at grant time.
    pub user: User,
}

/// Persistence for the session and its user.
///
/// The session manager is the sole writer; every other component reads
/// through the manager's snapshots and must never touch the store.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist the session and user, replacing any previous state.
    async fn save(&self, session: &Session, user: &User) -> Result<()>;

    /// Load the persisted session, if any.
    async fn load(&self) -> Result<Option<StoredAuth>>;

    /// Remove all persisted state. Idempotent.
    async fn clear(&self) -> Result<()>;
}
