//! Process-lifetime in-memory credential scope.

use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use sesame_core::{CredentialStore, Result, Session, StoredAuth, User};

/// The transient credential scope: state lives for the process only.
///
/// This is the non-remembered counterpart of
/// [`FileStore`](crate::FileStore); a restart starts anonymous.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<Option<StoredAuth>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn save(&self, session: &Session, user: &User) -> Result<()> {
        debug!("Storing session in memory");
        let mut state = self.state.write().unwrap();
        *state = Some(StoredAuth {
            session: session.clone(),
            user: user.clone(),
        });
        Ok(())
    }

    async fn load(&self) -> Result<Option<StoredAuth>> {
        let state = self.state.read().unwrap();
        Ok(state.clone())
    }

    async fn clear(&self) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.take().is_some() {
            debug!("Cleared in-memory session");
        }
        Ok(())
    }
}
