//! Scope selection between the durable and transient stores.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use sesame_core::error::StorageError;
use sesame_core::{CredentialStore, Result, Session, StoredAuth, User};

use crate::file::FileStore;
use crate::memory::MemoryStore;

/// Credential store routing between the durable and transient scopes.
///
/// A durable marker file records which scope holds the session and is read
/// before every load. Saving writes the marker and the chosen scope, then
/// clears the other, so at most one scope ever holds a session. A failed
/// save clears everything rather than leave a partially written state
/// behind.
#[derive(Debug)]
pub struct ScopedStore {
    durable: FileStore,
    transient: MemoryStore,
    marker_path: PathBuf,
}

impl ScopedStore {
    /// Create a scoped store rooted at the given directory.
    ///
    /// The durable session document and the remember marker both live
    /// under `root`; the transient scope is in-memory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            durable: FileStore::new(root),
            transient: MemoryStore::new(),
            marker_path: root.join("remember"),
        }
    }

    /// Returns true if the durable scope is the one in use.
    pub fn remembered(&self) -> bool {
        self.marker_path.exists()
    }

    fn set_marker(&self, remembered: bool) -> std::result::Result<(), StorageError> {
        if remembered {
            if let Some(parent) = self.marker_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&self.marker_path, b"1")?;
        } else if self.marker_path.exists() {
            fs::remove_file(&self.marker_path)?;
        }
        Ok(())
    }

    async fn save_inner(&self, session: &Session, user: &User) -> Result<()> {
        if session.remember() {
            self.set_marker(true)?;
            self.durable.save(session, user).await?;
            self.transient.clear().await?;
        } else {
            self.set_marker(false)?;
            self.transient.save(session, user).await?;
            self.durable.clear().await?;
        }
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        // Attempt every part even if one fails; report the first failure.
        let marker = self.set_marker(false).map_err(Into::into);
        let durable = self.durable.clear().await;
        let transient = self.transient.clear().await;
        marker.and(durable).and(transient)
    }
}

#[async_trait]
impl CredentialStore for ScopedStore {
    #[instrument(skip(self, session, user), fields(remember = session.remember()))]
    async fn save(&self, session: &Session, user: &User) -> Result<()> {
        match self.save_inner(session, user).await {
            Ok(()) => Ok(()),
            Err(err) => {
                // A partial write is worse than no session at all.
                warn!(error = %err, "Session write failed, clearing both scopes");
                if let Err(clear_err) = self.clear_all().await {
                    warn!(error = %clear_err, "Cleanup after failed write also failed");
                }
                Err(err)
            }
        }
    }

    #[instrument(skip(self))]
    async fn load(&self) -> Result<Option<StoredAuth>> {
        if self.remembered() {
            debug!("Loading from durable scope");
            self.durable.load().await
        } else {
            debug!("Loading from transient scope");
            self.transient.load().await
        }
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.clear_all().await
    }
}
