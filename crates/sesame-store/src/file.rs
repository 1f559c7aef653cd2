//! Durable file-backed credential scope.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use sesame_core::error::StorageError;
use sesame_core::{AccessToken, CredentialStore, RefreshToken, Result, Session, StoredAuth, User};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// On-disk session document.
///
/// The key names are the wire names the identity API uses; `expires_at`
/// is the absolute epoch-millisecond expiry derived at grant time.
#[derive(Debug, Serialize, Deserialize)]
struct StoredDocument {
    token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: String,
    token_type: String,
    expires_in: i64,
    expires_at: i64,
    user: User,
}

/// The durable credential scope: a session document on disk.
///
/// Sessions loaded from this scope carry the remember flag, since landing
/// here is what that flag means.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a file store rooted at the given directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Returns the platform data directory for sesame.
    pub fn default_root() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "sesame").ok_or_else(|| StorageError::Io {
            message: "could not determine data directory".to_string(),
        })?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Returns the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn session_path(&self) -> PathBuf {
        self.root.join("session.json")
    }

    fn write_document(&self, document: &StoredDocument) -> std::result::Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;

        let path = self.session_path();
        let json = serde_json::to_string_pretty(document)?;
        fs::write(&path, &json)?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    fn read_document(&self) -> std::result::Result<Option<StoredDocument>, StorageError> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)?;
        let document = serde_json::from_str(&json)?;
        Ok(Some(document))
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    #[instrument(skip(self, session, user), fields(root = %self.root.display()))]
    async fn save(&self, session: &Session, user: &User) -> Result<()> {
        debug!("Writing session document");

        let document = StoredDocument {
            token: session.access_token().as_str().to_string(),
            refresh_token: session.refresh_token().as_str().to_string(),
            token_type: session.token_type().to_string(),
            expires_in: session.expires_in(),
            expires_at: session.expires_at(),
            user: user.clone(),
        };

        self.write_document(&document)?;
        Ok(())
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn load(&self) -> Result<Option<StoredAuth>> {
        let Some(document) = self.read_document()? else {
            return Ok(None);
        };

        debug!("Loaded session document");

        let session = Session::from_parts(
            AccessToken::new(document.token),
            RefreshToken::new(document.refresh_token),
            document.token_type,
            document.expires_in,
            document.expires_at,
            true,
        );

        Ok(Some(StoredAuth {
            session,
            user: document.user,
        }))
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn clear(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            fs::remove_file(&path).map_err(StorageError::from)?;
            debug!("Removed session document");
        }
        Ok(())
    }
}
