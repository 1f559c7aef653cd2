//! Shared wiring for commands: API client, store, and session manager.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use sesame::{RefreshConfig, SessionManager};
use sesame_core::ApiUrl;
use sesame_http::HttpIdentityApi;
use sesame_store::{FileStore, ScopedStore};

/// Everything a command needs to talk to the identity API.
pub struct CommandContext {
    manager: SessionManager,
    identity: Arc<HttpIdentityApi>,
}

impl CommandContext {
    /// Builds the context from the global CLI options.
    ///
    /// # Errors
    ///
    /// Returns an error when no API URL is configured, the URL does not
    /// parse, or no data directory can be determined.
    pub fn new(api: Option<&str>, data_dir: Option<&Path>) -> Result<Self> {
        let api = api.context("No API URL configured. Pass --api or set SESAME_API.")?;
        let api = ApiUrl::new(api).context("Invalid API URL")?;

        let data_dir = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => FileStore::default_root().context("Failed to determine the data directory")?,
        };

        debug!(api = %api, data_dir = %data_dir.display(), "Resolved command context");

        let identity = Arc::new(HttpIdentityApi::new(api));
        let store = Arc::new(ScopedStore::new(&data_dir));
        let manager = SessionManager::new(identity.clone(), store, RefreshConfig::default());

        Ok(Self { manager, identity })
    }

    /// The session manager backed by the configured API and store.
    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    /// The raw identity API, for session-less flows like password reset.
    pub fn identity(&self) -> &HttpIdentityApi {
        &self.identity
    }
}
