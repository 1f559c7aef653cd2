//! sesame - Client-side session lifecycle for token-based admin APIs.
//!
//! This library manages the authenticated session of a client talking to a
//! remote identity API: login, restore-on-start, in-place token refresh on
//! a background schedule, logout, and permission evaluation over the
//! granted set. All state flows through a [`SessionManager`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sesame::{RefreshConfig, SessionManager};
//! use sesame_core::{ApiUrl, Credentials};
//! use sesame_http::HttpIdentityApi;
//! use sesame_store::ScopedStore;
//!
//! # async fn example() -> Result<(), sesame_core::Error> {
//! let api = Arc::new(HttpIdentityApi::new(ApiUrl::new("https://api.example.com")?));
//! let store = Arc::new(ScopedStore::new("/var/lib/myapp"));
//! let manager = SessionManager::new(api, store, RefreshConfig::default());
//!
//! let account = manager
//!     .login(&Credentials::new("msato", "hunter2").with_remember(true))
//!     .await?;
//! println!("hello, {}", account.display_name());
//!
//! if manager.has_permission("employee:read") {
//!     // fetch the employee list with manager.access_token()
//! }
//!
//! let _refresher = manager.spawn_refresher();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod manager;
pub mod refresher;

// Re-export primary types at crate root for convenience
pub use config::RefreshConfig;
pub use manager::{SessionManager, SessionPhase};
pub use refresher::RefresherHandle;
