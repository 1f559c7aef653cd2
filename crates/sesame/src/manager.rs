//! The session manager: login, restore, refresh, logout.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use sesame_core::error::AuthError;
use sesame_core::{
    AccessToken, Account, CredentialStore, Credentials, IdentityApi, Result, Session,
};

use crate::config::RefreshConfig;

/// The lifecycle phase of the session manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session; every permission check denies.
    Anonymous,
    /// A login is in flight.
    Authenticating,
    /// A session is active.
    Authenticated,
    /// A token refresh is in flight; the session stays usable.
    Refreshing,
    /// The last login failed; the message is kept for display.
    Error(String),
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Anonymous => write!(f, "anonymous"),
            SessionPhase::Authenticating => write!(f, "authenticating"),
            SessionPhase::Authenticated => write!(f, "authenticated"),
            SessionPhase::Refreshing => write!(f, "refreshing"),
            SessionPhase::Error(message) => write!(f, "error: {}", message),
        }
    }
}

/// Client-side session state machine over an identity API and a
/// credential store.
///
/// The manager owns the single active session: it logs in, restores a
/// persisted session at startup, refreshes tokens in place, and logs out.
/// Every transition that persists writes the store before observers are
/// notified, so a subscriber never sees a state the store does not hold.
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    api: Arc<dyn IdentityApi>,
    store: Arc<dyn CredentialStore>,
    config: RefreshConfig,
    state: RwLock<AuthState>,
    phase_tx: watch::Sender<SessionPhase>,
    refresh_inflight: AtomicBool,
}

#[derive(Debug)]
struct AuthState {
    phase: SessionPhase,
    session: Option<Session>,
    account: Option<Account>,
}

/// Clears the in-flight flag when a refresh ends, however it ends.
struct InflightGuard<'a>(&'a AtomicBool);

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SessionManager {
    /// Create a manager over the given API and store.
    pub fn new(
        api: Arc<dyn IdentityApi>,
        store: Arc<dyn CredentialStore>,
        config: RefreshConfig,
    ) -> Self {
        let (phase_tx, _) = watch::channel(SessionPhase::Anonymous);
        Self {
            inner: Arc::new(ManagerInner {
                api,
                store,
                config,
                state: RwLock::new(AuthState {
                    phase: SessionPhase::Anonymous,
                    session: None,
                    account: None,
                }),
                phase_tx,
                refresh_inflight: AtomicBool::new(false),
            }),
        }
    }

    /// Exchange credentials for an authenticated session.
    ///
    /// On success the session and user are persisted to the scope chosen
    /// by the credentials' remember flag, then observers see
    /// [`SessionPhase::Authenticated`]. The extended profile is fetched
    /// best-effort afterwards; its failure never reverts authentication.
    ///
    /// On failure the store is cleared, the phase becomes
    /// [`SessionPhase::Error`] with the reason, and the error is returned.
    #[instrument(skip(self, credentials), fields(username = credentials.username()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Account> {
        info!("Logging in");
        self.set_phase(SessionPhase::Authenticating);

        let grant = match self.inner.api.login(credentials).await {
            Ok(grant) => grant,
            Err(err) => {
                warn!(error = %err, "Login failed");
                self.clear_local(SessionPhase::Error(err.to_string())).await;
                return Err(err);
            }
        };

        let session = Session::from_grant(&grant, credentials.remember());
        let account = Account::new(grant.user);

        if let Err(err) = self.inner.store.save(&session, account.user()).await {
            warn!(error = %err, "Failed to persist session");
            self.clear_local(SessionPhase::Error(err.to_string())).await;
            return Err(err);
        }

        self.install(session, account.clone(), SessionPhase::Authenticated);
        info!("Login succeeded");

        self.fetch_profile_best_effort().await;
        Ok(self.account().unwrap_or(account))
    }

    /// Restore a persisted session at startup.
    ///
    /// Expiry is checked locally; no network round trip validates the
    /// tokens. Returns `Ok(None)` and stays anonymous when nothing usable
    /// is persisted; stale data is cleared. After a successful restore the
    /// profile is fetched best-effort, as after login.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<Option<Account>> {
        debug!("Restoring persisted session");

        let stored = match self.inner.store.load().await {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "Failed to load persisted session");
                self.clear_local(SessionPhase::Anonymous).await;
                return Err(err);
            }
        };

        let Some(stored) = stored else {
            debug!("No persisted session");
            return Ok(None);
        };

        if stored.session.is_expired() {
            info!("Persisted session has expired, discarding");
            self.clear_local(SessionPhase::Anonymous).await;
            return Ok(None);
        }

        let account = Account::new(stored.user);
        self.install(stored.session, account.clone(), SessionPhase::Authenticated);
        info!("Session restored");

        self.fetch_profile_best_effort().await;
        Ok(Some(self.account().unwrap_or(account)))
    }

    /// Refresh the session tokens in place.
    ///
    /// Single-flight: a call while another refresh is pending returns
    /// immediately. On success the renewed session is persisted to its
    /// original scope before observers are notified. On failure the
    /// session is fully cleared through the logout path; no partial token
    /// state survives.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<()> {
        if self
            .inner
            .refresh_inflight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Refresh already in flight, skipping");
            return Ok(());
        }
        let _guard = InflightGuard(&self.inner.refresh_inflight);

        let session = {
            let state = self.inner.state.read().unwrap();
            match &state.session {
                Some(session) => session.clone(),
                None => return Err(AuthError::NotAuthenticated.into()),
            }
        };

        self.set_phase(SessionPhase::Refreshing);
        info!("Refreshing session tokens");

        let grant = match self.inner.api.refresh(session.refresh_token()).await {
            Ok(grant) => grant,
            Err(err) => {
                // A failed refresh forces a clean logout rather than leave
                // a half-expired session behind.
                warn!(error = %err, "Refresh failed, clearing session");
                self.logout().await;
                return Err(err);
            }
        };

        let renewed = session.renewed(&grant);

        if let Err(err) = self.inner.store.save(&renewed, &grant.user).await {
            warn!(error = %err, "Failed to persist refreshed session");
            self.logout().await;
            return Err(err);
        }

        {
            let mut state = self.inner.state.write().unwrap();
            state.session = Some(renewed);
            match state.account.as_mut() {
                Some(account) => account.set_user(grant.user),
                None => state.account = Some(Account::new(grant.user)),
            }
            state.phase = SessionPhase::Authenticated;
        }
        self.notify(SessionPhase::Authenticated);

        debug!("Session refreshed");
        Ok(())
    }

    /// One scheduler pass: refresh when the session expires within the
    /// configured lead window.
    ///
    /// Returns true when a refresh was triggered. Failures are logged,
    /// not surfaced; [`SessionManager::refresh`] has already cleared the
    /// session by then.
    pub async fn refresh_if_due(&self) -> bool {
        let due = {
            let state = self.inner.state.read().unwrap();
            state
                .session
                .as_ref()
                .is_some_and(|s| s.expires_within(self.inner.config.refresh_lead))
        };
        if !due {
            return false;
        }

        debug!("Session expires within the lead window");
        match self.refresh().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "Scheduled refresh failed");
                false
            }
        }
    }

    /// Log out, clearing local state first.
    ///
    /// The store is cleared and observers moved to
    /// [`SessionPhase::Anonymous`] before the best-effort remote logout
    /// notification; a failure there is logged and swallowed. Never
    /// errors, and calling it twice is the same as calling it once.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let token = {
            let state = self.inner.state.read().unwrap();
            state.session.as_ref().map(|s| s.access_token().clone())
        };

        if token.is_some() {
            info!("Logging out");
        }
        self.clear_local(SessionPhase::Anonymous).await;

        if let Some(token) = token {
            // Best-effort: the local session is already gone.
            if let Err(err) = self.inner.api.logout(&token).await {
                warn!(error = %err, "Remote logout notification failed");
            }
        }
    }

    /// Subscribe to phase transitions.
    ///
    /// The receiver holds the current phase and wakes on every change.
    /// Storage writes complete before the corresponding notification.
    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.inner.phase_tx.subscribe()
    }

    /// Returns the current phase.
    pub fn phase(&self) -> SessionPhase {
        self.inner.state.read().unwrap().phase.clone()
    }

    /// Returns true while a session is active (including mid-refresh).
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.read().unwrap().session.is_some()
    }

    /// Returns a snapshot of the active session.
    pub fn session(&self) -> Option<Session> {
        self.inner.state.read().unwrap().session.clone()
    }

    /// Returns a snapshot of the authenticated account.
    pub fn account(&self) -> Option<Account> {
        self.inner.state.read().unwrap().account.clone()
    }

    /// Returns the current access token, for callers composing their own
    /// API requests.
    pub fn access_token(&self) -> Option<AccessToken> {
        let state = self.inner.state.read().unwrap();
        state.session.as_ref().map(|s| s.access_token().clone())
    }

    /// Returns the scheduler configuration.
    pub fn config(&self) -> &RefreshConfig {
        &self.inner.config
    }

    /// Returns true iff the effective permission set grants `required`.
    ///
    /// Without a session every check answers false.
    pub fn has_permission(&self, required: &str) -> bool {
        let state = self.inner.state.read().unwrap();
        state
            .account
            .as_ref()
            .is_some_and(|a| a.permissions().has(required))
    }

    /// Returns true iff at least one of `required` is granted.
    ///
    /// Without a session every check answers false, including this one
    /// over an empty list.
    pub fn has_any<I, S>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let state = self.inner.state.read().unwrap();
        state
            .account
            .as_ref()
            .is_some_and(|a| a.permissions().has_any(required))
    }

    /// Returns true iff every one of `required` is granted.
    ///
    /// The vacuous truth over an empty list applies only while a session
    /// is active; without one every check answers false.
    pub fn has_all<I, S>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let state = self.inner.state.read().unwrap();
        state
            .account
            .as_ref()
            .is_some_and(|a| a.permissions().has_all(required))
    }

    /// Fetch the extended profile and attach it to the account.
    ///
    /// Failures are logged as [`AuthError::ProfileFetchFailed`] and
    /// swallowed; the basic user's permissions stay in effect.
    async fn fetch_profile_best_effort(&self) {
        let token = {
            let state = self.inner.state.read().unwrap();
            state.session.as_ref().map(|s| s.access_token().clone())
        };
        let Some(token) = token else { return };

        match self.inner.api.fetch_profile(&token).await {
            Ok(profile) => {
                debug!("Extended profile loaded");
                let mut state = self.inner.state.write().unwrap();
                if let Some(account) = state.account.as_mut() {
                    account.set_profile(profile);
                }
            }
            Err(err) => {
                let err = AuthError::ProfileFetchFailed(err.to_string());
                warn!(error = %err, "Continuing with basic permissions");
            }
        }
    }

    /// Set the phase and notify observers.
    fn set_phase(&self, phase: SessionPhase) {
        {
            let mut state = self.inner.state.write().unwrap();
            state.phase = phase.clone();
        }
        self.notify(phase);
    }

    /// Install a session and account, then notify observers.
    fn install(&self, session: Session, account: Account, phase: SessionPhase) {
        {
            let mut state = self.inner.state.write().unwrap();
            state.session = Some(session);
            state.account = Some(account);
            state.phase = phase.clone();
        }
        self.notify(phase);
    }

    /// Clear the store and local state, then notify observers.
    ///
    /// The store clear comes first so observers never see a cleared phase
    /// while stale credentials remain on disk.
    async fn clear_local(&self, phase: SessionPhase) {
        if let Err(err) = self.inner.store.clear().await {
            warn!(error = %err, "Failed to clear credential store");
        }
        {
            let mut state = self.inner.state.write().unwrap();
            state.session = None;
            state.account = None;
            state.phase = phase.clone();
        }
        self.notify(phase);
    }

    /// Push a phase to observers, skipping no-op repeats.
    fn notify(&self, phase: SessionPhase) {
        self.inner.phase_tx.send_if_modified(|current| {
            if *current == phase {
                false
            } else {
                *current = phase;
                true
            }
        });
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.read().unwrap();
        f.debug_struct("SessionManager")
            .field("phase", &state.phase)
            .field("authenticated", &state.session.is_some())
            .finish()
    }
}
