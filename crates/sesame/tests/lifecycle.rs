//! Full session lifecycle tests over a mock identity API.
//!
//! Every test drives a real [`SessionManager`] against a wiremock server
//! and a scoped store in a temporary directory, covering login, restore,
//! refresh, logout, and the permission checks along the way.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sesame::{RefreshConfig, SessionManager, SessionPhase};
use sesame_core::error::{AuthError, Error};
use sesame_core::{
    AccessToken, ApiUrl, CredentialStore, Credentials, PermissionSet, RefreshToken, Session, User,
};
use sesame_http::HttpIdentityApi;
use sesame_store::ScopedStore;
use serde_json::json;
use tokio::sync::watch;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_api_url(server: &MockServer) -> ApiUrl {
    ApiUrl::new(&format!("http://127.0.0.1:{}", server.address().port())).unwrap()
}

fn manager_over(server: &MockServer, dir: &Path) -> SessionManager {
    let api = Arc::new(HttpIdentityApi::new(mock_api_url(server)));
    let store = Arc::new(ScopedStore::new(dir));
    SessionManager::new(api, store, RefreshConfig::default())
}

fn grant_body(access: &str, refresh: &str, expires_in: i64) -> serde_json::Value {
    json!({
        "token": access,
        "refreshToken": refresh,
        "token_type": "bearer",
        "expires_in": expires_in,
        "user": {
            "id": 7,
            "username": "msato",
            "email": "msato@example.com",
            "permissions": ["employee:read:team", "margin:view"]
        }
    })
}

fn profile_body(permissions: &[&str]) -> serde_json::Value {
    json!({
        "user": {
            "id": 7,
            "username": "msato",
            "email": "msato@example.com",
            "displayName": "M. Sato"
        },
        "permissions": permissions,
        "settings": { "locale": "en" }
    })
}

/// Record every phase change on a dedicated task.
fn spawn_phase_collector(
    mut rx: watch::Receiver<SessionPhase>,
) -> (tokio::task::JoinHandle<()>, Arc<Mutex<Vec<SessionPhase>>>) {
    let phases = Arc::new(Mutex::new(Vec::new()));
    let sink = phases.clone();
    let handle = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let phase = rx.borrow_and_update().clone();
            sink.lock().unwrap().push(phase);
        }
    });
    (handle, phases)
}

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_persists_session_and_notifies_in_order() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({
            "username": "msato",
            "password": "secret123",
            "remember_me": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_body("access-1", "refresh-1", 1800)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(profile_body(&["contract:view", "employee:read:team"])),
        )
        .mount(&server)
        .await;

    let manager = manager_over(&server, dir.path());
    let (collector, phases) = spawn_phase_collector(manager.subscribe());

    let credentials = Credentials::new("msato", "secret123").with_remember(true);
    let account = manager.login(&credentials).await.unwrap();

    assert_eq!(manager.phase(), SessionPhase::Authenticated);
    assert!(manager.is_authenticated());
    assert_eq!(account.user().username, "msato");

    // The profile was fetched and is authoritative.
    assert!(account.profile().is_some());
    assert!(manager.has_permission("contract:view"));
    assert!(!manager.has_permission("margin:view"));

    // Durable scope: the marker and the document with all its keys.
    assert!(dir.path().join("remember").exists());
    let raw = std::fs::read_to_string(dir.path().join("session.json")).unwrap();
    let document: serde_json::Value = serde_json::from_str(&raw).unwrap();
    for key in [
        "token",
        "refreshToken",
        "token_type",
        "expires_in",
        "expires_at",
        "user",
    ] {
        assert!(document.get(key).is_some(), "missing key {key}");
    }

    settle().await;
    collector.abort();
    let phases = phases.lock().unwrap();
    assert_eq!(
        *phases,
        vec![SessionPhase::Authenticating, SessionPhase::Authenticated]
    );
}

#[tokio::test]
async fn test_failed_login_clears_state_and_reports() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "invalid_credentials",
            "message": "Unknown username or password"
        })))
        .mount(&server)
        .await;

    let manager = manager_over(&server, dir.path());
    let result = manager
        .login(&Credentials::new("msato", "wrongpass").with_remember(true))
        .await;

    assert!(matches!(
        result,
        Err(Error::Auth(AuthError::InvalidCredentials))
    ));
    assert!(matches!(manager.phase(), SessionPhase::Error(_)));
    assert!(!manager.is_authenticated());
    assert!(manager.account().is_none());
    assert!(!dir.path().join("session.json").exists());
    assert!(!dir.path().join("remember").exists());
}

#[tokio::test]
async fn test_unremembered_login_leaves_no_files_behind() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_body("access-1", "refresh-1", 1800)))
        .mount(&server)
        .await;

    let manager = manager_over(&server, dir.path());
    manager
        .login(&Credentials::new("msato", "secret123"))
        .await
        .unwrap();

    assert!(manager.is_authenticated());
    assert!(!dir.path().join("session.json").exists());
    assert!(!dir.path().join("remember").exists());

    // A new process over the same directory sees nothing to restore.
    let second = manager_over(&server, dir.path());
    assert!(second.restore().await.unwrap().is_none());
    assert_eq!(second.phase(), SessionPhase::Anonymous);
}

#[tokio::test]
async fn test_storage_failure_on_login_is_fatal_for_the_session() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // The store root is a plain file, so every write fails.
    let blocked = dir.path().join("blocked");
    std::fs::write(&blocked, b"x").unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_body("access-1", "refresh-1", 1800)))
        .mount(&server)
        .await;

    let manager = manager_over(&server, &blocked);
    let result = manager
        .login(&Credentials::new("msato", "secret123").with_remember(true))
        .await;

    assert!(matches!(result, Err(Error::Storage(_))));
    assert!(!manager.is_authenticated());
    assert!(manager.account().is_none());
    assert!(matches!(manager.phase(), SessionPhase::Error(_)));
    assert!(!manager.has_permission("employee:read"));
}

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
async fn test_profile_fetch_failure_keeps_basic_permissions() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_body("access-1", "refresh-1", 1800)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let manager = manager_over(&server, dir.path());
    let account = manager
        .login(&Credentials::new("msato", "secret123"))
        .await
        .unwrap();

    // Still authenticated, still using the grant's permission set.
    assert_eq!(manager.phase(), SessionPhase::Authenticated);
    assert!(account.profile().is_none());
    assert!(manager.has_permission("margin:view"));
    assert!(manager.has_permission("employee:read"));
    assert!(!manager.has_permission("contract:view"));
}

#[tokio::test]
async fn test_profile_permissions_supersede_the_grant() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_body("access-1", "refresh-1", 1800)))
        .mount(&server)
        .await;

    // The profile grants less than the login response did.
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body(&["contract:view"])))
        .mount(&server)
        .await;

    let manager = manager_over(&server, dir.path());
    manager
        .login(&Credentials::new("msato", "secret123"))
        .await
        .unwrap();

    assert!(manager.has_permission("contract:view"));
    assert!(!manager.has_permission("margin:view"));
    assert!(!manager.has_all(["contract:view", "margin:view"]));
    assert!(manager.has_any(["contract:view", "margin:view"]));
}

// ============================================================================
// Restore
// ============================================================================

#[tokio::test]
async fn test_restore_reopens_a_remembered_session() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_body("access-1", "refresh-1", 1800)))
        .mount(&server)
        .await;

    let first = manager_over(&server, dir.path());
    first
        .login(&Credentials::new("msato", "secret123").with_remember(true))
        .await
        .unwrap();

    // A fresh manager over the same directory, as after a restart.
    let second = manager_over(&server, dir.path());
    let account = second.restore().await.unwrap().expect("restored session");

    assert_eq!(second.phase(), SessionPhase::Authenticated);
    assert_eq!(account.user().username, "msato");
    assert_eq!(
        second.access_token(),
        Some(AccessToken::new("access-1"))
    );
    let session = second.session().unwrap();
    assert!(session.remember());
    // Expiry survives the round trip; no network call re-derived it.
    assert!(!session.is_expired());
    assert!(second.has_permission("employee:read"));
}

#[tokio::test]
async fn test_expired_persisted_session_is_discarded() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // Seed the durable scope with an already-expired session.
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64;
    let stale = Session::from_parts(
        AccessToken::new("stale-access"),
        RefreshToken::new("stale-refresh"),
        "bearer",
        1800,
        now_ms - 1000,
        true,
    );
    let user = User {
        id: 7,
        username: "msato".to_string(),
        email: "msato@example.com".to_string(),
        display_name: None,
        roles: Vec::new(),
        permissions: PermissionSet::new(["employee:read:team"]),
    };
    let seed = ScopedStore::new(dir.path());
    seed.save(&stale, &user).await.unwrap();
    assert!(dir.path().join("session.json").exists());

    let manager = manager_over(&server, dir.path());
    let restored = manager.restore().await.unwrap();

    assert!(restored.is_none());
    assert_eq!(manager.phase(), SessionPhase::Anonymous);
    assert!(!dir.path().join("session.json").exists());
    assert!(!dir.path().join("remember").exists());
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_clears_both_scopes_and_is_idempotent() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_body("access-1", "refresh-1", 1800)))
        .mount(&server)
        .await;

    // The remote notification must go out exactly once.
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager_over(&server, dir.path());
    manager
        .login(&Credentials::new("msato", "secret123").with_remember(true))
        .await
        .unwrap();
    assert!(dir.path().join("session.json").exists());

    manager.logout().await;

    assert_eq!(manager.phase(), SessionPhase::Anonymous);
    assert!(!manager.is_authenticated());
    assert!(manager.account().is_none());
    assert!(!manager.has_permission("employee:read"));
    assert!(!dir.path().join("session.json").exists());
    assert!(!dir.path().join("remember").exists());

    // Twice is the same as once, with no second remote call.
    manager.logout().await;
    assert_eq!(manager.phase(), SessionPhase::Anonymous);
}

#[tokio::test]
async fn test_failed_remote_logout_still_clears_locally() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_body("access-1", "refresh-1", 1800)))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let manager = manager_over(&server, dir.path());
    manager
        .login(&Credentials::new("msato", "secret123").with_remember(true))
        .await
        .unwrap();

    manager.logout().await;

    assert_eq!(manager.phase(), SessionPhase::Anonymous);
    assert!(!dir.path().join("session.json").exists());
}

// ============================================================================
// Refresh
// ============================================================================

#[tokio::test]
async fn test_four_minute_token_refreshes_exactly_once() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_body("access-1", "refresh-1", 240)))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .and(body_json(json!({ "refreshToken": "refresh-1" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(grant_body("access-2", "refresh-2", 3600)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager_over(&server, dir.path());
    manager
        .login(&Credentials::new("msato", "secret123"))
        .await
        .unwrap();

    // Four minutes out is inside the five-minute lead window.
    let session = manager.session().unwrap();
    assert!(session.expires_within(Duration::from_secs(300)));

    // First check refreshes; the renewed expiry puts later checks out of
    // the window, so they are no-ops.
    assert!(manager.refresh_if_due().await);
    assert_eq!(manager.access_token(), Some(AccessToken::new("access-2")));
    assert!(!manager.refresh_if_due().await);

    // The document now holds the renewed tokens... in the transient scope.
    assert!(!dir.path().join("session.json").exists());
    assert_eq!(
        manager.session().unwrap().refresh_token(),
        &RefreshToken::new("refresh-2")
    );
}

#[tokio::test(start_paused = true)]
async fn test_background_refresher_renews_the_session() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_body("access-1", "refresh-1", 240)))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(grant_body("access-2", "refresh-2", 3600)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager_over(&server, dir.path());
    manager
        .login(&Credentials::new("msato", "secret123"))
        .await
        .unwrap();

    let refresher = manager.spawn_refresher();

    // Let the scheduler tick a few intervals of virtual time.
    for _ in 0..5 {
        tokio::time::advance(Duration::from_secs(61)).await;
        settle().await;
    }
    let mut waited = 0;
    while manager.access_token() != Some(AccessToken::new("access-2")) && waited < 500 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        waited += 1;
    }

    assert_eq!(manager.access_token(), Some(AccessToken::new("access-2")));
    refresher.shutdown();
}

#[tokio::test]
async fn test_concurrent_refreshes_are_single_flight() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_body("access-1", "refresh-1", 240)))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(grant_body("access-2", "refresh-2", 3600))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager_over(&server, dir.path());
    manager
        .login(&Credentials::new("msato", "secret123"))
        .await
        .unwrap();

    // The second call lands while the first is in flight and is a no-op.
    let (first, second) = tokio::join!(manager.refresh(), manager.refresh());
    first.unwrap();
    second.unwrap();

    assert_eq!(manager.access_token(), Some(AccessToken::new("access-2")));
}

#[tokio::test]
async fn test_failed_refresh_forces_a_clean_logout() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_body("access-1", "refresh-1", 240)))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "invalid_grant",
            "message": "Refresh token has expired"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let manager = manager_over(&server, dir.path());
    manager
        .login(&Credentials::new("msato", "secret123").with_remember(true))
        .await
        .unwrap();
    let (collector, phases) = spawn_phase_collector(manager.subscribe());

    let result = manager.refresh().await;

    assert!(matches!(result, Err(Error::Auth(AuthError::TokenExpired))));
    assert_eq!(manager.phase(), SessionPhase::Anonymous);
    assert!(!manager.is_authenticated());
    assert!(!manager.has_permission("employee:read"));
    assert!(!dir.path().join("session.json").exists());
    assert!(!dir.path().join("remember").exists());

    settle().await;
    collector.abort();
    let phases = phases.lock().unwrap();
    assert_eq!(
        *phases,
        vec![SessionPhase::Refreshing, SessionPhase::Anonymous]
    );
}

#[tokio::test]
async fn test_refresh_persists_to_the_original_scope() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_body("access-1", "refresh-1", 240)))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(grant_body("access-2", "refresh-2", 3600)),
        )
        .mount(&server)
        .await;

    let manager = manager_over(&server, dir.path());
    manager
        .login(&Credentials::new("msato", "secret123").with_remember(true))
        .await
        .unwrap();

    manager.refresh().await.unwrap();

    // Still the durable scope, now holding the renewed tokens.
    assert!(dir.path().join("remember").exists());
    let raw = std::fs::read_to_string(dir.path().join("session.json")).unwrap();
    let document: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(document["token"], "access-2");
    assert_eq!(document["refreshToken"], "refresh-2");
    assert_eq!(document["expires_in"], 3600);

    // A restart picks up the renewed session.
    let second = manager_over(&server, dir.path());
    let account = second.restore().await.unwrap().expect("restored session");
    assert_eq!(account.user().username, "msato");
    assert_eq!(second.access_token(), Some(AccessToken::new("access-2")));
}
