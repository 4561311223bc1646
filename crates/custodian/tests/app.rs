//! Integration tests for the `Custodian` facade: config on disk, token
//! file on disk, and the full page flow of the web app.

use std::path::Path;
use std::sync::{Arc, Mutex};

use custodian::prelude::*;
use custodian_token::{FixedClock, mint_unsigned};
use serde_json::json;

const NOW: u64 = 1_700_000_000;

// =========================================================================
// Helpers
// =========================================================================

fn config_in(dir: &Path) -> CustodianConfig {
    CustodianConfig {
        storage: custodian::StorageConfig {
            dir: dir.join("storage"),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Same wiring as `build()`, but with a frozen clock.
fn app_in(dir: &Path) -> Custodian<FileTokenStore, JwtDecoder<FixedClock>> {
    let config = config_in(dir);
    let store = FileTokenStore::new(config.storage.dir.clone(), StorageKey::default());
    CustodianBuilder::new()
        .config(config)
        .build_with(store, JwtDecoder::with_clock(FixedClock(NOW)))
        .unwrap()
}

fn token(sub: &str) -> String {
    mint_unsigned(&json!({
        "sub": sub,
        "scopes": ["ROLE_USER"],
        "iat": NOW - 60,
        "exp": NOW + 3600,
    }))
}

#[derive(Default)]
struct RecordingNavigator {
    requests: Mutex<Vec<Destination>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, destination: &Destination) {
        self.requests.lock().unwrap().push(destination.clone());
    }
}

// =========================================================================
// Config
// =========================================================================

#[test]
fn test_config_load_from_file() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let path = dir.join("custodian.json");
    std::fs::write(
        &path,
        r#"{"storage": {"dir": "/tmp/custodian-demo", "key": "custodian_token"}}"#,
    )
    .unwrap();

    let config = CustodianConfig::load(&path).unwrap();

    assert_eq!(config.storage.key, "custodian_token");
    assert_eq!(config.routes, GuardConfig::default());
}

#[test]
fn test_build_with_invalid_routes_fails() {
    let config = CustodianConfig {
        routes: GuardConfig {
            auth_route: "login".into(),
            ..Default::default()
        },
        ..Default::default()
    };

    let result = CustodianBuilder::new().config(config).build();

    assert!(matches!(result, Err(CustodianError::Config(_))));
}

#[tokio::test]
async fn test_build_uses_configured_file_store() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let app = CustodianBuilder::new().config(config_in(dir)).build().unwrap();

    assert_eq!(app.init().await.unwrap(), SessionState::Anonymous);
    let path = app.auth().store().path();
    assert_eq!(path, dir.join("storage").join("access_token"));
}

// =========================================================================
// Session lifecycle across "reloads"
// =========================================================================

#[tokio::test]
async fn test_login_survives_reload() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let first = app_in(dir);
    first.init().await.unwrap();
    let claims = first.login(&token("jamila@example.com")).await.unwrap();

    // A new app instance over the same directory is a page reload.
    let reloaded = app_in(dir);
    assert_eq!(reloaded.current(), SessionState::Unknown);
    let state = reloaded.init().await.unwrap();

    assert_eq!(state, SessionState::Authenticated(claims));
}

#[tokio::test]
async fn test_logout_survives_reload() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let app = app_in(dir);
    app.login(&token("a")).await.unwrap();
    app.logout().await.unwrap();
    app.logout().await.unwrap();

    let reloaded = app_in(dir);
    assert_eq!(reloaded.init().await.unwrap(), SessionState::Anonymous);
    assert!(!dir.join("storage").join("access_token").exists());
}

#[tokio::test]
async fn test_not_a_token_on_disk_bootstraps_anonymous() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    std::fs::create_dir_all(dir.join("storage")).unwrap();
    std::fs::write(dir.join("storage").join("access_token"), "not-a-token").unwrap();

    let state = app_in(dir).init().await.unwrap();

    assert_eq!(state, SessionState::Anonymous);
}

#[tokio::test]
async fn test_non_utf8_token_file_bootstraps_anonymous_and_login_recovers() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    std::fs::create_dir_all(dir.join("storage")).unwrap();
    std::fs::write(dir.join("storage").join("access_token"), [0xff, 0xfe, 0x00, 0x41]).unwrap();
    let app = app_in(dir);

    assert_eq!(app.init().await.unwrap(), SessionState::Anonymous);
    let claims = app.login(&token("a")).await.unwrap();

    assert_eq!(app.current(), SessionState::Authenticated(claims));
}

#[tokio::test]
async fn test_expired_token_on_disk_bootstraps_anonymous_and_is_kept() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let expired = mint_unsigned(&json!({"sub": "a", "exp": NOW - 1}));
    let file = dir.join("storage").join("access_token");
    std::fs::create_dir_all(file.parent().unwrap()).unwrap();
    std::fs::write(&file, &expired).unwrap();

    let state = app_in(dir).init().await.unwrap();

    assert_eq!(state, SessionState::Anonymous);
    assert_eq!(std::fs::read_to_string(&file).unwrap(), expired);
}

#[tokio::test]
async fn test_failed_login_surfaces_consistency_error() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let app = app_in(dir);
    app.init().await.unwrap();

    let result = app.login("not-a-token").await;

    assert!(matches!(
        result,
        Err(CustodianError::Session(SessionError::PostLoginConsistency(_)))
    ));
    assert_eq!(app.current(), SessionState::Anonymous);
}

// =========================================================================
// Page flow
// =========================================================================

#[tokio::test]
async fn test_full_page_flow_redirects() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let app = app_in(dir);
    let nav = Arc::new(RecordingNavigator::default());
    let (watcher, _sub) = app.watch_routes(Arc::clone(&nav));

    // Reload lands on the dashboard before the session is known.
    assert_eq!(watcher.visit("/dashboard/customers"), GuardDecision::Defer);
    app.init().await.unwrap();
    // Anonymous: bounced to the login page.
    assert_eq!(watcher.current_page().as_deref(), Some("/"));

    // The user goes to sign up and the backend returns a token.
    watcher.visit("/signup");
    app.login(&token("new@example.com")).await.unwrap();
    assert_eq!(watcher.current_page().as_deref(), Some("/dashboard"));

    // Signing out from the dashboard goes back to the login page.
    app.logout().await.unwrap();
    assert_eq!(watcher.current_page().as_deref(), Some("/"));

    assert_eq!(
        *nav.requests.lock().unwrap(),
        vec![
            Destination::Route("/".into()),
            Destination::AuthenticatedHome,
            Destination::Route("/".into()),
        ]
    );
}

#[tokio::test]
async fn test_revalidate_after_expiry_downgrades_without_clearing() {
    use custodian_token::ManualClock;

    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let clock = Arc::new(ManualClock::new(NOW));
    let config = config_in(dir);
    let store = FileTokenStore::new(config.storage.dir.clone(), StorageKey::default());
    let app = CustodianBuilder::new()
        .config(config)
        .build_with(store, JwtDecoder::with_clock(Arc::clone(&clock)))
        .unwrap();
    app.login(&token("a")).await.unwrap();

    clock.advance(3600);
    let state = app.revalidate().await.unwrap();

    assert_eq!(state, SessionState::Anonymous);
    assert!(app.auth().store().path().exists());
}
