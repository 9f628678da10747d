//! Integration tests for the credential lifecycle against a mock OAuth server

use std::sync::Arc;

use chrono::Utc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stridecoach::auth::{
    AuthManager, DenyAuthorizer, FileTokenStore, OAuthClient, StaticAuthorizer, TokenRecord,
};
use stridecoach::config::StravaConfig;

fn strava_config(server: &MockServer) -> StravaConfig {
    StravaConfig {
        client_id: Some("12345".to_string()),
        client_secret: Some("secret".to_string()),
        auth_base: server.uri(),
        ..Default::default()
    }
}

fn record(expires_in: i64) -> TokenRecord {
    TokenRecord {
        user_id: String::new(),
        access_token: "old_access".to_string(),
        refresh_token: Some("old_refresh".to_string()),
        expires_at: Utc::now().timestamp() + expires_in,
        athlete: Some(serde_json::json!({"id": 7, "firstname": "Ada"})),
        created_at: None,
        updated_at: None,
    }
}

fn manager(server: &MockServer, dir: &std::path::Path, authorizer: Arc<dyn stridecoach::auth::Authorizer>) -> AuthManager {
    let store = FileTokenStore::new(dir).expect("store");
    let oauth = OAuthClient::new(&strava_config(server)).expect("oauth client");
    AuthManager::new(store, oauth, authorizer)
}

#[tokio::test]
async fn test_valid_token_is_returned_without_network() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().expect("tempdir");
    let auth = manager(&server, tmp.path(), Arc::new(DenyAuthorizer));

    let store = FileTokenStore::new(tmp.path()).expect("store");
    store.save("alice", &record(3600)).expect("save");

    let token = auth.access_token("alice").await.expect("token");
    assert_eq!(token, "old_access");
    // No request reached the mock server.
    assert!(server.received_requests().await.expect("requests").is_empty());
}

#[tokio::test]
async fn test_stale_token_is_refreshed_and_saved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=old_refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "new_access",
            "refresh_token": "new_refresh",
            "expires_at": Utc::now().timestamp() + 21_600
        })))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().expect("tempdir");
    let auth = manager(&server, tmp.path(), Arc::new(DenyAuthorizer));

    let store = FileTokenStore::new(tmp.path()).expect("store");
    store.save("alice", &record(60)).expect("save");

    let token = auth.access_token("alice").await.expect("token");
    assert_eq!(token, "new_access");

    let saved = store.load("alice").expect("load").expect("record");
    assert_eq!(saved.refresh_token.as_deref(), Some("new_refresh"));
    assert!(saved.is_valid());
    // Athlete identity from the original record survives the refresh.
    assert_eq!(saved.athlete.unwrap()["firstname"], "Ada");
}

#[tokio::test]
async fn test_failed_refresh_preserves_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "message": "Bad Request",
            "errors": [{"field": "refresh_token", "code": "invalid"}]
        })))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().expect("tempdir");
    let auth = manager(&server, tmp.path(), Arc::new(DenyAuthorizer));

    let store = FileTokenStore::new(tmp.path()).expect("store");
    store.save("alice", &record(-100)).expect("save");

    // Refresh is rejected and the deny authorizer cannot re-authorize.
    let result = auth.access_token("alice").await;
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("alice"));

    // The stored record is untouched.
    let saved = store.load("alice").expect("load").expect("record");
    assert_eq!(saved.refresh_token.as_deref(), Some("old_refresh"));
}

#[tokio::test]
async fn test_expired_record_without_refresh_token_reauthorizes_directly() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "fresh_access",
            "refresh_token": "fresh_refresh",
            "expires_at": Utc::now().timestamp() + 21_600
        })))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().expect("tempdir");
    let auth = manager(
        &server,
        tmp.path(),
        Arc::new(StaticAuthorizer::new("granted_code")),
    );

    let store = FileTokenStore::new(tmp.path()).expect("store");
    let mut dead = record(-100);
    dead.refresh_token = None;
    store.save("alice", &dead).expect("save");

    let token = auth.access_token("alice").await.expect("token");
    assert_eq!(token, "fresh_access");

    // Exactly one token request was made, and it was the code exchange --
    // no refresh was attempted against a record with nothing to refresh.
    let requests = server.received_requests().await.expect("requests");
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8_lossy(&requests[0].body).to_string();
    assert!(body.contains("grant_type=authorization_code"));
    assert!(!body.contains("grant_type=refresh_token"));
}

#[tokio::test]
async fn test_no_record_runs_authorization_flow() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=granted_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "fresh_access",
            "refresh_token": "fresh_refresh",
            "expires_at": Utc::now().timestamp() + 21_600,
            "athlete": {"id": 7, "firstname": "Ada"}
        })))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().expect("tempdir");
    let auth = manager(
        &server,
        tmp.path(),
        Arc::new(StaticAuthorizer::new("granted_code")),
    );

    let token = auth.access_token("alice").await.expect("token");
    assert_eq!(token, "fresh_access");

    let store = FileTokenStore::new(tmp.path()).expect("store");
    let saved = store.load("alice").expect("load").expect("record");
    assert_eq!(saved.athlete.unwrap()["id"], 7);
    assert!(saved.created_at.is_some());
}

#[tokio::test]
async fn test_revoke_deletes_locally_even_when_remote_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/deauthorize"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().expect("tempdir");
    let auth = manager(&server, tmp.path(), Arc::new(DenyAuthorizer));

    let store = FileTokenStore::new(tmp.path()).expect("store");
    store.save("alice", &record(3600)).expect("save");

    let existed = auth.revoke("alice").await.expect("revoke");
    assert!(existed);
    assert!(store.load("alice").expect("load").is_none());
}

#[tokio::test]
async fn test_revoke_without_record_is_a_quiet_no_op() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().expect("tempdir");
    let auth = manager(&server, tmp.path(), Arc::new(DenyAuthorizer));

    let existed = auth.revoke("nobody").await.expect("revoke");
    assert!(!existed);
    // The deauthorize endpoint was never called.
    assert!(server.received_requests().await.expect("requests").is_empty());
}

#[tokio::test]
async fn test_list_users_reflects_store_contents() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().expect("tempdir");
    let auth = manager(&server, tmp.path(), Arc::new(DenyAuthorizer));

    let store = FileTokenStore::new(tmp.path()).expect("store");
    store.save("zoe", &record(3600)).expect("save");
    store.save("alice", &record(3600)).expect("save");

    assert_eq!(auth.list_users().expect("list"), vec!["alice", "zoe"]);

    // Full records are available without reloading per user.
    let records = auth.list_records().expect("records");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].user_id, "alice");
    assert_eq!(records[0].access_token, "old_access");
}
