use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use axum::{Json, Router, http::StatusCode, routing::post};
use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};

use sptopcli::auth::{
    AuthConfig, AuthError, AuthService, Clock, TokenStore,
    pkce::{code_challenge, generate_verifier},
    store::{
        ACCESS_TOKEN_KEY, CODE_VERIFIER_KEY, EXPIRATION_DATE_KEY, REFRESH_TOKEN_KEY, SecretStore,
    },
};
use sptopcli::types::SessionState;

// In-memory secret store so tests can inspect exactly what the service
// persisted, without touching the system keyring.
#[derive(Clone, Default)]
struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }
}

impl SecretStore for MemoryStore {
    fn save(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn load(&self, key: &str) -> Option<String> {
        self.get(key)
    }

    fn delete(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn fixed_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn test_config(token_url: &str) -> AuthConfig {
    AuthConfig {
        client_id: "test-client-id".to_string(),
        redirect_uri: "http://127.0.0.1:8888/callback".to_string(),
        scope: "user-top-read user-read-recently-played".to_string(),
        auth_url: "https://accounts.spotify.com/authorize".to_string(),
        token_url: token_url.to_string(),
    }
}

fn service_at(token_url: &str, store: &MemoryStore, now: DateTime<Utc>) -> AuthService {
    AuthService::with_clock(
        test_config(token_url),
        TokenStore::new(Box::new(store.clone())),
        Box::new(FixedClock(now)),
    )
}

// Typed view over the shared backend for seeding test fixtures.
fn seed_store(store: &MemoryStore) -> TokenStore {
    TokenStore::new(Box::new(store.clone()))
}

/// Spawns a stub token endpoint that always answers with `status`/`body`
/// and counts how many requests it saw.
async fn spawn_token_stub(status: StatusCode, body: Value) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let handler_hits = Arc::clone(&hits);

    let app = Router::new().route(
        "/api/token",
        post(move || {
            let hits = Arc::clone(&handler_hits);
            let body = body.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                (status, Json(body))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api/token", addr), hits)
}

#[test]
fn test_generate_verifier() {
    let verifier = generate_verifier();

    // Should be exactly 64 characters
    assert_eq!(verifier.len(), 64);

    // Should only contain unreserved URL-safe characters
    assert!(
        verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-._~".contains(c))
    );

    // Two generated verifiers should be different
    let verifier2 = generate_verifier();
    assert_ne!(verifier, verifier2);
}

#[test]
fn test_code_challenge_deterministic_and_unpadded() {
    let verifier = "test_verifier_123";
    let challenge = code_challenge(verifier);

    assert!(!challenge.is_empty());

    // Deterministic - same input produces same output
    let challenge2 = code_challenge(verifier);
    assert_eq!(challenge, challenge2);

    // Different input produces different output
    let challenge3 = code_challenge("different_verifier");
    assert_ne!(challenge, challenge3);

    // base64url, no padding: never '+', '/' or '='
    assert!(
        challenge
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    );
}

#[test]
fn test_code_challenge_known_answer() {
    // Test vector from RFC 7636, Appendix B
    let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
    assert_eq!(
        code_challenge(verifier),
        "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
    );
}

#[test]
fn test_token_store_upsert_and_absent_load() {
    let backend = MemoryStore::default();
    let store = seed_store(&backend);

    assert_eq!(store.load_access_token(), None);

    store.save_access_token("first");
    assert_eq!(store.load_access_token(), Some("first".to_string()));

    // save is an upsert: the entry is updated in place
    store.save_access_token("second");
    assert_eq!(store.load_access_token(), Some("second".to_string()));
}

#[test]
fn test_token_store_delete_is_idempotent() {
    let backend = MemoryStore::default();
    let store = seed_store(&backend);

    store.save_refresh_token("RT");
    store.delete_refresh_token();
    assert_eq!(store.load_refresh_token(), None);

    // deleting an absent key is not an error
    store.delete_refresh_token();
    assert_eq!(store.load_refresh_token(), None);
}

#[test]
fn test_token_store_expiration_round_trip() {
    let backend = MemoryStore::default();
    let store = seed_store(&backend);

    let when = DateTime::from_timestamp(1_700_003_600, 0).unwrap();
    store.save_expiration(when);

    // serialized as epoch seconds
    assert_eq!(
        backend.get(EXPIRATION_DATE_KEY),
        Some("1700003600".to_string())
    );
    assert_eq!(store.load_expiration(), Some(when));
}

#[test]
fn test_token_store_garbage_expiration_is_absent() {
    let backend = MemoryStore::default();
    backend.save(EXPIRATION_DATE_KEY, "not-a-timestamp");

    let store = seed_store(&backend);
    assert_eq!(store.load_expiration(), None);
}

#[test]
fn test_token_store_clear_all() {
    let backend = MemoryStore::default();
    let store = seed_store(&backend);

    store.save_access_token("AT");
    store.save_refresh_token("RT");
    store.save_expiration(fixed_now());
    store.save_code_verifier("VERIFIER");

    store.clear_all();

    assert_eq!(backend.get(ACCESS_TOKEN_KEY), None);
    assert_eq!(backend.get(REFRESH_TOKEN_KEY), None);
    assert_eq!(backend.get(EXPIRATION_DATE_KEY), None);
    assert_eq!(backend.get(CODE_VERIFIER_KEY), None);
}

#[tokio::test]
async fn test_login_url_carries_challenge_and_persists_verifier() {
    let backend = MemoryStore::default();
    let service = service_at("http://127.0.0.1:1/api/token", &backend, fixed_now());

    let url = service.login_url().expect("login URL should assemble");

    let params: HashMap<String, String> = url
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    assert_eq!(params.get("response_type").map(String::as_str), Some("code"));
    assert_eq!(
        params.get("code_challenge_method").map(String::as_str),
        Some("S256")
    );
    assert_eq!(params.get("show_dialog").map(String::as_str), Some("true"));

    let verifier = backend
        .get(CODE_VERIFIER_KEY)
        .expect("verifier should be persisted before the URL is handed out");
    assert_eq!(
        params.get("code_challenge").cloned().unwrap_or_default(),
        code_challenge(&verifier)
    );
    assert!(!params["code_challenge"].is_empty());
}

#[tokio::test]
async fn test_login_url_never_reuses_a_verifier() {
    let backend = MemoryStore::default();
    let service = service_at("http://127.0.0.1:1/api/token", &backend, fixed_now());

    service.login_url().unwrap();
    let first = backend.get(CODE_VERIFIER_KEY).unwrap();

    service.login_url().unwrap();
    let second = backend.get(CODE_VERIFIER_KEY).unwrap();

    assert_ne!(first, second);
}

#[tokio::test]
async fn test_fetch_access_token_fresh_login() {
    let (token_url, hits) = spawn_token_stub(
        StatusCode::OK,
        json!({
            "access_token": "AT1",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "RT1"
        }),
    )
    .await;

    let backend = MemoryStore::default();
    let now = fixed_now();
    let service = service_at(&token_url, &backend, now);

    service.login_url().unwrap();
    let token = service.fetch_access_token("abc123").await.unwrap();

    assert_eq!(token, "AT1");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(backend.get(ACCESS_TOKEN_KEY), Some("AT1".to_string()));
    assert_eq!(backend.get(REFRESH_TOKEN_KEY), Some("RT1".to_string()));
    assert_eq!(
        seed_store(&backend).load_expiration(),
        Some(now + Duration::seconds(3600))
    );

    // verifier consumed exactly once, gone after the exchange
    assert_eq!(backend.get(CODE_VERIFIER_KEY), None);
}

#[tokio::test]
async fn test_fetch_access_token_failure_still_consumes_verifier() {
    let (token_url, hits) =
        spawn_token_stub(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "boom"})).await;

    let backend = MemoryStore::default();
    let service = service_at(&token_url, &backend, fixed_now());

    seed_store(&backend).save_code_verifier("VERIFIER");

    let err = service.fetch_access_token("abc123").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidStatus(500)));
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // no credentials persisted, verifier deleted anyway
    assert_eq!(backend.get(ACCESS_TOKEN_KEY), None);
    assert_eq!(backend.get(CODE_VERIFIER_KEY), None);
}

#[tokio::test]
async fn test_fetch_access_token_without_verifier_makes_no_request() {
    let (token_url, hits) = spawn_token_stub(
        StatusCode::OK,
        json!({
            "access_token": "AT1",
            "token_type": "Bearer",
            "expires_in": 3600
        }),
    )
    .await;

    let backend = MemoryStore::default();
    let service = service_at(&token_url, &backend, fixed_now());

    let err = service.fetch_access_token("abc123").await.unwrap_err();
    assert!(matches!(err, AuthError::PkceVerifierMissing));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_ensure_valid_returns_stored_token_without_network() {
    let (token_url, hits) = spawn_token_stub(
        StatusCode::OK,
        json!({
            "access_token": "SHOULD_NOT_BE_FETCHED",
            "token_type": "Bearer",
            "expires_in": 3600
        }),
    )
    .await;

    let backend = MemoryStore::default();
    let now = fixed_now();
    let service = service_at(&token_url, &backend, now);

    let seed = seed_store(&backend);
    seed.save_access_token("STORED");
    seed.save_expiration(now + Duration::seconds(3600));

    let token = service.ensure_valid_access_token().await.unwrap();
    assert_eq!(token, "STORED");
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_token_exactly_at_expiration_is_refreshed() {
    let (token_url, hits) = spawn_token_stub(
        StatusCode::OK,
        json!({
            "access_token": "NEW",
            "token_type": "Bearer",
            "expires_in": 3600
        }),
    )
    .await;

    let backend = MemoryStore::default();
    let now = fixed_now();
    let service = service_at(&token_url, &backend, now);

    let seed = seed_store(&backend);
    seed.save_access_token("OLD");
    seed.save_refresh_token("RT1");
    // now >= expires_at counts as expired, even at the exact boundary
    seed.save_expiration(now);

    let token = service.ensure_valid_access_token().await.unwrap();
    assert_eq!(token, "NEW");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_expired_token_auto_refresh_keeps_previous_refresh_token() {
    let (token_url, hits) = spawn_token_stub(
        StatusCode::OK,
        json!({
            "access_token": "NEW",
            "token_type": "Bearer",
            "expires_in": 3600
        }),
    )
    .await;

    let backend = MemoryStore::default();
    let now = fixed_now();
    let service = service_at(&token_url, &backend, now);

    let seed = seed_store(&backend);
    seed.save_access_token("OLD");
    seed.save_refresh_token("RT1");
    seed.save_expiration(now - Duration::seconds(10));

    let token = service.ensure_valid_access_token().await.unwrap();

    assert_eq!(token, "NEW");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(backend.get(ACCESS_TOKEN_KEY), Some("NEW".to_string()));
    // response omitted refresh_token: the previous one must survive
    assert_eq!(backend.get(REFRESH_TOKEN_KEY), Some("RT1".to_string()));
    assert_eq!(
        seed.load_expiration(),
        Some(now + Duration::seconds(3600))
    );
}

#[tokio::test]
async fn test_refresh_rejection_wipes_all_credentials() {
    let (token_url, _hits) =
        spawn_token_stub(StatusCode::BAD_REQUEST, json!({"error": "invalid_grant"})).await;

    let backend = MemoryStore::default();
    let now = fixed_now();
    let service = service_at(&token_url, &backend, now);
    let mut session = service.subscribe();

    let seed = seed_store(&backend);
    seed.save_access_token("AT");
    seed.save_refresh_token("RT");
    seed.save_expiration(now - Duration::seconds(10));
    seed.save_code_verifier("LEFTOVER");

    let err = service.refresh_access_token().await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidStatus(400)));

    assert_eq!(backend.get(ACCESS_TOKEN_KEY), None);
    assert_eq!(backend.get(REFRESH_TOKEN_KEY), None);
    assert_eq!(backend.get(EXPIRATION_DATE_KEY), None);
    assert_eq!(backend.get(CODE_VERIFIER_KEY), None);

    // the forced logout is broadcast, not just returned
    assert_eq!(*session.borrow_and_update(), SessionState::LoggedOut);
}

#[tokio::test]
async fn test_refresh_without_refresh_token_makes_no_request() {
    let (token_url, hits) = spawn_token_stub(
        StatusCode::OK,
        json!({
            "access_token": "NEW",
            "token_type": "Bearer",
            "expires_in": 3600
        }),
    )
    .await;

    let backend = MemoryStore::default();
    let service = service_at(&token_url, &backend, fixed_now());

    let err = service.refresh_access_token().await.unwrap_err();
    assert!(matches!(err, AuthError::RefreshTokenMissing));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_logout_clears_everything_and_is_idempotent() {
    let backend = MemoryStore::default();
    let service = service_at("http://127.0.0.1:1/api/token", &backend, fixed_now());

    let seed = seed_store(&backend);
    seed.save_access_token("AT");
    seed.save_refresh_token("RT");
    seed.save_expiration(fixed_now());
    seed.save_code_verifier("VERIFIER");

    service.logout();

    assert_eq!(backend.get(ACCESS_TOKEN_KEY), None);
    assert_eq!(backend.get(REFRESH_TOKEN_KEY), None);
    assert_eq!(backend.get(EXPIRATION_DATE_KEY), None);
    assert_eq!(backend.get(CODE_VERIFIER_KEY), None);

    // logging out twice is fine
    service.logout();
    assert_eq!(backend.get(ACCESS_TOKEN_KEY), None);
}

#[tokio::test]
async fn test_is_token_expired() {
    let backend = MemoryStore::default();
    let now = fixed_now();
    let service = service_at("http://127.0.0.1:1/api/token", &backend, now);

    // nothing stored counts as expired
    assert!(service.is_token_expired());

    let seed = seed_store(&backend);
    seed.save_expiration(now + Duration::seconds(60));
    assert!(!service.is_token_expired());

    // exactly at the boundary counts as expired
    seed.save_expiration(now);
    assert!(service.is_token_expired());

    seed.save_expiration(now - Duration::seconds(1));
    assert!(service.is_token_expired());
}

#[tokio::test]
async fn test_session_snapshot_states() {
    let backend = MemoryStore::default();
    let now = fixed_now();
    let service = service_at("http://127.0.0.1:1/api/token", &backend, now);

    assert_eq!(service.session_snapshot(), SessionState::LoggedOut);

    let seed = seed_store(&backend);
    seed.save_access_token("AT");
    let expires_at = now + Duration::seconds(3600);
    seed.save_expiration(expires_at);
    assert_eq!(
        service.session_snapshot(),
        SessionState::Active { expires_at }
    );

    // expired access token with a refresh token on record
    seed.save_expiration(now - Duration::seconds(1));
    seed.save_refresh_token("RT");
    assert_eq!(service.session_snapshot(), SessionState::Refreshable);
}

#[tokio::test]
async fn test_successful_exchange_broadcasts_active_session() {
    let (token_url, _hits) = spawn_token_stub(
        StatusCode::OK,
        json!({
            "access_token": "AT1",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "RT1"
        }),
    )
    .await;

    let backend = MemoryStore::default();
    let now = fixed_now();
    let service = service_at(&token_url, &backend, now);
    let mut session = service.subscribe();

    seed_store(&backend).save_code_verifier("VERIFIER");
    service.fetch_access_token("abc123").await.unwrap();

    assert_eq!(
        *session.borrow_and_update(),
        SessionState::Active {
            expires_at: now + Duration::seconds(3600)
        }
    );
}
