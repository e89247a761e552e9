use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;
use tokio::sync::watch;

use crate::{
    auth::{pkce, store::TokenStore},
    config,
    types::{SessionState, TokenResponse},
};

/// Time source for expiry decisions, injectable so tests can pin "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Static parameters of the OAuth flow.
///
/// Carries the endpoints and client registration values so the service
/// itself stays free of environment lookups; tests point `token_url` at a
/// local stub server.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
}

impl AuthConfig {
    /// Builds the config from the environment accessors in [`config`].
    pub fn from_env() -> Self {
        AuthConfig {
            client_id: config::spotify_client_id(),
            redirect_uri: config::spotify_redirect_uri(),
            scope: config::spotify_scope(),
            auth_url: config::spotify_apiauth_url(),
            token_url: config::spotify_apitoken_url(),
        }
    }
}

/// Everything that can go wrong inside the auth module.
///
/// These are resolved locally and returned as values; no operation lets a
/// panic or a transport error escape the module boundary undifferentiated.
#[derive(Debug, Error)]
pub enum AuthError {
    /// `fetch_access_token` was called with no verifier on record:
    /// expired session, restart mid-flow or double consumption. Not
    /// retryable with the same code; the caller must restart login.
    #[error("no PKCE code verifier on record; start a new login")]
    PkceVerifierMissing,

    /// A refresh was requested but no refresh token is stored.
    #[error("no refresh token on record; authentication required")]
    RefreshTokenMissing,

    /// The token endpoint responded, but not with 200.
    #[error("token endpoint answered with HTTP status {0}")]
    InvalidStatus(u16),

    /// Transport-level failure: connectivity, DNS, TLS, timeout.
    #[error("network error while talking to the token endpoint: {0}")]
    Network(#[source] reqwest::Error),

    /// The response body did not match the expected token shape.
    #[error("token endpoint response did not match the expected shape: {0}")]
    Decoding(#[source] reqwest::Error),

    /// The authorization URL could not be assembled.
    #[error("failed to assemble the authorization URL")]
    MalformedAuthUrl,

    /// The user denied the consent dialog, or the provider redirected
    /// back with an `error` parameter.
    #[error("authorization was denied: {0}")]
    AuthorizationDenied(String),

    /// No callback arrived before the launcher's deadline.
    #[error("timed out waiting for the authorization callback")]
    CallbackTimeout,
}

impl AuthError {
    fn transport(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AuthError::Decoding(err)
        } else {
            AuthError::Network(err)
        }
    }
}

/// Owner of the token lifecycle.
///
/// The service is the only component that decides whether the stored
/// access token is usable and whether the token endpoint has to be
/// contacted. It never caches tokens across calls: every decision reads
/// the current state from the [`TokenStore`].
///
/// Session transitions (credentials persisted, credentials wiped) are
/// broadcast on a watch channel because a forced logout can be triggered
/// from any API call site, not just an explicit command.
pub struct AuthService {
    http: Client,
    config: AuthConfig,
    store: TokenStore,
    clock: Box<dyn Clock>,
    session_tx: watch::Sender<SessionState>,
}

impl AuthService {
    pub fn new(config: AuthConfig, store: TokenStore) -> Self {
        Self::with_clock(config, store, Box::new(SystemClock))
    }

    pub fn with_clock(config: AuthConfig, store: TokenStore, clock: Box<dyn Clock>) -> Self {
        let initial = snapshot(&store, clock.as_ref());
        let (session_tx, _) = watch::channel(initial);
        AuthService {
            http: Client::new(),
            config,
            store,
            clock,
            session_tx,
        }
    }

    /// Builds the authorization URL that starts a login attempt.
    ///
    /// Generates a fresh PKCE verifier, persists it (overwriting any
    /// leftover from an abandoned attempt, so a verifier is never reused
    /// across logins), derives the challenge and assembles the
    /// authorization endpoint URL. `show_dialog=true` forces the consent
    /// dialog so a stale provider-side session is never silently reused.
    pub fn login_url(&self) -> Result<Url, AuthError> {
        let verifier = pkce::generate_verifier();
        self.store.save_code_verifier(&verifier);
        let challenge = pkce::code_challenge(&verifier);

        Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("scope", self.config.scope.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("code_challenge", challenge.as_str()),
                ("code_challenge_method", "S256"),
                ("show_dialog", "true"),
            ],
        )
        .map_err(|_| AuthError::MalformedAuthUrl)
    }

    /// Exchanges an authorization code for tokens and persists them.
    ///
    /// Reads the stored PKCE verifier first; without one no network call
    /// is made. The verifier is single-use: it is deleted at exactly one
    /// point, after the exchange attempt has resolved, whether the
    /// exchange succeeded or failed. This prevents replay and keeps a
    /// leftover verifier from corrupting a later login attempt.
    pub async fn fetch_access_token(&self, code: &str) -> Result<String, AuthError> {
        let Some(verifier) = self.store.load_code_verifier() else {
            return Err(AuthError::PkceVerifierMissing);
        };

        let outcome = self.exchange_code(code, &verifier).await;
        // consumed exactly once, win or lose
        self.store.delete_code_verifier();

        let response = outcome?;
        self.persist_tokens(&response, None);
        Ok(response.access_token)
    }

    async fn exchange_code(&self, code: &str, verifier: &str) -> Result<TokenResponse, AuthError> {
        let res = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("code_verifier", verifier),
            ])
            .send()
            .await
            .map_err(AuthError::transport)?;

        let status = res.status();
        if status != StatusCode::OK {
            return Err(AuthError::InvalidStatus(status.as_u16()));
        }

        res.json::<TokenResponse>()
            .await
            .map_err(AuthError::transport)
    }

    /// Obtains a fresh access token using the stored refresh token.
    ///
    /// A non-200 answer is treated as a hard invalidation: the whole
    /// store is wiped and `LoggedOut` is broadcast, so no partially-stale
    /// credentials survive an untrustworthy refresh response. When the
    /// response omits a rotated refresh token the previous one is kept.
    pub async fn refresh_access_token(&self) -> Result<String, AuthError> {
        let Some(refresh_token) = self.store.load_refresh_token() else {
            return Err(AuthError::RefreshTokenMissing);
        };

        let res = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", self.config.client_id.as_str()),
            ])
            .send()
            .await
            .map_err(AuthError::transport)?;

        let status = res.status();
        if status != StatusCode::OK {
            self.store.clear_all();
            self.session_tx.send_replace(SessionState::LoggedOut);
            return Err(AuthError::InvalidStatus(status.as_u16()));
        }

        let response = res
            .json::<TokenResponse>()
            .await
            .map_err(AuthError::transport)?;
        self.persist_tokens(&response, Some(&refresh_token));
        Ok(response.access_token)
    }

    /// The single call site the rest of the application uses before any
    /// API request.
    ///
    /// Returns the stored access token without touching the network while
    /// `now < expires_at`; otherwise delegates to
    /// [`refresh_access_token`](Self::refresh_access_token). A token
    /// exactly at its expiration instant counts as expired. Concurrent
    /// callers during expiry may each trigger their own refresh; the
    /// store's last-write-wins semantics make that safe.
    pub async fn ensure_valid_access_token(&self) -> Result<String, AuthError> {
        if let (Some(token), Some(expires_at)) =
            (self.store.load_access_token(), self.store.load_expiration())
        {
            if self.clock.now() < expires_at {
                return Ok(token);
            }
        }

        self.refresh_access_token().await
    }

    /// True when no expiration is stored or `now >= expires_at`. Pure.
    pub fn is_token_expired(&self) -> bool {
        match self.store.load_expiration() {
            Some(expires_at) => self.clock.now() >= expires_at,
            None => true,
        }
    }

    /// Removes every stored credential. Idempotent.
    pub fn logout(&self) {
        self.store.clear_all();
        self.session_tx.send_replace(SessionState::LoggedOut);
    }

    /// Current session state derived from the store.
    pub fn session_snapshot(&self) -> SessionState {
        snapshot(&self.store, self.clock.as_ref())
    }

    /// Subscribes to session transitions (login, refresh, forced logout).
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.session_tx.subscribe()
    }

    fn persist_tokens(&self, response: &TokenResponse, fallback_refresh: Option<&str>) {
        self.store.save_access_token(&response.access_token);
        if let Some(refresh) = response.refresh_token.as_deref().or(fallback_refresh) {
            self.store.save_refresh_token(refresh);
        }
        let expires_at = self.clock.now() + Duration::seconds(response.expires_in as i64);
        self.store.save_expiration(expires_at);
        self.session_tx
            .send_replace(SessionState::Active { expires_at });
    }
}

fn snapshot(store: &TokenStore, clock: &dyn Clock) -> SessionState {
    match (store.load_access_token(), store.load_expiration()) {
        (Some(_), Some(expires_at)) if clock.now() < expires_at => {
            SessionState::Active { expires_at }
        }
        _ if store.load_refresh_token().is_some() => SessionState::Refreshable,
        _ => SessionState::LoggedOut,
    }
}
