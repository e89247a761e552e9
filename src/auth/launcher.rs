use std::{sync::Arc, time::Duration};

use reqwest::Url;
use tokio::sync::Mutex;

use crate::{auth::AuthError, server::start_api_server, types::CallbackOutcome, warning};

/// Pluggable front end for the consent step.
///
/// The token-exchange state machine lives in
/// [`AuthService`](crate::auth::AuthService) exactly once; how the user
/// gets to see the consent screen is this trait's concern. An
/// implementation presents the authorization URL and resolves with the
/// authorization code, or with a denial/timeout error.
pub trait AuthorizationLauncher {
    fn authorize(
        &self,
        url: &Url,
    ) -> impl std::future::Future<Output = Result<String, AuthError>> + Send;
}

/// Launcher for terminal use: a local callback server plus the system
/// browser.
///
/// Starts the axum callback server, opens the authorization URL in the
/// default browser (falling back to printing the URL when that fails) and
/// polls the shared callback state until the redirect arrives or the
/// deadline passes.
pub struct LocalServerLauncher {
    timeout: Duration,
}

impl LocalServerLauncher {
    pub fn new(timeout: Duration) -> Self {
        LocalServerLauncher { timeout }
    }
}

impl Default for LocalServerLauncher {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

impl AuthorizationLauncher for LocalServerLauncher {
    async fn authorize(&self, url: &Url) -> Result<String, AuthError> {
        let state: Arc<Mutex<Option<CallbackOutcome>>> = Arc::new(Mutex::new(None));

        let server_state = Arc::clone(&state);
        tokio::spawn(async move {
            start_api_server(server_state).await;
        });

        if webbrowser::open(url.as_str()).is_err() {
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                url
            );
        }

        wait_for_callback(state, self.timeout).await
    }
}

/// Polls the shared state for the OAuth callback outcome.
///
/// Runs concurrently with the callback handler that populates the state
/// after the redirect, checking once per second until `timeout` elapses.
async fn wait_for_callback(
    state: Arc<Mutex<Option<CallbackOutcome>>>,
    timeout: Duration,
) -> Result<String, AuthError> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < timeout {
        let lock = state.lock().await;
        match lock.as_ref() {
            Some(CallbackOutcome::Code(code)) => return Ok(code.clone()),
            Some(CallbackOutcome::Denied(reason)) => {
                return Err(AuthError::AuthorizationDenied(reason.clone()));
            }
            None => {}
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    Err(AuthError::CallbackTimeout)
}
