//! # Spotify Integration Module
//!
//! Thin client layer over the Spotify Web API endpoints the CLI presents:
//! top tracks and artists, recently played tracks and the user profile.
//!
//! ## Architecture
//!
//! ```text
//! CLI commands
//!      ↓
//! spotify::{top, player, user}   (endpoint wrappers)
//!      ↓
//! auth::AuthService              (ensure_valid_access_token)
//!      ↓
//! reqwest → Spotify Web API
//! ```
//!
//! Every request goes through
//! [`AuthService::ensure_valid_access_token`](crate::auth::AuthService::ensure_valid_access_token),
//! so an expired access token is refreshed transparently before the call.
//!
//! ## Error handling
//!
//! - `401`/`403` mean the stored credentials are no longer honored. The
//!   shared request path logs the session out (which broadcasts the state
//!   change) and surfaces [`SpotifyError::Unauthorized`] so the command
//!   layer can tell the user to re-authenticate.
//! - `502` responses are retried after a short delay; Spotify's gateway
//!   emits them transiently.
//! - Everything else maps onto the auth or HTTP error as-is.

pub mod player;
pub mod top;
pub mod user;

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::time::sleep;

use crate::auth::{AuthError, AuthService};

#[derive(Debug, Error)]
pub enum SpotifyError {
    /// The API rejected the token; the session has been logged out.
    #[error("authorization is no longer valid; run `sptopcli auth` to log in again")]
    Unauthorized,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Authenticated GET returning a decoded JSON body.
///
/// Retries on 502 Bad Gateway with a 10-second delay. On 401/403 the
/// session is logged out before the error is returned, so every caller
/// observes the same "token invalid means re-authenticate" behavior.
pub(crate) async fn get_json<T: DeserializeOwned>(
    auth: &AuthService,
    api_url: &str,
) -> Result<T, SpotifyError> {
    loop {
        let token = auth.ensure_valid_access_token().await?;

        let client = Client::new();
        let response = client.get(api_url).bearer_auth(&token).send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            auth.logout();
            return Err(SpotifyError::Unauthorized);
        }
        if status == StatusCode::BAD_GATEWAY {
            sleep(Duration::from_secs(10)).await;
            continue; // retry
        }

        let response = response.error_for_status()?;
        return Ok(response.json::<T>().await?);
    }
}
