//! # API Module
//!
//! HTTP endpoints for the local callback server that runs during the
//! OAuth 2.0 PKCE login flow.
//!
//! - [`callback`] - receives the redirect from Spotify's authorization
//!   server and hands the authorization code (or the denial) over to the
//!   waiting launcher. The token exchange itself happens in
//!   [`crate::auth::AuthService`]; this endpoint only delivers the
//!   callback outcome, so the exchange logic exists in exactly one place
//!   regardless of which launcher presented the consent screen.
//! - [`health`] - status and version information for quick checks that
//!   the callback server is up.
//!
//! Both endpoints are plain async [`axum`] handlers wired up by
//! [`crate::server::start_api_server`].

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
