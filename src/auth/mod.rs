//! # Authentication Module
//!
//! OAuth 2.0 PKCE authentication and token lifecycle management for the
//! Spotify Web API. This is the one part of the application with real
//! protocol state: everything else either renders data or wraps a GET.
//!
//! Three collaborating pieces:
//!
//! - [`pkce`] - pure generation of the code verifier/challenge pair
//! - [`store`] - keyring-backed storage of the persisted secrets
//! - [`service`] - the lifecycle manager: login URL, code-for-token
//!   exchange, refresh-on-demand, expiry checks and logout
//!
//! plus [`launcher`], the pluggable consent front end (the service holds
//! the single token-exchange path; launchers only differ in how the user
//! sees the consent screen).

pub mod launcher;
pub mod pkce;
pub mod service;
pub mod store;

pub use launcher::{AuthorizationLauncher, LocalServerLauncher};
pub use service::{AuthConfig, AuthError, AuthService, Clock, SystemClock};
pub use store::{KeyringStore, SecretStore, TokenStore};
