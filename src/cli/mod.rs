//! # CLI Module
//!
//! User-facing command implementations. Each command wires user input to
//! the auth service and the Spotify endpoint wrappers, handles progress
//! feedback and renders the result as a table or status line.
//!
//! ## Commands
//!
//! - [`auth`] / [`logout`] - OAuth 2.0 PKCE login flow and session reset
//! - [`top_tracks`] / [`top_artists`] - listening-history rankings
//! - [`recent`] - recently played tracks
//! - [`profile`] - the authenticated user's profile
//! - [`info`] - session status (logged in / token expired / logged out)
//!
//! Commands print through the output macros in the crate root and
//! terminate the process via `error!` on unrecoverable failures; all
//! recoverable decisions stay inside the auth service.

mod auth;
mod info;
mod profile;
mod recent;
mod top;

pub use auth::auth;
pub use auth::logout;
pub use info::info;
pub use profile::profile;
pub use recent::recent;
pub use top::top_artists;
pub use top::top_tracks;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner shown while a network fetch is in flight.
pub(crate) fn fetch_spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
