use crate::{auth::AuthService, info, success, types::SessionState, warning};

/// Prints the current session status.
pub fn info(service: &AuthService) {
    match service.session_snapshot() {
        SessionState::Active { expires_at } => {
            success!(
                "Logged in. Access token valid until {}.",
                expires_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        SessionState::Refreshable => {
            info!("Access token expired; it will be refreshed on the next request.");
        }
        SessionState::LoggedOut => {
            warning!("Not logged in. Run sptopcli auth first.");
        }
    }
}
