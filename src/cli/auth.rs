use crate::{
    auth::{AuthService, AuthorizationLauncher},
    error, success,
};

/// Runs the complete OAuth 2.0 PKCE login flow.
///
/// Builds the authorization URL (persisting the PKCE verifier), hands it
/// to the launcher for the consent step, then exchanges the returned
/// authorization code for tokens. A denied consent or a timed-out
/// callback ends the command with an error and leaves no partial
/// credentials behind.
pub async fn auth(service: &AuthService, launcher: &impl AuthorizationLauncher) {
    let auth_url = match service.login_url() {
        Ok(url) => url,
        Err(e) => error!("Failed to build the authorization URL: {}", e),
    };

    let code = match launcher.authorize(&auth_url).await {
        Ok(code) => code,
        Err(e) => error!("Authentication failed: {}", e),
    };

    match service.fetch_access_token(&code).await {
        Ok(_) => success!("Authentication successful!"),
        Err(e) => error!("Token exchange failed: {}", e),
    }
}

/// Removes all stored credentials. Safe to run when already logged out.
pub fn logout(service: &AuthService) {
    service.logout();
    success!("Logged out. Stored credentials have been removed.");
}
