use crate::{auth::AuthService, config, spotify::SpotifyError, types::UserProfile};

/// Retrieves the authenticated user's profile (`GET /me`).
pub async fn current_user_profile(auth: &AuthService) -> Result<UserProfile, SpotifyError> {
    let api_url = format!("{uri}/me", uri = &config::spotify_apiurl());
    super::get_json(auth, &api_url).await
}
