use crate::{
    auth::AuthService,
    config,
    spotify::SpotifyError,
    types::{PlayHistoryItem, RecentlyPlayedResponse},
};

/// Retrieves the user's most recently played tracks.
///
/// Wraps `GET /me/player/recently-played`. Items come back newest first
/// with their `played_at` timestamps.
pub async fn recently_played(
    auth: &AuthService,
    limit: u8,
) -> Result<Vec<PlayHistoryItem>, SpotifyError> {
    let api_url = format!(
        "{uri}/me/player/recently-played?limit={limit}",
        uri = &config::spotify_apiurl(),
    );

    let res: RecentlyPlayedResponse = super::get_json(auth, &api_url).await?;
    Ok(res.items)
}
