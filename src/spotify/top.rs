use crate::{
    auth::AuthService,
    config,
    spotify::SpotifyError,
    types::{Artist, TopArtistsResponse, TopTracksResponse, Track},
    utils::TimeRange,
};

/// Retrieves the user's top tracks for a time range.
///
/// Wraps `GET /me/top/tracks`. `limit` is capped by the API at 50; the
/// caller passes it through unchanged so the server stays authoritative.
///
/// # Example
///
/// ```
/// let tracks = top_tracks(&auth, TimeRange::Medium, 20).await?;
/// println!("all-time favourite: {}", tracks[0].name);
/// ```
pub async fn top_tracks(
    auth: &AuthService,
    time_range: TimeRange,
    limit: u8,
) -> Result<Vec<Track>, SpotifyError> {
    let api_url = format!(
        "{uri}/me/top/tracks?limit={limit}&time_range={time_range}",
        uri = &config::spotify_apiurl(),
    );

    let res: TopTracksResponse = super::get_json(auth, &api_url).await?;
    Ok(res.items)
}

/// Retrieves the user's top artists for a time range.
///
/// Wraps `GET /me/top/artists`; same shape and limits as
/// [`top_tracks`].
pub async fn top_artists(
    auth: &AuthService,
    time_range: TimeRange,
    limit: u8,
) -> Result<Vec<Artist>, SpotifyError> {
    let api_url = format!(
        "{uri}/me/top/artists?limit={limit}&time_range={time_range}",
        uri = &config::spotify_apiurl(),
    );

    let res: TopArtistsResponse = super::get_json(auth, &api_url).await?;
    Ok(res.items)
}
