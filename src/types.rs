use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Token endpoint response for both the authorization-code exchange and
/// the refresh grant. `refresh_token` is optional: Spotify may omit it on
/// refresh, which means "keep using the previous one".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub refresh_token: Option<String>,
}

/// Outcome delivered by the OAuth callback endpoint to the waiting
/// authorization launcher.
#[derive(Debug, Clone)]
pub enum CallbackOutcome {
    /// Authorization succeeded; the query carried a `code` parameter.
    Code(String),
    /// The user denied the request or the provider reported an error.
    Denied(String),
}

/// Session state as observed through the auth service.
///
/// `Active` and `LoggedOut` are broadcast on the service's watch channel
/// whenever credentials are persisted or wiped. `Refreshable` only shows
/// up in snapshots: the access token has expired but a refresh token is
/// on record, so the next API call will refresh transparently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active {
        expires_at: chrono::DateTime<chrono::Utc>,
    },
    Refreshable,
    LoggedOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopTracksResponse {
    pub items: Vec<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: Vec<TrackArtist>,
    pub album: AlbumRef,
    pub duration_ms: u64,
    pub popularity: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopArtistsResponse {
    pub items: Vec<Artist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub genres: Vec<String>,
    pub popularity: Option<u32>,
    pub followers: Option<Followers>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Followers {
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentlyPlayedResponse {
    pub items: Vec<PlayHistoryItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayHistoryItem {
    pub track: Track,
    pub played_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub country: Option<String>,
    pub product: Option<String>,
    pub followers: Option<Followers>,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    #[tabled(rename = "#")]
    pub position: usize,
    pub name: String,
    pub artists: String,
    pub album: String,
    pub length: String,
}

#[derive(Tabled)]
pub struct ArtistTableRow {
    #[tabled(rename = "#")]
    pub position: usize,
    pub name: String,
    pub genres: String,
}

#[derive(Tabled)]
pub struct RecentTableRow {
    pub played_at: String,
    pub name: String,
    pub artists: String,
}
