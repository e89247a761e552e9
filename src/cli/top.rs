use tabled::Table;

use crate::{
    auth::AuthService,
    cli::fetch_spinner,
    error, spotify,
    types::{ArtistTableRow, TrackTableRow},
    utils::{self, TimeRange},
    warning,
};

/// Fetches and prints the user's top tracks as a table.
pub async fn top_tracks(service: &AuthService, time_range: TimeRange, limit: u8) {
    let pb = fetch_spinner("Fetching top tracks...");
    let result = spotify::top::top_tracks(service, time_range, limit).await;
    pb.finish_and_clear();

    let tracks = match result {
        Ok(tracks) => tracks,
        Err(e) => error!("Failed to fetch top tracks: {}", e),
    };

    if tracks.is_empty() {
        warning!("No top tracks for this time range yet.");
        return;
    }

    let table_rows: Vec<TrackTableRow> = tracks
        .into_iter()
        .enumerate()
        .map(|(i, track)| TrackTableRow {
            position: i + 1,
            name: track.name,
            artists: utils::join_artist_names(track.artists.into_iter().map(|a| a.name)),
            album: track.album.name,
            length: utils::format_track_length(track.duration_ms),
        })
        .collect();

    let table = Table::new(table_rows);
    println!("{}", table);
}

/// Fetches and prints the user's top artists as a table.
pub async fn top_artists(service: &AuthService, time_range: TimeRange, limit: u8) {
    let pb = fetch_spinner("Fetching top artists...");
    let result = spotify::top::top_artists(service, time_range, limit).await;
    pb.finish_and_clear();

    let artists = match result {
        Ok(artists) => artists,
        Err(e) => error!("Failed to fetch top artists: {}", e),
    };

    if artists.is_empty() {
        warning!("No top artists for this time range yet.");
        return;
    }

    let table_rows: Vec<ArtistTableRow> = artists
        .into_iter()
        .enumerate()
        .map(|(i, artist)| ArtistTableRow {
            position: i + 1,
            name: artist.name,
            genres: artist
                .genres
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(","),
        })
        .collect();

    let table = Table::new(table_rows);
    println!("{}", table);
}
