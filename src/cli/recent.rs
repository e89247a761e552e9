use tabled::Table;

use crate::{
    auth::AuthService, cli::fetch_spinner, error, spotify, types::RecentTableRow, utils, warning,
};

/// Fetches and prints the user's recently played tracks as a table.
pub async fn recent(service: &AuthService, limit: u8) {
    let pb = fetch_spinner("Fetching recently played tracks...");
    let result = spotify::player::recently_played(service, limit).await;
    pb.finish_and_clear();

    let items = match result {
        Ok(items) => items,
        Err(e) => error!("Failed to fetch recently played tracks: {}", e),
    };

    if items.is_empty() {
        warning!("No listening history yet.");
        return;
    }

    let table_rows: Vec<RecentTableRow> = items
        .into_iter()
        .map(|item| RecentTableRow {
            played_at: utils::format_played_at(&item.played_at),
            name: item.track.name,
            artists: utils::join_artist_names(item.track.artists.into_iter().map(|a| a.name)),
        })
        .collect();

    let table = Table::new(table_rows);
    println!("{}", table);
}
