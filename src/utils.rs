use std::fmt;

use chrono::{DateTime, Utc};

/// Time window Spotify aggregates top tracks/artists over.
///
/// Maps onto the API's `time_range` parameter: `short_term` (~4 weeks),
/// `medium_term` (~6 months) and `long_term` (several years).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Short,
    Medium,
    Long,
}

impl TimeRange {
    pub const ALL: [TimeRange; 3] = [TimeRange::Short, TimeRange::Medium, TimeRange::Long];
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::Medium
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeRange::Short => "short_term",
            TimeRange::Medium => "medium_term",
            TimeRange::Long => "long_term",
        };
        write!(f, "{}", s)
    }
}

/// Parses a `--time-range` CLI value into a [`TimeRange`].
///
/// Accepts the API values (`short_term`, ...) as well as the bare words
/// `short`, `medium` and `long`, case-insensitively.
pub fn parse_time_range(input: &str) -> Result<TimeRange, String> {
    let normalized = input.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err("time range cannot be empty".to_string());
    }

    match normalized.as_str() {
        "short" | "short_term" => Ok(TimeRange::Short),
        "medium" | "medium_term" => Ok(TimeRange::Medium),
        "long" | "long_term" => Ok(TimeRange::Long),
        other => Err(format!(
            "invalid value '{}' (expected one of: short, medium, long)",
            other
        )),
    }
}

/// Formats a track duration in milliseconds as `m:ss`.
pub fn format_track_length(duration_ms: u64) -> String {
    let total_seconds = duration_ms / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Formats an RFC 3339 `played_at` timestamp as a compact local-agnostic
/// `YYYY-MM-DD HH:MM` string. Unparsable input is returned unchanged so a
/// malformed API value never breaks the listing.
pub fn format_played_at(played_at: &str) -> String {
    match played_at.parse::<DateTime<Utc>>() {
        Ok(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => played_at.to_string(),
    }
}

/// Joins artist names for table display.
pub fn join_artist_names(names: impl IntoIterator<Item = String>) -> String {
    names.into_iter().collect::<Vec<_>>().join(", ")
}
