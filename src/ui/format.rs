// Display formatting helpers.

use chrono::{DateTime, Utc};
use ratatui::style::Color;

/// Compact count for hero stats: 950, 1.2k, 3.4M.
pub fn format_number(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}k", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Compact star count for cards (never switches to millions).
pub fn format_stars(n: u64) -> String {
    if n >= 1_000 {
        format!("{:.1}k", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Coarse age of a timestamp: days under a month, then months, then years.
pub fn time_ago(dt: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = now.signed_duration_since(*dt).num_days().max(0);

    if days < 30 {
        format!("{}d ago", days)
    } else if days < 365 {
        format!("{}mo ago", days / 30)
    } else {
        format!("{}y ago", days / 365)
    }
}

/// Terminal color for a `#rrggbb` string; gray when it does not parse.
pub fn hex_color(hex: &str) -> Color {
    hex.parse().unwrap_or(Color::Gray)
}
