// Search query construction.
// Builds the issue search DSL strings and the one-year windows for full history.

use chrono::{Datelike, NaiveDate};

/// Results per search page (API maximum).
pub const PER_PAGE: u32 = 100;

/// Search caps at 1000 results per query: 10 pages of 100.
pub const MAX_PAGES: u32 = 10;

/// Years before the current one searched for full history.
pub const MAX_YEARS_BACK: i32 = 15;

/// Consecutive empty years that end a full-history walk.
pub const MAX_EMPTY_YEARS: u32 = 3;

/// Merged public PRs by `username` outside repositories they own.
pub fn base_query(username: &str) -> String {
    format!(
        "type:pr author:{} is:merged is:public -user:{}",
        username, username
    )
}

/// PRs merged on or after `since`.
pub fn since_query(username: &str, since: NaiveDate) -> String {
    format!("{} merged:>={}", base_query(username), since)
}

/// One calendar year (or its elapsed part) of merge dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    pub year: i32,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl YearWindow {
    pub fn query(&self, username: &str) -> String {
        format!("{} merged:{}..{}", base_query(username), self.from, self.to)
    }
}

/// Windows from the current year back `MAX_YEARS_BACK` years, newest first.
/// The current year's window ends today.
pub fn year_windows(today: NaiveDate) -> Vec<YearWindow> {
    let current = today.year();
    (0..=MAX_YEARS_BACK)
        .filter_map(|back| {
            let year = current - back;
            let from = NaiveDate::from_ymd_opt(year, 1, 1)?;
            let to = if back == 0 {
                today
            } else {
                NaiveDate::from_ymd_opt(year, 12, 31)?
            };
            Some(YearWindow { year, from, to })
        })
        .collect()
}
