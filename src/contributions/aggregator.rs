// Contribution aggregator.
// Searches merged PRs, groups them per repository, and attaches repository details.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::ResultCache;
use crate::error::Result;
use crate::github::{GitHubApi, Repository, SearchItem};

use super::query::{
    MAX_EMPTY_YEARS, MAX_PAGES, PER_PAGE, YearWindow, since_query, year_windows,
};
use super::snapshot::SnapshotDir;
use super::types::{Contribution, DateRange};

/// Cache prefix for aggregated results, keyed by username and range.
const CONTRIBUTIONS_PREFIX: &str = "contribs";

/// Cache prefix for per-repository details, keyed by full name.
const REPO_PREFIX: &str = "repo";

/// Delays between sequential requests to stay clear of secondary rate limits.
#[derive(Debug, Clone)]
pub struct Pacing {
    pub page_delay: Duration,
    pub window_delay: Duration,
    pub repo_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_millis(500),
            window_delay: Duration::from_millis(200),
            repo_delay: Duration::from_millis(100),
        }
    }
}

impl Pacing {
    /// No delays at all.
    pub fn none() -> Self {
        Self {
            page_delay: Duration::ZERO,
            window_delay: Duration::ZERO,
            repo_delay: Duration::ZERO,
        }
    }
}

/// Repository metadata plus languages, cached per repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoDetails {
    pub repository: Repository,
    pub languages: Vec<String>,
}

/// Builds a user's contribution list from the GitHub API.
pub struct Aggregator<'a, A: GitHubApi> {
    api: &'a mut A,
    cache: ResultCache,
    snapshots: Option<SnapshotDir>,
    pacing: Pacing,
    today: Option<NaiveDate>,
}

impl<'a, A: GitHubApi> Aggregator<'a, A> {
    pub fn new(api: &'a mut A, cache: ResultCache) -> Self {
        Self {
            api,
            cache,
            snapshots: None,
            pacing: Pacing::default(),
            today: None,
        }
    }

    /// Consult pre-generated snapshots for full-history requests.
    pub fn with_snapshots(mut self, snapshots: SnapshotDir) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Pin the date used for search windows.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Aggregate `username`'s merged contributions, most-starred first.
    ///
    /// `on_progress` receives a status message and a completion percentage.
    /// Search failures abort the whole call; a repository whose details
    /// cannot be fetched is left out.
    pub async fn aggregate<F>(
        &mut self,
        username: &str,
        range: DateRange,
        mut on_progress: F,
    ) -> Result<Vec<Contribution>>
    where
        F: FnMut(&str, u8) + Send,
    {
        let key_parts = [username, range.as_str()];

        if let Some(cached) = self
            .cache
            .get::<Vec<Contribution>>(CONTRIBUTIONS_PREFIX, &key_parts)
        {
            debug!(username, %range, "contributions served from cache");
            on_progress("Loaded from cache", 100);
            return Ok(cached);
        }

        if range == DateRange::All {
            if let Some(contributions) = self.load_snapshot(username) {
                self.cache
                    .set(&contributions, CONTRIBUTIONS_PREFIX, &key_parts);
                on_progress("Loaded from snapshot", 100);
                return Ok(contributions);
            }
        }

        on_progress("Searching for merged pull requests...", 5);

        let items = match range.since(self.today()) {
            None => self.search_all_years(username, &mut on_progress).await?,
            Some(since) => {
                let query = since_query(username, since);
                self.search_paginated(&query, |found, total| {
                    on_progress(
                        &format!("Found {} of {} PRs...", found, total),
                        search_percent(found as u64, total),
                    );
                })
                .await?
            }
        };

        let items = dedupe(items);
        info!(username, %range, prs = items.len(), "search finished");
        on_progress(&format!("Processing {} contributions...", items.len()), 75);

        let groups = group_by_repo(items);
        let total = groups.len();
        let mut contributions = Vec::with_capacity(total);

        for (processed, (full_name, prs)) in groups.into_iter().enumerate() {
            if processed > 0 {
                tokio::time::sleep(self.pacing.repo_delay).await;
            }

            match self.repo_details(&full_name).await {
                Ok(details) => {
                    if let Some(contribution) = Contribution::from_parts(
                        &full_name,
                        &details.repository,
                        details.languages,
                        &prs,
                    ) {
                        contributions.push(contribution);
                    }
                }
                // Deleted or now-private repositories are skipped
                Err(e) => warn!(repo = %full_name, error = %e, "skipping repository"),
            }

            let done = processed + 1;
            on_progress(
                &format!("Fetching repo details... {}/{}", done, total),
                (75 + done * 20 / total) as u8,
            );
        }

        contributions.sort_by(|a, b| b.repo.stars.cmp(&a.repo.stars));
        self.cache
            .set(&contributions, CONTRIBUTIONS_PREFIX, &key_parts);

        on_progress("Done!", 100);
        Ok(contributions)
    }

    fn load_snapshot(&self, username: &str) -> Option<Vec<Contribution>> {
        let snapshots = self.snapshots.as_ref()?;
        match snapshots.load(username) {
            Ok(Some(snapshot)) => {
                debug!(username, generated_at = %snapshot.generated_at, "using snapshot");
                Some(snapshot.contributions)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(username, error = %e, "ignoring unreadable snapshot");
                None
            }
        }
    }

    /// Walk one-year windows back from today, past the 1000-result search cap.
    async fn search_all_years<F>(
        &mut self,
        username: &str,
        on_progress: &mut F,
    ) -> Result<Vec<SearchItem>>
    where
        F: FnMut(&str, u8) + Send,
    {
        let windows = year_windows(self.today());
        let window_count = windows.len();
        let mut all = Vec::new();
        let mut empty_streak = 0;

        for (i, window) in windows.into_iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.pacing.window_delay).await;
            }

            let YearWindow { year, .. } = window;
            let items = self
                .search_paginated(&window.query(username), |_, _| {})
                .await?;
            debug!(username, year, prs = items.len(), "searched year");

            if items.is_empty() {
                empty_streak += 1;
            } else {
                empty_streak = 0;
                all.extend(items);
            }

            on_progress(
                &format!("Searched {}: {} PRs so far...", year, all.len()),
                (10 + (i + 1) * 60 / window_count).min(70) as u8,
            );

            if empty_streak >= MAX_EMPTY_YEARS {
                debug!(username, year, "no PRs for consecutive years, stopping");
                break;
            }
        }

        Ok(all)
    }

    /// Fetch up to `MAX_PAGES` pages of a query.
    async fn search_paginated<P>(&mut self, query: &str, mut on_page: P) -> Result<Vec<SearchItem>>
    where
        P: FnMut(usize, u64) + Send,
    {
        let mut items = Vec::new();

        for page in 1..=MAX_PAGES {
            if page > 1 {
                tokio::time::sleep(self.pacing.page_delay).await;
            }

            let result = self.api.search_issues(query, page, PER_PAGE).await?;
            let received = result.items.len();
            items.extend(result.items);
            on_page(items.len(), result.total_count);

            if received < PER_PAGE as usize || items.len() as u64 >= result.total_count {
                break;
            }
        }

        Ok(items)
    }

    /// Repository details from the cache, else the API (then cached).
    async fn repo_details(&mut self, full_name: &str) -> Result<RepoDetails> {
        if let Some(details) = self.cache.get::<RepoDetails>(REPO_PREFIX, &[full_name]) {
            return Ok(details);
        }

        let repository = self.api.repository(full_name).await?;
        let languages = match self.api.languages(full_name).await {
            Ok(languages) => languages,
            Err(e) => {
                debug!(repo = full_name, error = %e, "languages unavailable");
                Vec::new()
            }
        };

        let details = RepoDetails {
            repository,
            languages,
        };
        self.cache.set(&details, REPO_PREFIX, &[full_name]);
        Ok(details)
    }
}

/// Search progress: 10% plus up to 60% by share found, capped at 70%.
fn search_percent(found: u64, total: u64) -> u8 {
    (10 + found * 60 / total.max(1)).min(70) as u8
}

/// Drop items whose id was already seen, keeping the first occurrence.
pub fn dedupe(items: Vec<SearchItem>) -> Vec<SearchItem> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(item.id)).collect()
}

/// Group items by repository full name, in first-seen order.
pub fn group_by_repo(items: Vec<SearchItem>) -> Vec<(String, Vec<SearchItem>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<SearchItem>)> = Vec::new();

    for item in items {
        let full_name = item.repo_full_name();
        match index.get(&full_name) {
            Some(&i) => groups[i].1.push(item),
            None => {
                index.insert(full_name.clone(), groups.len());
                groups.push((full_name, vec![item]));
            }
        }
    }

    groups
}
