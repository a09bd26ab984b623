// GitHub API response types.
// Defines structs for deserializing GitHub REST and search API responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Owner of a repository (user or organization).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// GitHub user account as returned by `/users/{login}` and `/user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: String,
    pub bio: Option<String>,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub html_url: String,
}

/// GitHub repository metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub owner: Owner,
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    pub language: Option<String>,
    pub html_url: String,
}

/// Pull request details embedded in an issue search result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PullRequestRef {
    pub merged_at: Option<DateTime<Utc>>,
}

/// One issue or pull request from `/search/issues`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchItem {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub html_url: String,
    /// API URL of the owning repository, e.g. `https://api.github.com/repos/o/r`.
    pub repository_url: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub pull_request: Option<PullRequestRef>,
}

impl SearchItem {
    /// `owner/name` of the repository this item belongs to.
    pub fn repo_full_name(&self) -> String {
        let mut segments = self.repository_url.trim_end_matches('/').rsplit('/');
        match (segments.next(), segments.next()) {
            (Some(name), Some(owner)) => format!("{}/{}", owner, name),
            _ => self.repository_url.clone(),
        }
    }

    /// When the item was merged, falling back to close and creation time.
    pub fn merged_at(&self) -> DateTime<Utc> {
        self.pull_request
            .as_ref()
            .and_then(|pr| pr.merged_at)
            .or(self.closed_at)
            .unwrap_or(self.created_at)
    }
}

/// One page of issue search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    pub items: Vec<SearchItem>,
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(json: serde_json::Value) -> SearchItem {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_search_item_repo_and_merge_time() {
        let merged = item(serde_json::json!({
            "id": 1,
            "number": 7,
            "title": "Fix typo",
            "html_url": "https://github.com/rust-lang/rust/pull/7",
            "repository_url": "https://api.github.com/repos/rust-lang/rust",
            "created_at": "2020-01-01T00:00:00Z",
            "closed_at": "2020-01-03T00:00:00Z",
            "pull_request": { "merged_at": "2020-01-02T00:00:00Z" }
        }));
        assert_eq!(merged.repo_full_name(), "rust-lang/rust");
        assert_eq!(merged.merged_at().to_rfc3339(), "2020-01-02T00:00:00+00:00");

        let closed_only = item(serde_json::json!({
            "id": 2,
            "number": 8,
            "title": "Docs",
            "html_url": "https://github.com/o/r/pull/8",
            "repository_url": "https://api.github.com/repos/o/r",
            "created_at": "2020-01-01T00:00:00Z",
            "closed_at": "2020-01-05T00:00:00Z",
            "pull_request": { "merged_at": null }
        }));
        assert_eq!(closed_only.merged_at().to_rfc3339(), "2020-01-05T00:00:00+00:00");

        let bare = item(serde_json::json!({
            "id": 3,
            "number": 9,
            "title": "Old",
            "html_url": "https://github.com/o/r/pull/9",
            "repository_url": "https://api.github.com/repos/o/r",
            "created_at": "2019-06-01T00:00:00Z",
            "closed_at": null
        }));
        assert_eq!(bare.merged_at().to_rfc3339(), "2019-06-01T00:00:00+00:00");
    }
}
