// Contribution data model.
// Serialized camelCase so cached results and snapshot files share one format.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ContribError;
use crate::github::{Repository, SearchItem, User};

/// How far back to look for merged pull requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateRange {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "3y")]
    ThreeYears,
    #[serde(rename = "1y")]
    OneYear,
}

impl DateRange {
    /// Display order for the range filter.
    pub const ALL: [DateRange; 4] = [
        DateRange::All,
        DateRange::FiveYears,
        DateRange::ThreeYears,
        DateRange::OneYear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::All => "all",
            DateRange::FiveYears => "5y",
            DateRange::ThreeYears => "3y",
            DateRange::OneYear => "1y",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateRange::All => "All Time",
            DateRange::FiveYears => "5 Years",
            DateRange::ThreeYears => "3 Years",
            DateRange::OneYear => "1 Year",
        }
    }

    fn years(&self) -> Option<u32> {
        match self {
            DateRange::All => None,
            DateRange::FiveYears => Some(5),
            DateRange::ThreeYears => Some(3),
            DateRange::OneYear => Some(1),
        }
    }

    /// Inclusive lower bound for merge dates, or None for all time.
    pub fn since(&self, today: NaiveDate) -> Option<NaiveDate> {
        self.years()
            .and_then(|years| today.checked_sub_months(Months::new(12 * years)))
    }

    pub fn next(&self) -> Self {
        match self {
            DateRange::All => DateRange::FiveYears,
            DateRange::FiveYears => DateRange::ThreeYears,
            DateRange::ThreeYears => DateRange::OneYear,
            DateRange::OneYear => DateRange::All,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateRange {
    type Err = ContribError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateRange::ALL
            .into_iter()
            .find(|range| range.as_str() == s)
            .ok_or_else(|| ContribError::Other(format!("unknown date range: {}", s)))
    }
}

/// Repository identity and metadata shown for a contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSummary {
    pub owner: String,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub language: Option<String>,
    pub avatar_url: String,
    pub url: String,
}

/// A merged pull request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestSummary {
    pub title: String,
    pub number: u64,
    pub url: String,
    pub merged_at: DateTime<Utc>,
}

impl From<&SearchItem> for PullRequestSummary {
    fn from(item: &SearchItem) -> Self {
        Self {
            title: item.title.clone(),
            number: item.number,
            url: item.html_url.clone(),
            merged_at: item.merged_at(),
        }
    }
}

/// Everything one user contributed to one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub repo: RepoSummary,
    pub prs: Vec<PullRequestSummary>,
    #[serde(rename = "totalCommits")]
    pub pr_count: usize,
    #[serde(default)]
    pub languages: Vec<String>,
    pub first_contribution: DateTime<Utc>,
    pub last_contribution: DateTime<Utc>,
}

impl Contribution {
    /// Build a contribution from repository details and its merged PRs.
    /// Returns None when `prs` is empty.
    pub fn from_parts(
        full_name: &str,
        repository: &Repository,
        languages: Vec<String>,
        prs: &[SearchItem],
    ) -> Option<Self> {
        let prs: Vec<PullRequestSummary> = prs.iter().map(PullRequestSummary::from).collect();
        let first_contribution = prs.iter().map(|pr| pr.merged_at).min()?;
        let last_contribution = prs.iter().map(|pr| pr.merged_at).max()?;

        let (owner, name) = full_name
            .split_once('/')
            .unwrap_or((repository.owner.login.as_str(), repository.name.as_str()));

        Some(Self {
            repo: RepoSummary {
                owner: owner.to_string(),
                name: name.to_string(),
                full_name: full_name.to_string(),
                description: repository.description.clone(),
                stars: repository.stargazers_count,
                forks: repository.forks_count,
                language: repository.language.clone(),
                avatar_url: repository.owner.avatar_url.clone(),
                url: repository.html_url.clone(),
            },
            pr_count: prs.len(),
            prs,
            languages,
            first_contribution,
            last_contribution,
        })
    }
}

/// Snapshot of a user's public profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: String,
    pub bio: Option<String>,
    pub followers: u64,
    pub following: u64,
    pub public_repos: u64,
    pub url: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            login: user.login,
            name: user.name,
            avatar_url: user.avatar_url,
            bio: user.bio,
            followers: user.followers,
            following: user.following,
            public_repos: user.public_repos,
            url: user.html_url,
        }
    }
}
