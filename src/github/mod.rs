// GitHub API module.
// Provides the client, retry policy, and types for the GitHub REST API.

pub mod client;
pub mod endpoints;
pub mod retry;
pub mod types;

pub use client::{GITHUB_API_BASE, GitHubClient};
pub use retry::RetryPolicy;
pub use types::*;

use async_trait::async_trait;

use crate::error::Result;

/// The slice of the GitHub API the contribution aggregator consumes.
#[async_trait]
pub trait GitHubApi: Send {
    /// Look up a user by login.
    async fn user(&mut self, username: &str) -> Result<User>;

    /// One page of `/search/issues` results.
    async fn search_issues(&mut self, query: &str, page: u32, per_page: u32) -> Result<SearchPage>;

    /// Repository metadata by `owner/name`.
    async fn repository(&mut self, full_name: &str) -> Result<Repository>;

    /// Repository languages, largest first.
    async fn languages(&mut self, full_name: &str) -> Result<Vec<String>>;
}
