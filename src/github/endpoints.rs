// GitHub API endpoint functions.
// Typed methods for the user, search, repository, and language endpoints.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;

use super::GitHubApi;
use super::client::GitHubClient;
use super::types::{Repository, SearchPage, User};

impl GitHubClient {
    /// Get the authenticated user.
    pub async fn get_current_user(&mut self) -> Result<User> {
        let response = self.get("/user").await?;
        let user: User = response.json().await?;
        Ok(user)
    }

    /// Get a user by login.
    pub async fn get_user(&mut self, username: &str) -> Result<User> {
        let response = self.get(&format!("/users/{}", username)).await?;
        let user: User = response.json().await?;
        Ok(user)
    }

    /// Search issues and pull requests, newest first.
    pub async fn search_issues(
        &mut self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage> {
        let params = [
            ("q", query),
            ("sort", "created"),
            ("order", "desc"),
            ("per_page", &per_page.to_string()),
            ("page", &page.to_string()),
        ];
        let response = self.get_with_params("/search/issues", &params).await?;
        let search: SearchPage = response.json().await?;
        Ok(search)
    }

    /// Get a repository by `owner/name`.
    pub async fn get_repo(&mut self, full_name: &str) -> Result<Repository> {
        let response = self.get(&format!("/repos/{}", full_name)).await?;
        let repository: Repository = response.json().await?;
        Ok(repository)
    }

    /// Get the languages of a repository, largest first.
    pub async fn get_languages(&mut self, full_name: &str) -> Result<Vec<String>> {
        let response = self
            .get(&format!("/repos/{}/languages", full_name))
            .await?;
        let bytes: HashMap<String, u64> = response.json().await?;
        Ok(rank_languages(bytes))
    }
}

/// Order languages by byte count, descending, then by name.
fn rank_languages(bytes: HashMap<String, u64>) -> Vec<String> {
    let mut ranked: Vec<(String, u64)> = bytes.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().map(|(lang, _)| lang).collect()
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn user(&mut self, username: &str) -> Result<User> {
        self.get_user(username).await
    }

    async fn search_issues(&mut self, query: &str, page: u32, per_page: u32) -> Result<SearchPage> {
        GitHubClient::search_issues(self, query, page, per_page).await
    }

    async fn repository(&mut self, full_name: &str) -> Result<Repository> {
        self.get_repo(full_name).await
    }

    async fn languages(&mut self, full_name: &str) -> Result<Vec<String>> {
        self.get_languages(full_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_languages() {
        let bytes = HashMap::from([
            ("Shell".to_string(), 10),
            ("Rust".to_string(), 5000),
            ("C".to_string(), 10),
            ("Python".to_string(), 300),
        ]);
        assert_eq!(rank_languages(bytes), vec!["Rust", "Python", "C", "Shell"]);
    }
}
