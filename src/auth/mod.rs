// Sign-in support.
// Persisted bearer token, OAuth authorize URL, and the code exchange client.

pub mod server;

use std::sync::Arc;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ContribError, Result};
use crate::storage::KeyValueStore;

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "gh_token";

pub const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";

/// Permission requested at sign-in.
pub const SCOPE: &str = "read:user";

/// The signed-in user's bearer token.
///
/// An override (from `GITHUB_TOKEN`) wins over the stored value but is never
/// written or cleared.
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
    override_token: Option<String>,
}

impl TokenStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            override_token: None,
        }
    }

    pub fn with_override(mut self, token: Option<String>) -> Self {
        self.override_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn get(&self) -> Option<String> {
        if let Some(token) = &self.override_token {
            return Some(token.clone());
        }

        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "failed to read stored token");
                None
            }
        }
    }

    pub fn set(&self, token: &str) -> Result<()> {
        self.store.set(TOKEN_KEY, token)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }

    /// True when the token comes from the environment rather than storage.
    pub fn is_overridden(&self) -> bool {
        self.override_token.is_some()
    }
}

/// Authorize URL that sends the user back to `redirect_uri` with `state`
/// set to the route to resume (default `/`).
pub fn login_url(client_id: &str, redirect_uri: &str, return_path: Option<&str>) -> String {
    let state = return_path.unwrap_or("/");
    match Url::parse_with_params(
        AUTHORIZE_URL,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("scope", SCOPE),
            ("state", state),
        ],
    ) {
        Ok(url) => url.to_string(),
        Err(_) => AUTHORIZE_URL.to_string(),
    }
}

#[derive(Serialize)]
struct CodeRequest<'a> {
    code: &'a str,
}

#[derive(Deserialize)]
struct ExchangeResponse {
    access_token: Option<String>,
    error: Option<String>,
}

/// Trade an authorization code for a token via the exchange server.
pub async fn exchange_code(http: &Client, proxy_url: &str, code: &str) -> Result<String> {
    debug!(proxy_url, "exchanging authorization code");
    let response = http
        .post(proxy_url)
        .json(&CodeRequest { code })
        .send()
        .await?;

    if !response.status().is_success() {
        warn!(status = %response.status(), "code exchange rejected");
        return Err(ContribError::Auth("Failed to exchange code".to_string()));
    }

    let payload: ExchangeResponse = response.json().await?;
    if let Some(error) = payload.error {
        return Err(ContribError::Auth(error));
    }

    payload
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ContribError::Auth("No access token in response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_token_store() {
        let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
        assert!(!tokens.is_authenticated());

        tokens.set("abc").unwrap();
        assert_eq!(tokens.get().as_deref(), Some("abc"));
        assert!(tokens.is_authenticated());

        tokens.clear().unwrap();
        assert_eq!(tokens.get(), None);

        // Empty values do not count as signed in
        tokens.set("").unwrap();
        assert!(!tokens.is_authenticated());
    }

    #[test]
    fn test_override_wins() {
        let store = Arc::new(MemoryStore::new());
        let tokens = TokenStore::new(store.clone()).with_override(Some("env".to_string()));
        tokens.set("stored").unwrap();

        assert_eq!(tokens.get().as_deref(), Some("env"));
        assert!(tokens.is_overridden());
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("stored"));

        let tokens = TokenStore::new(store).with_override(Some(String::new()));
        assert_eq!(tokens.get().as_deref(), Some("stored"));
    }

    #[test]
    fn test_login_url() {
        let url = login_url("client123", "http://localhost:5173/callback", Some("/octocat"));
        assert!(url.starts_with(AUTHORIZE_URL));

        let parsed = Url::parse(&url).unwrap();
        let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("client_id".to_string(), "client123".to_string()),
                (
                    "redirect_uri".to_string(),
                    "http://localhost:5173/callback".to_string()
                ),
                ("scope".to_string(), "read:user".to_string()),
                ("state".to_string(), "/octocat".to_string()),
            ]
        );

        let url = Url::parse(&login_url("c", "http://x/callback", None)).unwrap();
        assert!(url.query_pairs().any(|(k, v)| k == "state" && v == "/"));
    }
}
