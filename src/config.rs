// Environment configuration.
// Read once at startup; unset values fall back to defaults with a log line.

use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

use crate::error::{ContribError, Result};
use crate::github::GITHUB_API_BASE;
use crate::storage::file::data_dir;

/// Public OAuth app client id used when none is configured.
pub const DEFAULT_CLIENT_ID: &str = "Ov23ctyJPmK7DOEmg85J";
pub const DEFAULT_AUTH_PROXY_URL: &str = "http://localhost:3000/api/auth";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/callback";
pub const DEFAULT_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
/// Byte limit of the persistent store, in line with browser local storage.
pub const DEFAULT_STORE_QUOTA: u64 = 5 * 1024 * 1024;

/// Settings for the dashboard and `precache`.
#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: Option<String>,
    pub api_url: String,
    pub client_id: String,
    pub auth_proxy_url: String,
    pub redirect_uri: String,
    pub data_dir: PathBuf,
    pub snapshot_dir: PathBuf,
    /// Total bytes the persistent store may hold before cache eviction kicks in.
    pub store_quota: u64,
}

impl Config {
    pub fn load() -> Self {
        let data_dir = match optional("CONTRIBS_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => data_dir().unwrap_or_else(|| {
                warn!("No home directory found, storing data in ./.contribs");
                PathBuf::from(".contribs")
            }),
        };
        let snapshot_dir = optional("CONTRIBS_SNAPSHOT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("precache"));

        Self {
            github_token: optional("GITHUB_TOKEN").filter(|t| !t.is_empty()),
            api_url: with_default("CONTRIBS_API_URL", GITHUB_API_BASE),
            client_id: with_default("CONTRIBS_CLIENT_ID", DEFAULT_CLIENT_ID),
            auth_proxy_url: with_default("CONTRIBS_AUTH_PROXY_URL", DEFAULT_AUTH_PROXY_URL),
            redirect_uri: with_default("CONTRIBS_REDIRECT_URI", DEFAULT_REDIRECT_URI),
            data_dir,
            snapshot_dir,
            store_quota: try_load("CONTRIBS_STORE_QUOTA", &DEFAULT_STORE_QUOTA.to_string())
                .unwrap_or(DEFAULT_STORE_QUOTA),
        }
    }

    /// Where the TUI writes its log file.
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("contribs.log")
    }

    /// Root of the persistent key-value store.
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }
}

/// Settings for the OAuth code exchange server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        Ok(Self {
            port: try_load("PORT", "3000")?,
            client_id: required("GITHUB_CLIENT_ID")?,
            client_secret: required("GITHUB_CLIENT_SECRET")?,
            token_url: with_default("GITHUB_TOKEN_URL", DEFAULT_TOKEN_URL),
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn with_default(key: &str, default: &str) -> String {
    optional(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn required(key: &'static str) -> Result<String> {
    match optional(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => {
            warn!("Environment variable {key} not found");
            Err(ContribError::MissingEnv(key))
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    with_default(key, default).parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        ContribError::Other(format!("invalid {key}: {e}"))
    })
}
