// Error types for contribs.
// Covers GitHub API failures, storage failures, OAuth exchange, and configuration.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContribError {
    #[error("GitHub API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Authentication failed: invalid or expired token")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("Storage quota exceeded writing {key}")]
    QuotaExceeded { key: String },

    #[error("Sign-in failed: {0}")]
    Auth(String),

    #[error("Missing {0} environment variable")]
    MissingEnv(&'static str),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ContribError>;
