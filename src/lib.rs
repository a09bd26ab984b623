//! Explore a GitHub user's merged open-source contributions from the terminal.
//!
//! Merged pull requests authored in repositories the user does not own are
//! found through the issue search API, grouped per repository, enriched with
//! repository metadata, and summarized as hero statistics, badges, a card
//! grid, and a month-by-month timeline.
//!
//! The crate also ships the OAuth code exchange server used for sign-in and a
//! `precache` command that exports static snapshots for example users.

pub mod app;
pub mod auth;
pub mod cache;
pub mod config;
pub mod contributions;
pub mod error;
pub mod github;
pub mod precache;
pub mod state;
pub mod storage;
pub mod ui;

pub use error::{ContribError, Result};
