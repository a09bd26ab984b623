// Pre-generated contribution snapshots.
// One JSON file per username, written by `precache` and read before live search.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::types::{Contribution, UserProfile};

/// Example profiles offered on the landing screen and exported by `precache`.
pub const EXAMPLE_USERS: [&str; 7] = [
    "torvalds",
    "sindresorhus",
    "antfu",
    "ljharb",
    "gaearon",
    "yyx990803",
    "austenstone",
];

/// Stored profile and full-history contributions for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub profile: UserProfile,
    pub contributions: Vec<Contribution>,
    pub generated_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(profile: UserProfile, contributions: Vec<Contribution>) -> Self {
        Self {
            profile,
            contributions,
            generated_at: Utc::now(),
        }
    }

    pub fn total_prs(&self) -> usize {
        self.contributions.iter().map(|c| c.prs.len()).sum()
    }
}

/// Directory of `{username}.json` snapshot files.
#[derive(Debug, Clone)]
pub struct SnapshotDir {
    root: PathBuf,
}

impl SnapshotDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the snapshot file for a username.
    pub fn path_for(&self, username: &str) -> PathBuf {
        self.root
            .join(format!("{}.json", sanitize_name(&username.to_lowercase())))
    }

    /// Load a user's snapshot, if one exists.
    pub fn load(&self, username: &str) -> Result<Option<Snapshot>> {
        let path = self.path_for(username);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&contents)?;
        Ok(Some(snapshot))
    }

    /// Write a snapshot, replacing any existing one for the same login.
    pub fn write(&self, snapshot: &Snapshot) -> Result<PathBuf> {
        fs::create_dir_all(&self.root)?;

        let path = self.path_for(&snapshot.profile.login);
        let json = serde_json::to_string(snapshot)?;

        // Write atomically via temp file
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, &path)?;

        Ok(path)
    }
}

/// Replace characters that are unsafe in file names with underscores.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '.' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn profile(login: &str) -> UserProfile {
        UserProfile {
            login: login.to_string(),
            name: None,
            avatar_url: String::new(),
            bio: None,
            followers: 1,
            following: 2,
            public_repos: 3,
            url: format!("https://github.com/{}", login),
        }
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("octocat"), "octocat");
        assert_eq!(sanitize_name("../etc"), "___etc");
    }

    #[test]
    fn test_write_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let dir = SnapshotDir::new(temp_dir.path().join("precache"));

        assert!(dir.load("Octocat").unwrap().is_none());

        let path = dir.write(&Snapshot::new(profile("Octocat"), Vec::new())).unwrap();
        assert!(path.ends_with("precache/octocat.json"));

        // Lookups ignore login case
        let loaded = dir.load("octocat").unwrap().unwrap();
        assert_eq!(loaded.profile.login, "Octocat");
        assert!(loaded.contributions.is_empty());
    }
}
