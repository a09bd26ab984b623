// Snapshot export for example profiles.
// Full-history aggregation per user, written to the snapshot directory.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::cache::ResultCache;
use crate::contributions::{Aggregator, DateRange, Pacing, Snapshot, SnapshotDir, UserProfile};
use crate::error::Result;
use crate::github::GitHubApi;
use crate::storage::MemoryStore;

/// Fetch one user's profile and full contribution history, then write it.
///
/// Uses a throwaway cache and never reads existing snapshots, so the result
/// always reflects the live API.
pub async fn precache_user<A: GitHubApi>(
    api: &mut A,
    snapshots: &SnapshotDir,
    username: &str,
    pacing: Pacing,
) -> Result<(Snapshot, PathBuf)> {
    let profile = UserProfile::from(api.user(username).await?);

    let cache = ResultCache::new(Arc::new(MemoryStore::new()));
    let contributions = Aggregator::new(api, cache)
        .with_pacing(pacing)
        .aggregate(username, DateRange::All, |message, percent| {
            debug!(username, percent, "{}", message);
        })
        .await?;

    let snapshot = Snapshot::new(profile, contributions);
    let path = snapshots.write(&snapshot)?;
    Ok((snapshot, path))
}

/// Precache every user in turn. One user's failure does not stop the rest.
/// Returns the number of snapshots written.
pub async fn precache_all<A: GitHubApi>(
    api: &mut A,
    snapshots: &SnapshotDir,
    users: &[String],
    pacing: Pacing,
) -> usize {
    let mut written = 0;

    for username in users {
        info!("Precaching {username}...");
        match precache_user(api, snapshots, username, pacing.clone()).await {
            Ok((snapshot, path)) => {
                written += 1;
                info!(
                    repos = snapshot.contributions.len(),
                    prs = snapshot.total_prs(),
                    path = %path.display(),
                    "✅ {username}"
                );
            }
            Err(e) => error!("❌ {username}: {e}"),
        }
    }

    info!(written, total = users.len(), "Done!");
    written
}
