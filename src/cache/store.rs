// Cache store for reading and writing cached results.
// Handles JSON serialization, TTL and version checks, and quota eviction.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::storage::KeyValueStore;

use super::clock::{Clock, SystemClock};

/// Entries older than this are treated as misses: 30 minutes.
pub const CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Schema version stamped on every entry. Bump when cached shapes change.
pub const CACHE_VERSION: u32 = 1;

/// Every cache key starts with this; eviction only touches this namespace.
const KEY_NAMESPACE: &str = "mc_";

/// Wrapper for cached data with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached data.
    pub data: T,
    /// When the data was cached, in milliseconds since the epoch.
    pub timestamp: i64,
    /// Schema version the data was written with.
    pub version: u32,
}

impl<T> CacheEntry<T> {
    /// Check whether this entry can be served at `now_millis`.
    pub fn is_valid(&self, version: u32, ttl: Duration, now_millis: i64) -> bool {
        let age = now_millis.saturating_sub(self.timestamp);
        self.version == version && age <= ttl.as_millis() as i64
    }
}

/// Only the timestamp is needed to order entries for eviction.
#[derive(Deserialize)]
struct EntryStamp {
    #[serde(default)]
    timestamp: Option<i64>,
}

/// Build the storage key for a prefix and ordered parts.
pub fn cache_key(prefix: &str, parts: &[&str]) -> String {
    format!("{}{}_{}", KEY_NAMESPACE, prefix, parts.join("_"))
}

/// Flat result cache over a shared key-value store.
#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    version: u32,
}

impl ResultCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            ttl: CACHE_TTL,
            version: CACHE_VERSION,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Read an entry, returning None if missing, unreadable, stale, or from
    /// another schema version.
    pub fn get<T: DeserializeOwned>(&self, prefix: &str, parts: &[&str]) -> Option<T> {
        let key = cache_key(prefix, parts);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(%key, error = %e, "cache read failed");
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(%key, error = %e, "discarding unreadable cache entry");
                return None;
            }
        };

        if entry.is_valid(self.version, self.ttl, self.clock.now_millis()) {
            Some(entry.data)
        } else {
            None
        }
    }

    /// Write an entry. A failed write evicts the oldest half of the cache
    /// namespace and is not retried.
    pub fn set<T: Serialize>(&self, data: &T, prefix: &str, parts: &[&str]) {
        let key = cache_key(prefix, parts);
        let entry = CacheEntry {
            data,
            timestamp: self.clock.now_millis(),
            version: self.version,
        };

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                warn!(%key, error = %e, "cache entry not serializable");
                return;
            }
        };

        if let Err(e) = self.store.set(&key, &json) {
            warn!(%key, error = %e, "cache write failed, evicting old entries");
            let removed = self.evict_oldest_half();
            debug!(removed, "cache eviction finished");
        }
    }

    /// Remove the older half (rounded up) of all entries in the cache
    /// namespace. Entries without a readable timestamp count as oldest.
    pub fn evict_oldest_half(&self) -> usize {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "cannot list cache keys");
                return 0;
            }
        };

        let mut entries: Vec<(String, i64)> = keys
            .into_iter()
            .filter(|key| key.starts_with(KEY_NAMESPACE))
            .map(|key| {
                let ts = self
                    .store
                    .get(&key)
                    .ok()
                    .flatten()
                    .and_then(|raw| serde_json::from_str::<EntryStamp>(&raw).ok())
                    .and_then(|stamp| stamp.timestamp)
                    .unwrap_or(0);
                (key, ts)
            })
            .collect();
        entries.sort_by_key(|(_, ts)| *ts);

        let to_remove = entries.len().div_ceil(2);
        let mut removed = 0;
        for (key, _) in entries.into_iter().take(to_remove) {
            match self.store.remove(&key) {
                Ok(()) => removed += 1,
                Err(e) => warn!(%key, error = %e, "cache eviction failed"),
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::storage::{FileStore, MemoryStore};

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn test_data() -> TestData {
        TestData {
            name: "test".to_string(),
            value: 42,
        }
    }

    fn setup() -> (Arc<MemoryStore>, Arc<ManualClock>, ResultCache) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let cache = ResultCache::new(store.clone()).with_clock(clock.clone());
        (store, clock, cache)
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("contribs", &["torvalds", "all"]), "mc_contribs_torvalds_all");
        assert_eq!(cache_key("repo", &["rust-lang/rust"]), "mc_repo_rust-lang/rust");
    }

    #[test]
    fn test_round_trip_within_ttl() {
        let (_, clock, cache) = setup();
        cache.set(&test_data(), "contribs", &["octocat", "all"]);

        clock.advance(CACHE_TTL.as_millis() as i64);
        let read: Option<TestData> = cache.get("contribs", &["octocat", "all"]);
        assert_eq!(read, Some(test_data()));

        // Different parts are a different entry
        let other: Option<TestData> = cache.get("contribs", &["octocat", "1y"]);
        assert!(other.is_none());
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let (_, clock, cache) = setup();
        cache.set(&test_data(), "contribs", &["octocat", "all"]);

        clock.advance(CACHE_TTL.as_millis() as i64 + 1);
        let read: Option<TestData> = cache.get("contribs", &["octocat", "all"]);
        assert!(read.is_none());
    }

    #[test]
    fn test_version_mismatch_is_a_miss() {
        let (store, clock, cache) = setup();
        cache.set(&test_data(), "contribs", &["octocat", "all"]);

        let newer = ResultCache::new(store)
            .with_clock(clock)
            .with_version(CACHE_VERSION + 1);
        let read: Option<TestData> = newer.get("contribs", &["octocat", "all"]);
        assert!(read.is_none());
    }

    #[test]
    fn test_unparseable_entry_is_a_miss() {
        let (store, _, cache) = setup();
        store.set("mc_contribs_octocat_all", "{not json").unwrap();

        let read: Option<TestData> = cache.get("contribs", &["octocat", "all"]);
        assert!(read.is_none());
    }

    #[test]
    fn test_evict_oldest_half() {
        let (store, clock, cache) = setup();
        for name in ["a", "b", "c", "d", "e"] {
            cache.set(&test_data(), "repo", &[name]);
            clock.advance(1000);
        }
        store.set("mc_repo_garbage", "nope").unwrap();
        store.set("gh_token", "secret").unwrap();

        // Six cache entries: garbage (ts 0), a, b are the oldest half
        assert_eq!(cache.evict_oldest_half(), 3);

        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["gh_token", "mc_repo_c", "mc_repo_d", "mc_repo_e"]);
    }

    #[test]
    fn test_failed_write_evicts_and_is_not_retried() {
        let store = Arc::new(MemoryStore::with_quota(400));
        let clock = Arc::new(ManualClock::new(0));
        let cache = ResultCache::new(store.clone()).with_clock(clock.clone());

        for name in ["a", "b", "c", "d"] {
            cache.set(&test_data(), "repo", &[name]);
            clock.advance(10);
        }
        assert_eq!(store.len(), 4);

        let big = "x".repeat(300);
        cache.set(&big, "repo", &["big"]);

        // Oldest two entries were evicted; the big write was dropped
        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["mc_repo_c", "mc_repo_d"]);
        assert!(cache.get::<String>("repo", &["big"]).is_none());
    }

    #[test]
    fn test_file_store_quota_triggers_eviction() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let store = Arc::new(FileStore::open(temp_dir.path()).unwrap().with_quota(400));
        let clock = Arc::new(ManualClock::new(0));
        let cache = ResultCache::new(store.clone()).with_clock(clock.clone());

        for name in ["a", "b", "c", "d"] {
            cache.set(&test_data(), "contribs", &[name, "all"]);
            clock.advance(10);
        }
        assert_eq!(store.keys().unwrap().len(), 4);

        cache.set(&"x".repeat(300), "contribs", &["big", "all"]);

        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["mc_contribs_c_all", "mc_contribs_d_all"]);
        assert_eq!(
            cache.get::<TestData>("contribs", &["d", "all"]),
            Some(test_data())
        );

        // Room was freed, so the next write lands
        cache.set(&"y".repeat(100), "contribs", &["small", "all"]);
        assert!(cache.get::<String>("contribs", &["small", "all"]).is_some());
    }
}
