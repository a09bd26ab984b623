// Filesystem-backed key-value store.
// One file per key under a root directory, written atomically via temp file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{ContribError, Result};

use super::KeyValueStore;

const TEMP_SUFFIX: &str = ".tmp";

/// Default data directory (~/.local/share/contribs on Linux).
pub fn data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "contribs").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Key-value store persisting each entry as a file.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    /// Maximum total bytes across all entries, if bounded.
    quota: Option<u64>,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root, quota: None })
    }

    /// Bound the total size of stored values.
    pub fn with_quota(mut self, bytes: u64) -> Self {
        self.quota = Some(bytes);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(encode_key(key))
    }

    /// Total bytes used by all entries except `skip`.
    fn used_bytes(&self, skip: &Path) -> Result<u64> {
        let mut total = 0;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path == skip || is_temp(&path) {
                continue;
            }
            total += entry.metadata()?.len();
        }
        Ok(total)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.entry_path(key);

        if let Some(quota) = self.quota {
            if self.used_bytes(&path)? + value.len() as u64 > quota {
                return Err(ContribError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }

        // Write atomically via temp file
        let mut temp_name = path.as_os_str().to_os_string();
        temp_name.push(TEMP_SUFFIX);
        let temp_path = PathBuf::from(temp_name);
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if is_temp(&path) {
                continue;
            }
            if let Some(key) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(decode_key)
            {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

fn is_temp(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(TEMP_SUFFIX))
}

/// Encode a key as a file name.
/// Anything other than ASCII alphanumerics, '-' and '_' becomes `%XX`, so
/// encoded names never contain '.' and cannot collide with temp files.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

fn decode_key(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = name.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("simple"), "simple");
        assert_eq!(encode_key("mc_repo_rust-lang/rust"), "mc_repo_rust-lang%2Frust");
        assert_eq!(encode_key("a.b"), "a%2Eb");
        assert_eq!(decode_key("mc_repo_rust-lang%2Frust").unwrap(), "mc_repo_rust-lang/rust");
        assert!(decode_key("bad%2").is_none());
    }

    #[test]
    fn test_set_get_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();

        assert_eq!(store.get("gh_token").unwrap(), None);

        store.set("gh_token", "abc").unwrap();
        assert_eq!(store.get("gh_token").unwrap(), Some("abc".to_string()));

        store.set("gh_token", "def").unwrap();
        assert_eq!(store.get("gh_token").unwrap(), Some("def".to_string()));

        store.remove("gh_token").unwrap();
        assert_eq!(store.get("gh_token").unwrap(), None);

        // Removing a missing key is not an error
        store.remove("gh_token").unwrap();
    }

    #[test]
    fn test_keys_round_trip_through_file_names() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();

        store.set("mc_repo_rust-lang/rust", "{}").unwrap();
        store.set("gh_token", "t").unwrap();

        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["gh_token", "mc_repo_rust-lang/rust"]);
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap().with_quota(10);

        store.set("a", "12345").unwrap();
        // Replacing an entry does not count its old size
        store.set("a", "1234567890").unwrap();

        let err = store.set("b", "1").unwrap_err();
        assert!(matches!(err, ContribError::QuotaExceeded { .. }));
        assert_eq!(store.get("b").unwrap(), None);
    }
}
