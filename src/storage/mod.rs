// Key-value storage backends.
// Flat string stores used for the bearer token and the result cache.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;

/// A flat string key-value store.
///
/// Writes may fail (for example when a quota is exceeded); callers decide
/// whether that is fatal. Implementations use interior mutability so a single
/// store can be shared between the UI and background loads.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// All keys currently present, in no particular order.
    fn keys(&self) -> Result<Vec<String>>;
}
