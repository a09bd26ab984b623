// Result cache module.
// Versioned, time-stamped JSON entries over a key-value store.

pub mod clock;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{CACHE_TTL, CACHE_VERSION, CacheEntry, ResultCache, cache_key};
