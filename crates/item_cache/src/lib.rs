mod cache;
mod error;
mod ttl;

pub use cache::{CachedListing, ItemCache, SNAPSHOT_VERSION};
pub use error::CacheError;
pub use ttl::{TtlCache, STORAGE_QUOTA_TTL};
