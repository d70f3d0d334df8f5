//! Resolution cache for Marquee.
//!
//! Maps a content identifier to the raw catalog payload that resolved it, so
//! repeated runs over the same content skip the catalog entirely. Entries
//! hold the upstream payload rather than the normalized record, which lets
//! normalization change without invalidating the cache.

#![warn(missing_docs)]

mod cache;
mod file;
mod memory;

pub use cache::{CacheConfig, CacheConfigBuilder, CacheStore};
pub use file::FileCacheStore;
pub use memory::MemoryCacheStore;
