//! Cache domain - Generic caching abstraction layer

mod entry;
mod key;
mod repository;
mod tier;

pub use entry::{clamp_ttl, CacheEntry, DEFAULT_TTL_FLOOR};
pub use key::{CacheKeyGenerator, Sha256KeyGenerator, DEFAULT_KEY_NAMESPACE};
pub use repository::{Cache, CacheExt};
pub use tier::CacheTier;

#[cfg(test)]
pub use repository::mock::MockCache;
