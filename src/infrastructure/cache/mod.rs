//! Cache infrastructure - Cache implementations and tier composition

mod factory;
mod in_memory;
mod noop;
mod redis;
mod tiered;

pub use factory::{CacheConfig, CacheFactory, MemoryTierConfig, SharedTierConfig};
pub use in_memory::{InMemoryCache, InMemoryCacheConfig};
pub use noop::NoopCache;
pub use redis::{RedisCache, RedisCacheConfig};
pub use tiered::{TierLookup, TierSlot, TieredCache};
