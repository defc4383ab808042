pub mod cache;
pub mod memory;
pub mod postgres;

pub use cache::{create_redis_client, Cache, CacheKey};
pub use memory::{MemoryNotifier, MemoryStatsProvider, MemoryUnlockStore};
pub use postgres::{create_pool, PgNotifier, PgUnlockStore};
