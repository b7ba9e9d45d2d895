//! Two-tier kit cache.
//!
//! Lookups go memory first, then the persistent store. Both tiers hold the
//! same [`CacheRecord`] shape, and a record only serves the exact hash it was
//! verified against, so a new hash in the merkle root misses both tiers and
//! forces a fetch.

pub mod memory;
pub mod persistent;
pub mod record;
pub mod tiered;

pub use memory::MemoryTier;
pub use persistent::PersistentTier;
pub use record::{CacheRecord, DB_VERSION};
pub use tiered::{CacheTier, TieredCache};
