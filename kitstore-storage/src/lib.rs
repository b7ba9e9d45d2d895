//! KITSTORE Storage - Cache Tiers and Local Store
//!
//! The memory and persistent tiers a merkle store resolves kits through, and
//! the local key-value store contract behind the persistent tier, with LMDB
//! and in-memory implementations.

pub mod cache;
pub mod db_key;
pub mod error;
pub mod kv;
pub mod lmdb_backend;

pub use cache::{CacheRecord, CacheTier, MemoryTier, PersistentTier, TieredCache, DB_VERSION};
pub use db_key::{DbKey, DbKeyType};
pub use error::KvStoreError;
pub use kv::{KvStats, KvStore, KvStoreExt, MemoryKvStore};
pub use lmdb_backend::LmdbKvStore;
