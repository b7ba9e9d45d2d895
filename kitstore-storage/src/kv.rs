//! Local key-value store contract and an in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::db_key::DbKey;
use crate::error::KvStoreError;

/// Raw byte store keyed by [`DbKey`].
///
/// Implementations must be thread-safe; a single store is shared by every
/// merkle store in the process.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Get the bytes stored under `key`, or `None` if absent.
    async fn get(&self, key: &DbKey) -> Result<Option<Vec<u8>>, KvStoreError>;

    /// Store `value` under `key`, replacing anything already there.
    async fn put(&self, key: &DbKey, value: &[u8]) -> Result<(), KvStoreError>;

    /// Usage counters.
    async fn stats(&self) -> Result<KvStats, KvStoreError>;
}

/// Typed JSON helpers over any [`KvStore`].
#[async_trait]
pub trait KvStoreExt: KvStore {
    /// Decode the JSON object stored under `key`.
    ///
    /// `Ok(None)` means not found; undecodable bytes are an error.
    async fn get_into<T>(&self, key: &DbKey) -> Result<Option<T>, KvStoreError>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| KvStoreError::Deserialization(e.to_string())),
            None => Ok(None),
        }
    }

    /// Encode `value` as JSON and store it under `key`.
    async fn put_obj<T>(&self, key: &DbKey, value: &T) -> Result<(), KvStoreError>
    where
        T: Serialize + Sync,
    {
        let bytes =
            serde_json::to_vec(value).map_err(|e| KvStoreError::Serialization(e.to_string()))?;
        self.put(key, &bytes).await
    }
}

impl<S: KvStore + ?Sized> KvStoreExt for S {}

/// Statistics about local store usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KvStats {
    /// Reads that found a value.
    pub hits: u64,
    /// Reads that found nothing.
    pub misses: u64,
    /// Number of entries currently stored.
    pub entry_count: u64,
}

impl KvStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// In-memory store for tests and for processes without a data directory.
#[derive(Debug, Default, Clone)]
pub struct MemoryKvStore {
    entries: Arc<RwLock<HashMap<Vec<u8>, Vec<u8>>>>,
    stats: Arc<RwLock<KvStats>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store bytes directly, bypassing JSON encoding. Lets tests plant
    /// corrupt records.
    pub fn insert_raw(&self, key: &DbKey, value: impl Into<Vec<u8>>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.encode(), value.into());
        }
    }

    fn record(&self, hit: bool) {
        if let Ok(mut stats) = self.stats.write() {
            if hit {
                stats.hits += 1;
            } else {
                stats.misses += 1;
            }
        }
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &DbKey) -> Result<Option<Vec<u8>>, KvStoreError> {
        let value = self
            .entries
            .read()
            .map_err(|_| KvStoreError::LockPoisoned)?
            .get(&key.encode())
            .cloned();
        self.record(value.is_some());
        Ok(value)
    }

    async fn put(&self, key: &DbKey, value: &[u8]) -> Result<(), KvStoreError> {
        self.entries
            .write()
            .map_err(|_| KvStoreError::LockPoisoned)?
            .insert(key.encode(), value.to_vec());
        Ok(())
    }

    async fn stats(&self) -> Result<KvStats, KvStoreError> {
        let mut stats = self
            .stats
            .read()
            .map_err(|_| KvStoreError::LockPoisoned)?
            .clone();
        stats.entry_count = self.len() as u64;
        Ok(stats)
    }
}
