//! LMDB-backed local store.
//!
//! Uses the heed crate (Rust bindings for LMDB) to provide a memory-mapped
//! key-value store that survives process restarts, so a verified kit is
//! fetched from the server once per hash rather than once per run.
//!
//! # Thread Safety
//!
//! LMDB provides ACID transactions. The backend uses:
//! - Read transactions for `get` operations
//! - Write transactions for `put`
//! - Statistics are tracked behind a lock

use std::path::Path;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::db_key::DbKey;
use crate::error::KvStoreError;
use crate::kv::{KvStats, KvStore};

/// LMDB-backed [`KvStore`].
///
/// # Example
///
/// ```ignore
/// use kitstore_storage::{DbKey, KvStoreExt, LmdbKvStore};
///
/// let store = LmdbKvStore::new("/var/lib/kitstore", 64)?;
/// store.put_obj(&DbKey::merkle_store("pvl"), &record).await?;
/// ```
pub struct LmdbKvStore {
    /// The LMDB environment.
    env: Env,
    /// The main database (single unnamed database).
    db: Database<Bytes, Bytes>,
    stats: Arc<RwLock<KvStats>>,
}

impl LmdbKvStore {
    /// Open (creating if needed) an LMDB store.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    pub fn new<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, KvStoreError> {
        std::fs::create_dir_all(&path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| KvStoreError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| KvStoreError::Transaction(e.to_string()))?;

        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| KvStoreError::DbOpen(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| KvStoreError::Transaction(e.to_string()))?;

        let entry_count = {
            let rtxn = env
                .read_txn()
                .map_err(|e| KvStoreError::Transaction(e.to_string()))?;
            db.len(&rtxn)
                .map_err(|e| KvStoreError::Transaction(e.to_string()))?
        };

        Ok(Self {
            env,
            db,
            stats: Arc::new(RwLock::new(KvStats {
                entry_count,
                ..KvStats::default()
            })),
        })
    }

    fn record_hit(&self) {
        if let Ok(mut stats) = self.stats.write() {
            stats.hits += 1;
        }
    }

    fn record_miss(&self) {
        if let Ok(mut stats) = self.stats.write() {
            stats.misses += 1;
        }
    }
}

#[async_trait]
impl KvStore for LmdbKvStore {
    async fn get(&self, key: &DbKey) -> Result<Option<Vec<u8>>, KvStoreError> {
        let encoded_key = key.encode();

        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| KvStoreError::Transaction(e.to_string()))?;

        match self.db.get(&rtxn, &encoded_key) {
            Ok(Some(bytes)) => {
                self.record_hit();
                Ok(Some(bytes.to_vec()))
            }
            Ok(None) => {
                self.record_miss();
                Ok(None)
            }
            Err(e) => {
                self.record_miss();
                Err(KvStoreError::Transaction(e.to_string()))
            }
        }
    }

    async fn put(&self, key: &DbKey, value: &[u8]) -> Result<(), KvStoreError> {
        let encoded_key = key.encode();

        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| KvStoreError::Transaction(e.to_string()))?;

        let is_new = self
            .db
            .get(&wtxn, &encoded_key)
            .map_err(|e| KvStoreError::Transaction(e.to_string()))?
            .is_none();

        self.db
            .put(&mut wtxn, &encoded_key, value)
            .map_err(|e| KvStoreError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| KvStoreError::Transaction(e.to_string()))?;

        if is_new {
            if let Ok(mut stats) = self.stats.write() {
                stats.entry_count += 1;
            }
        }

        Ok(())
    }

    async fn stats(&self) -> Result<KvStats, KvStoreError> {
        Ok(self.stats.read().map(|s| s.clone()).unwrap_or_default())
    }
}
