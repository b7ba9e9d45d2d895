//! Persistent tier backed by the local key-value store.
//!
//! Reads never fail: a missing store, a read error, an undecodable record, a
//! foreign schema version and a hash mismatch all come back as a miss.
//! Writes are best-effort and only logged on failure.

use std::sync::Arc;

use kitstore_core::{Kit, KitHash};
use tracing::Instrument;

use super::record::CacheRecord;
use crate::db_key::DbKey;
use crate::kv::{KvStore, KvStoreExt};

pub struct PersistentTier {
    db: Option<Arc<dyn KvStore>>,
    key: DbKey,
}

impl PersistentTier {
    /// Tier for the store tagged `tag`. With no `db` every read misses and
    /// every write is skipped.
    pub fn new(tag: &str, db: Option<Arc<dyn KvStore>>) -> Self {
        Self {
            db,
            key: DbKey::merkle_store(tag),
        }
    }

    pub fn key(&self) -> &DbKey {
        &self.key
    }

    pub fn is_enabled(&self) -> bool {
        self.db.is_some()
    }

    /// The persisted kit for `hash`, if the stored record serves it.
    pub async fn get(&self, hash: &KitHash) -> Option<Kit> {
        let db = self.db.as_ref()?;
        let record: CacheRecord = match db.get_into(&self.key).await {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!(key = %self.key, error = %e, "error reading kit from db");
                return None;
            }
        };
        if !record.is_current() {
            tracing::debug!(
                key = %self.key,
                found = record.db_version,
                "ignoring kit record from another schema version"
            );
            return None;
        }
        if record.hash != *hash {
            return None;
        }
        Some(record.kit)
    }

    /// Persist `kit` under this tier's key. Returns false if nothing was
    /// written.
    ///
    /// Runs in a span detached from the caller's, so the write is traced on
    /// its own even though the caller awaits it.
    pub async fn set(&self, hash: KitHash, kit: Kit) -> bool {
        let Some(db) = self.db.as_ref() else {
            tracing::debug!(key = %self.key, "no db; skipping kit write");
            return false;
        };
        let span = tracing::debug_span!(parent: None, "kit_db_write", key = %self.key);
        let record = CacheRecord::new(hash, kit);
        async {
            match db.put_obj(&self.key, &record).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to persist kit");
                    false
                }
            }
        }
        .instrument(span)
        .await
    }
}
