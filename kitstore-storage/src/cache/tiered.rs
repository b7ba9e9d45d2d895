//! Memory-then-persistent lookup with promotion.

use std::sync::Arc;

use kitstore_core::{Kit, KitHash};

use super::memory::MemoryTier;
use super::persistent::PersistentTier;
use crate::kv::KvStore;

/// Which tier answered a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    Memory,
    Persistent,
}

/// Both cache tiers for one store.
///
/// Mutation goes through `&mut self`, so whoever owns the store's lock is the
/// only one who can change what is cached.
pub struct TieredCache {
    memory: MemoryTier,
    persistent: PersistentTier,
}

impl TieredCache {
    pub fn new(tag: &str, db: Option<Arc<dyn KvStore>>) -> Self {
        Self {
            memory: MemoryTier::new(),
            persistent: PersistentTier::new(tag, db),
        }
    }

    pub fn memory(&self) -> &MemoryTier {
        &self.memory
    }

    pub fn persistent(&self) -> &PersistentTier {
        &self.persistent
    }

    /// Look `hash` up in memory, then on disk. A disk hit is copied into
    /// memory before it is returned.
    pub async fn lookup(&mut self, hash: &KitHash) -> Option<(Kit, CacheTier)> {
        if let Some(kit) = self.memory.get(hash) {
            tracing::debug!(%hash, "mem cache hit");
            return Some((kit, CacheTier::Memory));
        }

        let kit = self.persistent.get(hash).await?;
        tracing::debug!(%hash, "db cache hit");
        self.memory.set(hash.clone(), kit.clone());
        Some((kit, CacheTier::Persistent))
    }

    /// Store a verified kit in memory, then on disk. Returns whether the
    /// disk write happened; a failed write leaves the memory tier populated.
    pub async fn populate(&mut self, hash: KitHash, kit: Kit) -> bool {
        self.memory.set(hash.clone(), kit.clone());
        self.persistent.set(hash, kit).await
    }
}
