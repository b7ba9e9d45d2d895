//! The cached kit record, shared by both tiers.

use kitstore_core::{Kit, KitHash};
use serde::{Deserialize, Serialize};

/// Bump this to ignore existing persisted entries.
pub const DB_VERSION: i32 = 1;

/// A verified kit and its hash.
///
/// `hash` is always the true content hash of `kit`: records are built only
/// after verification (or from the debug file path, which never reaches a
/// cache). Persisted as `{"DBVersion", "Hash", "Kit"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    #[serde(rename = "DBVersion")]
    pub db_version: i32,
    #[serde(rename = "Hash")]
    pub hash: KitHash,
    #[serde(rename = "Kit")]
    pub kit: Kit,
}

impl CacheRecord {
    /// Record at the current schema version.
    pub fn new(hash: KitHash, kit: Kit) -> Self {
        Self {
            db_version: DB_VERSION,
            hash,
            kit,
        }
    }

    pub fn is_current(&self) -> bool {
        self.db_version == DB_VERSION
    }

    /// Usable for `hash`: current schema and an exact hash match.
    pub fn serves(&self, hash: &KitHash) -> bool {
        self.is_current() && self.hash == *hash
    }
}
