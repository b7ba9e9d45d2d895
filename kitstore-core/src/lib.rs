//! KITSTORE Core - Kit Types
//!
//! Data types shared by every KITSTORE crate: kits, kit hashes, merkle roots
//! and the versioned entries extracted from a kit. Behavior lives in the
//! small policy modules (`verify`, `freshness`) and in the crates above.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub mod authority;
pub mod clock;
pub mod config;
pub mod error;
pub mod freshness;
pub mod verify;

pub use authority::{AppStatus, KitFetchResponse, KitTransport, RootTracker};
pub use clock::{Clock, SystemClock};
pub use config::{StoreConfig, TransportConfig};
pub use error::{ConfigError, KitStoreError, KitStoreResult, RootTrackerError, TransportError};
pub use freshness::{FreshnessPolicy, RootFreshness};
pub use verify::{hash_kit, verify_kit};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Sequence number of a merkle root.
pub type Seqno = i64;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Schema version a caller understands; the lookup key into a kit's table.
pub type SupportedVersion = i64;

/// Hex-encoded SHA-512 of a kit's exact bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KitHash(String);

impl KitHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for KitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for KitHash {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for KitHash {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Raw kit document text. Opaque until decoded into a [`VersionedKit`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kit(String);

impl Kit {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Kit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Kit {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Kit {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ============================================================================
// MERKLE ROOT
// ============================================================================

/// Latest known merkle root, as handed out by a [`RootTracker`].
///
/// `fetched` is the local time the root was fetched, not the time the
/// authority published it. Freshness is judged on the former so a store keeps
/// working while the authority's publishing cadence lags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerkleRoot {
    seqno: Option<Seqno>,
    fetched: Timestamp,
    body: serde_json::Value,
}

impl MerkleRoot {
    pub fn new(seqno: Option<Seqno>, fetched: Timestamp, body: serde_json::Value) -> Self {
        Self {
            seqno,
            fetched,
            body,
        }
    }

    pub fn seqno(&self) -> Option<Seqno> {
        self.seqno
    }

    /// Sequence number for log and error output; a missing seqno reads as 0.
    pub fn seqno_or_zero(&self) -> Seqno {
        self.seqno.unwrap_or(0)
    }

    pub fn fetched(&self) -> Timestamp {
        self.fetched
    }

    pub fn body(&self) -> &serde_json::Value {
        &self.body
    }

    /// String at a JSON pointer inside the root body, or empty if absent.
    pub fn hash_at(&self, pointer: &str) -> String {
        self.body
            .pointer(pointer)
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

/// Extracts this store's expected kit hash from a merkle root.
pub type RootHashGetter = Arc<dyn Fn(&MerkleRoot) -> String + Send + Sync>;

/// Build a [`RootHashGetter`] reading a string at a fixed JSON pointer.
pub fn hash_at_pointer(pointer: impl Into<String>) -> RootHashGetter {
    let pointer = pointer.into();
    Arc::new(move |root: &MerkleRoot| root.hash_at(&pointer))
}

// ============================================================================
// VERSIONED KIT
// ============================================================================

/// Decoded kit document: `{kit_version, ctime, tab}`.
#[derive(Debug, Deserialize)]
pub struct VersionedKit {
    #[serde(default)]
    pub kit_version: i64,
    #[serde(default)]
    pub ctime: i64,
    /// Versioned entries of the store.
    #[serde(default)]
    pub tab: HashMap<SupportedVersion, Box<RawValue>>,
}

impl VersionedKit {
    pub fn parse(kit: &Kit) -> Result<Self, serde_json::Error> {
        serde_json::from_str(kit.as_str())
    }

    /// Raw sub-document for a version, if the table has one.
    pub fn entry_for(&self, version: SupportedVersion) -> Option<&str> {
        self.tab.get(&version).map(|raw| raw.get())
    }
}

/// The active entry for a store: the kit hash plus the raw sub-document
/// selected by the caller's supported version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub hash: KitHash,
    pub entry: String,
}

/// True when a raw sub-document carries nothing usable.
///
/// Besides zero-length text, a JSON `null` or `""` counts as empty, so a
/// table that names a version without giving it content is rejected
/// rather than handed to the caller.
pub fn is_empty_entry(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed == "null" || trimmed == "\"\""
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_hash_at_pointer() {
        let root = MerkleRoot::new(
            Some(42),
            Utc::now(),
            json!({"body": {"pvl_hash": "abc123", "seqno": 42}}),
        );
        assert_eq!(root.hash_at("/body/pvl_hash"), "abc123");
        assert_eq!(root.hash_at("/body/missing"), "");
        // non-string values are not hashes
        assert_eq!(root.hash_at("/body/seqno"), "");

        let getter = hash_at_pointer("/body/pvl_hash");
        assert_eq!(getter(&root), "abc123");
    }

    #[test]
    fn test_seqno_or_zero() {
        let root = MerkleRoot::new(None, Utc::now(), json!({}));
        assert_eq!(root.seqno_or_zero(), 0);
        assert_eq!(root.seqno(), None);
    }

    #[test]
    fn test_versioned_kit_parse_preserves_raw_entry() {
        let kit = Kit::new(r#"{"kit_version":1,"ctime":100,"tab":{"2":{"x":1},"3":null}}"#);
        let parsed = VersionedKit::parse(&kit).expect("kit should parse");
        assert_eq!(parsed.kit_version, 1);
        assert_eq!(parsed.ctime, 100);
        assert_eq!(parsed.entry_for(2), Some(r#"{"x":1}"#));
        assert_eq!(parsed.entry_for(3), Some("null"));
        assert_eq!(parsed.entry_for(4), None);
    }

    #[test]
    fn test_versioned_kit_rejects_garbage() {
        assert!(VersionedKit::parse(&Kit::new("hello")).is_err());
        assert!(VersionedKit::parse(&Kit::new(r#"{"tab":{"x":1}}"#)).is_err());
    }

    #[test]
    fn test_is_empty_entry() {
        assert!(is_empty_entry(""));
        assert!(is_empty_entry("null"));
        assert!(is_empty_entry("\"\""));
        assert!(!is_empty_entry("{}"));
        assert!(!is_empty_entry(r#"{"x":1}"#));
    }

    #[test]
    fn test_kit_hash_serde_is_transparent() {
        let hash = KitHash::new("abc");
        assert_eq!(serde_json::to_string(&hash).unwrap(), "\"abc\"");
        let kit: Kit = serde_json::from_str("\"hello\"").unwrap();
        assert_eq!(kit.as_str(), "hello");
    }
}
