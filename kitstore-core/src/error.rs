//! Error types for KITSTORE operations

use crate::{KitHash, Seqno, SupportedVersion, Timestamp};
use thiserror::Error;

/// Errors surfaced by a merkle store to its callers.
///
/// Refresh failures and persistent-tier failures never appear here; they
/// are logged and treated as soft misses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KitStoreError {
    #[error("MerkleStore: no merkle root available for {tag}")]
    NoRootAvailable { tag: String },

    #[error("MerkleStore: merkle root too old for {tag}: seqno {seqno} fetched at {fetched}")]
    RootTooStale {
        tag: String,
        seqno: Seqno,
        fetched: Timestamp,
    },

    #[error("MerkleStore: merkle root has empty {tag} hash: seqno {seqno}")]
    EmptyExpectedHash { tag: String, seqno: Seqno },

    #[error("MerkleStore: fetching {tag} kit failed: {reason}")]
    RemoteFetchFailed { tag: String, reason: String },

    #[error("MerkleStore: server returned wrong kit for {tag}: expected {expected}, got {actual}")]
    HashMismatch {
        tag: String,
        expected: KitHash,
        actual: KitHash,
    },

    #[error("MerkleStore: unmarshalling {tag} kit: {reason}")]
    KitDecodeFailed { tag: String, reason: String },

    #[error("MerkleStore: missing {tag} for version: {version}")]
    MissingVersionEntry {
        tag: String,
        version: SupportedVersion,
    },

    #[error("MerkleStore: empty {tag} for version: {version}")]
    EmptyVersionEntry {
        tag: String,
        version: SupportedVersion,
    },

    #[error("MerkleStore: reading kit file {path}: {reason}")]
    LocalFileReadFailed { path: String, reason: String },
}

impl KitStoreError {
    /// True for failures rooted in the trust anchor rather than the kit.
    pub fn is_root_failure(&self) -> bool {
        matches!(
            self,
            Self::NoRootAvailable { .. } | Self::RootTooStale { .. } | Self::EmptyExpectedHash { .. }
        )
    }
}

/// Result type alias for KITSTORE operations.
pub type KitStoreResult<T> = Result<T, KitStoreError>;

/// Errors reported by a root tracker when asked to refresh.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RootTrackerError {
    #[error("Root refresh failed: {reason}")]
    RefreshFailed { reason: String },

    #[error("Root tracker unavailable")]
    Unavailable,
}

/// Errors from the remote kit transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request to {endpoint} failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },

    #[error("Request to {endpoint} returned HTTP {status}")]
    HttpStatus { endpoint: String, status: u16 },

    #[error("Server status {code} ({name}) from {endpoint}: {desc}")]
    AppStatus {
        endpoint: String,
        code: i32,
        name: String,
        desc: String,
    },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
