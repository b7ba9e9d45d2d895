//! Collaborator traits for the authority side of a merkle store.
//!
//! A [`RootTracker`] owns the latest merkle root and can be kicked to fetch a
//! newer one. A [`KitTransport`] fetches a kit by hash. Both are injected into
//! the store so tests can substitute fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{RootTrackerError, TransportError};
use crate::{Kit, KitHash, MerkleRoot};

/// Tracks the authority's latest merkle root.
#[async_trait]
pub trait RootTracker: Send + Sync {
    /// The most recently fetched root, if one has ever been fetched.
    fn last_root(&self) -> Option<MerkleRoot>;

    /// Fetch and memoize a newer root.
    ///
    /// Callers treat failure as non-fatal and keep using the previous root.
    async fn refresh_root(&self) -> Result<(), RootTrackerError>;
}

/// Application-level status carried in every server response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppStatus {
    pub code: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
}

impl AppStatus {
    pub const OK_CODE: i32 = 0;

    pub fn ok() -> Self {
        Self {
            code: Self::OK_CODE,
            name: "OK".to_string(),
            desc: String::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == Self::OK_CODE
    }
}

/// Server response to a kit request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KitFetchResponse {
    pub status: AppStatus,
    #[serde(default)]
    pub kit_json: Kit,
}

impl KitFetchResponse {
    pub fn ok(kit_json: impl Into<Kit>) -> Self {
        Self {
            status: AppStatus::ok(),
            kit_json: kit_json.into(),
        }
    }
}

/// Fetches kits from the remote authority.
#[async_trait]
pub trait KitTransport: Send + Sync {
    /// GET `endpoint` with a single `hash` argument and decode the response.
    ///
    /// Implementations return an error for a non-OK [`AppStatus`]; an empty
    /// `kit_json` is left for the caller to reject.
    async fn get_kit(
        &self,
        endpoint: &str,
        hash: &KitHash,
    ) -> Result<KitFetchResponse, TransportError>;
}
