//! KITSTORE Test Utilities
//!
//! Shared test infrastructure for the KITSTORE workspace:
//! - Fakes for every store collaborator (clock, root tracker, transport,
//!   local store) that count the calls made to them
//! - Kit and root fixtures
//! - Proptest generators for kit documents

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use proptest::prelude::*;

// Re-export core types for convenience
pub use kitstore_core::{
    hash_kit, AppStatus, Clock, Kit, KitFetchResponse, KitHash, KitStoreError, KitTransport,
    MerkleRoot, RootHashGetter, RootTracker, RootTrackerError, Seqno, StoreConfig, Timestamp,
    TransportError,
};
pub use kitstore_storage::{DbKey, KvStats, KvStore, KvStoreError, MemoryKvStore};

/// JSON pointer the fixtures put the expected kit hash at.
pub const ROOT_HASH_POINTER: &str = "/body/kit_hash";

// ============================================================================
// FIXTURES
// ============================================================================

/// Kit with a single version-2 entry `{"x":1}`.
pub fn sample_kit() -> Kit {
    Kit::new(r#"{"kit_version":1,"ctime":100,"tab":{"2":{"x":1}}}"#)
}

/// Kit document with the given `(version, raw JSON)` entries.
pub fn kit_with_entries(entries: &[(i64, &str)]) -> Kit {
    let tab: Vec<String> = entries
        .iter()
        .map(|(version, raw)| format!("\"{}\":{}", version, raw))
        .collect();
    Kit::new(format!(
        "{{\"kit_version\":1,\"ctime\":100,\"tab\":{{{}}}}}",
        tab.join(",")
    ))
}

/// Root whose body carries `hash` at [`ROOT_HASH_POINTER`].
pub fn root_with_hash(seqno: Seqno, fetched: Timestamp, hash: &KitHash) -> MerkleRoot {
    MerkleRoot::new(
        Some(seqno),
        fetched,
        serde_json::json!({ "body": { "kit_hash": hash.as_str() } }),
    )
}

/// Getter matching [`root_with_hash`].
pub fn fixture_hash_getter() -> RootHashGetter {
    kitstore_core::hash_at_pointer(ROOT_HASH_POINTER)
}

// ============================================================================
// CLOCK
// ============================================================================

/// Settable clock shared between a test and the store under test.
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<Mutex<Timestamp>>,
}

impl MockClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: Timestamp) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: std::time::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(by).unwrap();
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for MockClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap()
    }
}

// ============================================================================
// ROOT TRACKER
// ============================================================================

/// Root tracker whose refreshes either install a prepared root or fail.
#[derive(Debug, Default)]
pub struct FakeRootTracker {
    current: Mutex<Option<MerkleRoot>>,
    next: Mutex<Option<MerkleRoot>>,
    fail_refresh: Mutex<bool>,
    refresh_calls: AtomicUsize,
}

impl FakeRootTracker {
    pub fn new(root: Option<MerkleRoot>) -> Self {
        Self {
            current: Mutex::new(root),
            ..Self::default()
        }
    }

    pub fn set_root(&self, root: Option<MerkleRoot>) {
        *self.current.lock().unwrap() = root;
    }

    /// Root the next successful refresh installs. Without one, a successful
    /// refresh leaves the current root in place.
    pub fn set_next_root(&self, root: MerkleRoot) {
        *self.next.lock().unwrap() = Some(root);
    }

    pub fn fail_refreshes(&self, fail: bool) {
        *self.fail_refresh.lock().unwrap() = fail;
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RootTracker for FakeRootTracker {
    fn last_root(&self) -> Option<MerkleRoot> {
        self.current.lock().unwrap().clone()
    }

    async fn refresh_root(&self) -> Result<(), RootTrackerError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_refresh.lock().unwrap() {
            return Err(RootTrackerError::RefreshFailed {
                reason: "fake refresh failure".to_string(),
            });
        }
        if let Some(next) = self.next.lock().unwrap().take() {
            *self.current.lock().unwrap() = Some(next);
        }
        Ok(())
    }
}

// ============================================================================
// TRANSPORT
// ============================================================================

/// Transport serving canned responses per hash and recording every call.
#[derive(Debug, Default)]
pub struct FakeTransport {
    responses: Mutex<HashMap<KitHash, Result<KitFetchResponse, TransportError>>>,
    calls: Mutex<Vec<(String, KitHash)>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `kit` for `hash`, whether or not it really hashes to `hash`.
    pub fn serve(&self, hash: KitHash, kit: Kit) {
        self.responses
            .lock()
            .unwrap()
            .insert(hash, Ok(KitFetchResponse::ok(kit)));
    }

    /// Serve `kit` under its true hash; returns that hash.
    pub fn serve_verified(&self, kit: Kit) -> KitHash {
        let hash = hash_kit(&kit);
        self.serve(hash.clone(), kit);
        hash
    }

    pub fn fail(&self, hash: KitHash, error: TransportError) {
        self.responses.lock().unwrap().insert(hash, Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(String, KitHash)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl KitTransport for FakeTransport {
    async fn get_kit(
        &self,
        endpoint: &str,
        hash: &KitHash,
    ) -> Result<KitFetchResponse, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.to_string(), hash.clone()));
        self.responses
            .lock()
            .unwrap()
            .get(hash)
            .cloned()
            .unwrap_or_else(|| {
                Err(TransportError::AppStatus {
                    endpoint: endpoint.to_string(),
                    code: 205,
                    name: "NOT_FOUND".to_string(),
                    desc: format!("no kit for {}", hash),
                })
            })
    }
}

// ============================================================================
// LOCAL STORE
// ============================================================================

/// Local store that fails every operation.
#[derive(Debug, Default)]
pub struct FailingKvStore {
    puts: AtomicUsize,
}

impl FailingKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of write attempts seen.
    pub fn put_attempts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KvStore for FailingKvStore {
    async fn get(&self, _key: &DbKey) -> Result<Option<Vec<u8>>, KvStoreError> {
        Err(KvStoreError::Transaction("fake read failure".to_string()))
    }

    async fn put(&self, _key: &DbKey, _value: &[u8]) -> Result<(), KvStoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        Err(KvStoreError::Transaction("fake write failure".to_string()))
    }

    async fn stats(&self) -> Result<KvStats, KvStoreError> {
        Ok(KvStats::default())
    }
}

// ============================================================================
// GENERATORS
// ============================================================================

/// Small JSON objects usable as kit entries.
pub fn arb_entry_json() -> impl Strategy<Value = String> {
    (any::<i32>(), "[a-z]{1,8}").prop_map(|(n, s)| format!("{{\"n\":{},\"s\":\"{}\"}}", n, s))
}

/// Kit tables with one to five distinct versions.
pub fn arb_kit_entries() -> impl Strategy<Value = Vec<(i64, String)>> {
    prop::collection::btree_map(0i64..50, arb_entry_json(), 1..5)
        .prop_map(|entries| entries.into_iter().collect())
}
