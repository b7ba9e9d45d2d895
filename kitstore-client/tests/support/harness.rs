//! Shared wiring for store integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeZone;
use kitstore_client::{MerkleStore, StoreConfig, StoreDeps};
use kitstore_storage::KvStore;
use kitstore_test_utils::{
    fixture_hash_getter, root_with_hash, FakeRootTracker, FakeTransport, KitHash, MerkleRoot,
    MockClock, Timestamp,
};

pub const TAG: &str = "pvl";
pub const ENDPOINT: &str = "merkle/pvl";
pub const SUPPORTED_VERSION: i64 = 2;

pub const SOFT: Duration = Duration::from_secs(60 * 60);
pub const HARD: Duration = Duration::from_secs(24 * 60 * 60);

pub struct Harness {
    pub store: MerkleStore,
    pub clock: MockClock,
    pub tracker: Arc<FakeRootTracker>,
    pub transport: Arc<FakeTransport>,
}

impl Harness {
    /// Point the tracker at a root for `hash`, fetched now.
    pub fn publish(&self, seqno: i64, hash: &KitHash) {
        self.tracker
            .set_root(Some(root_with_hash(seqno, self.clock_now(), hash)));
    }

    pub fn clock_now(&self) -> Timestamp {
        use kitstore_test_utils::Clock;
        self.clock.now()
    }
}

pub fn start_time() -> Timestamp {
    chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn default_config() -> StoreConfig {
    StoreConfig::new(TAG, ENDPOINT, SUPPORTED_VERSION)
}

pub fn harness(db: Option<Arc<dyn KvStore>>) -> Harness {
    harness_with(default_config(), db, None)
}

pub fn harness_with(
    config: StoreConfig,
    db: Option<Arc<dyn KvStore>>,
    root: Option<MerkleRoot>,
) -> Harness {
    let clock = MockClock::new(start_time());
    let tracker = Arc::new(FakeRootTracker::new(root));
    let transport = Arc::new(FakeTransport::new());
    let deps = StoreDeps::new(tracker.clone(), transport.clone(), db)
        .with_clock(Arc::new(clock.clone()));
    let store = MerkleStore::new(config, fixture_hash_getter(), deps);
    Harness {
        store,
        clock,
        tracker,
        transport,
    }
}
