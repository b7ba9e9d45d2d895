//! Property-based tests for entry selection.
//!
//! For any kit table, the store returns exactly the raw sub-document stored
//! under the supported version, byte for byte, and reports a missing entry
//! for any version the table does not carry.

use std::sync::Arc;

use kitstore_client::KitStoreError;
use kitstore_storage::{KvStore, MemoryKvStore};
use kitstore_test_utils::{arb_kit_entries, kit_with_entries};
use proptest::prelude::*;
use tokio::runtime::Runtime;

#[path = "support/harness.rs"]
mod harness;
use harness::{default_config, harness_with};

fn test_runtime() -> Result<Runtime, TestCaseError> {
    Runtime::new().map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_entry_matches_supported_version(
        entries in arb_kit_entries(),
        pick in any::<prop::sample::Index>(),
    ) {
        let rt = test_runtime()?;
        let (version, raw) = entries[pick.index(entries.len())].clone();
        let table: Vec<(i64, &str)> = entries.iter().map(|(v, e)| (*v, e.as_str())).collect();
        let kit = kit_with_entries(&table);

        let mut config = default_config();
        config.supported_version = version;
        let db: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
        let h = harness_with(config, Some(db), None);
        let hash = h.transport.serve_verified(kit);
        h.publish(1, &hash);

        let entry = rt
            .block_on(h.store.get_latest_entry())
            .map_err(|e| TestCaseError::fail(format!("get_latest_entry failed: {}", e)))?;
        prop_assert_eq!(entry.entry, raw);
        prop_assert_eq!(entry.hash, hash);
    }

    #[test]
    fn prop_absent_version_is_missing(
        entries in arb_kit_entries(),
        absent in 50i64..100,
    ) {
        let rt = test_runtime()?;
        let table: Vec<(i64, &str)> = entries.iter().map(|(v, e)| (*v, e.as_str())).collect();

        let mut config = default_config();
        config.supported_version = absent;
        let h = harness_with(config, None, None);
        let hash = h.transport.serve_verified(kit_with_entries(&table));
        h.publish(1, &hash);

        let result = rt.block_on(h.store.get_latest_entry());
        let is_missing = matches!(
            result,
            Err(KitStoreError::MissingVersionEntry { version, .. }) if version == absent
        );
        prop_assert!(is_missing);
    }
}
