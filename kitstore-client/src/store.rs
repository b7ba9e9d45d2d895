//! The merkle store: verified kits for one tag.
//!
//! A store checks that data served by the server matches the hash published
//! in the merkle root, which gives clients an auditable trail for the data
//! they use for proofs and validation. Resolution runs under one lock:
//!
//! ```text
//! freshness gate -> expected hash -> memory tier -> persistent tier -> fetch + verify
//! ```
//!
//! Concurrent callers queue on the lock rather than racing duplicate
//! refreshes or fetches for the same hash.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use kitstore_core::{
    hash_kit, is_empty_entry, verify_kit, Clock, ConfigError, Entry, FreshnessPolicy, Kit,
    KitHash, KitStoreError, KitStoreResult, KitTransport, MerkleRoot, RootFreshness,
    RootHashGetter, RootTracker, StoreConfig, SystemClock, VersionedKit,
};
use kitstore_storage::{CacheTier, KvStore, TieredCache};
use tokio::sync::Mutex;
use tracing::Instrument;

/// Collaborators a store is built from.
#[derive(Clone)]
pub struct StoreDeps {
    pub clock: Arc<dyn Clock>,
    pub root_tracker: Arc<dyn RootTracker>,
    pub transport: Arc<dyn KitTransport>,
    /// Local store for the persistent tier; `None` keeps kits in memory only.
    pub db: Option<Arc<dyn KvStore>>,
}

impl StoreDeps {
    /// Dependencies using the system clock.
    pub fn new(
        root_tracker: Arc<dyn RootTracker>,
        transport: Arc<dyn KitTransport>,
        db: Option<Arc<dyn KvStore>>,
    ) -> Self {
        Self {
            clock: Arc::new(SystemClock),
            root_tracker,
            transport,
            db,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Snapshot of a store's counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub mem_hits: u64,
    pub db_hits: u64,
    pub remote_fetches: u64,
    pub refresh_attempts: u64,
    pub refresh_failures: u64,
    /// Verified kits that did not reach the persistent tier.
    pub db_writes_skipped: u64,
}

#[derive(Debug, Default)]
struct StatCounters {
    mem_hits: AtomicU64,
    db_hits: AtomicU64,
    remote_fetches: AtomicU64,
    refresh_attempts: AtomicU64,
    refresh_failures: AtomicU64,
    db_writes_skipped: AtomicU64,
}

impl StatCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> StoreStats {
        StoreStats {
            mem_hits: self.mem_hits.load(Ordering::Relaxed),
            db_hits: self.db_hits.load(Ordering::Relaxed),
            remote_fetches: self.remote_fetches.load(Ordering::Relaxed),
            refresh_attempts: self.refresh_attempts.load(Ordering::Relaxed),
            refresh_failures: self.refresh_failures.load(Ordering::Relaxed),
            db_writes_skipped: self.db_writes_skipped.load(Ordering::Relaxed),
        }
    }
}

/// Verified, cached kits for one tag.
pub struct MerkleStore {
    config: StoreConfig,
    policy: FreshnessPolicy,
    /// Pulls this tag's expected hash out of a merkle root.
    get_root_hash: RootHashGetter,
    deps: StoreDeps,
    /// Guards the cache tiers and serializes every refresh and fetch.
    cache: Mutex<TieredCache>,
    counters: StatCounters,
}

impl MerkleStore {
    /// Build a store without checking `config`.
    ///
    /// Thresholds in the wrong order or an empty kit path are taken as
    /// given. Use [`MerkleStore::try_new`] for configs assembled at runtime.
    pub fn new(config: StoreConfig, get_root_hash: RootHashGetter, deps: StoreDeps) -> Self {
        let cache = TieredCache::new(&config.tag, deps.db.clone());
        Self {
            policy: FreshnessPolicy::from_config(&config),
            config,
            get_root_hash,
            deps,
            cache: Mutex::new(cache),
            counters: StatCounters::default(),
        }
    }

    /// Like [`MerkleStore::new`], rejecting a config that fails
    /// [`StoreConfig::validate`].
    pub fn try_new(
        config: StoreConfig,
        get_root_hash: RootHashGetter,
        deps: StoreDeps,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config, get_root_hash, deps))
    }

    pub fn tag(&self) -> &str {
        &self.config.tag
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn stats(&self) -> StoreStats {
        self.counters.snapshot()
    }

    /// The latest (active) entry for this store: the sub-document for the
    /// configured supported version, plus the hash of the kit it came from.
    pub async fn get_latest_entry(&self) -> KitStoreResult<Entry> {
        let span = tracing::debug_span!("merkle_store_entry", tag = %self.config.tag);
        async {
            let (kit, hash) = self.get_kit().await?;
            self.extract_entry(&kit, hash)
        }
        .instrument(span)
        .await
    }

    /// The current kit and its hash.
    ///
    /// With a kit file configured the file is returned as-is, unverified.
    /// Otherwise the merkle root is checked for freshness and its hash is
    /// resolved from memory, then the local db, then the server.
    pub async fn get_kit(&self) -> KitStoreResult<(Kit, KitHash)> {
        if let Some(path) = &self.config.kit_filename {
            tracing::debug!(path = %path.display(), "using kit file");
            return read_kit_file(path).await;
        }

        let mut cache = self.cache.lock().await;

        let root = self.fresh_root().await?;
        let hash = self.expected_hash(&root)?;

        if let Some((kit, tier)) = cache.lookup(&hash).await {
            match tier {
                CacheTier::Memory => StatCounters::bump(&self.counters.mem_hits),
                CacheTier::Persistent => StatCounters::bump(&self.counters.db_hits),
            }
            tracing::debug!(%hash, ?tier, "using cached kit");
            return Ok((kit, hash));
        }

        let kit = self.fetch(&hash).await?;

        if !cache.populate(hash.clone(), kit.clone()).await {
            StatCounters::bump(&self.counters.db_writes_skipped);
        }

        tracing::debug!(%hash, "using fetched kit");
        Ok((kit, hash))
    }

    /// The latest root, refreshed once if it is past the soft threshold.
    ///
    /// Called with the cache lock held.
    async fn fresh_root(&self) -> KitStoreResult<MerkleRoot> {
        let tracker = &self.deps.root_tracker;
        let mut root = tracker.last_root();

        let freshness = self
            .policy
            .classify(root.as_ref().map(MerkleRoot::fetched), self.deps.clock.now());
        if freshness.wants_refresh() {
            tracing::debug!(?freshness, "merkle root should refresh");
            StatCounters::bump(&self.counters.refresh_attempts);
            match tracker.refresh_root().await {
                Ok(()) => root = tracker.last_root(),
                Err(e) => {
                    StatCounters::bump(&self.counters.refresh_failures);
                    tracing::debug!(error = %e, "could not refresh merkle root");
                }
            }
        }

        let Some(root) = root else {
            return Err(KitStoreError::NoRootAvailable {
                tag: self.config.tag.clone(),
            });
        };

        // Age is measured from when the root was fetched, not published.
        let now = self.deps.clock.now();
        if self.policy.classify(Some(root.fetched()), now) == RootFreshness::Expired {
            tracing::debug!(
                seqno = root.seqno_or_zero(),
                fetched = %root.fetched(),
                "merkle root too old"
            );
            return Err(KitStoreError::RootTooStale {
                tag: self.config.tag.clone(),
                seqno: root.seqno_or_zero(),
                fetched: root.fetched(),
            });
        }

        Ok(root)
    }

    /// The hash the root instructs this store to use.
    fn expected_hash(&self, root: &MerkleRoot) -> KitStoreResult<KitHash> {
        let hash = KitHash::new((self.get_root_hash)(root));
        if hash.is_empty() {
            return Err(KitStoreError::EmptyExpectedHash {
                tag: self.config.tag.clone(),
                seqno: root.seqno_or_zero(),
            });
        }
        Ok(hash)
    }

    /// Fetch the kit for `hash` from the server and verify it. One attempt.
    async fn fetch(&self, hash: &KitHash) -> KitStoreResult<Kit> {
        tracing::debug!(%hash, endpoint = %self.config.endpoint, "fetching kit from server");
        StatCounters::bump(&self.counters.remote_fetches);

        let res = self
            .deps
            .transport
            .get_kit(&self.config.endpoint, hash)
            .await
            .map_err(|e| KitStoreError::RemoteFetchFailed {
                tag: self.config.tag.clone(),
                reason: e.to_string(),
            })?;

        if !res.status.is_ok() {
            return Err(KitStoreError::RemoteFetchFailed {
                tag: self.config.tag.clone(),
                reason: format!("server status {} ({})", res.status.code, res.status.name),
            });
        }
        if res.kit_json.is_empty() {
            return Err(KitStoreError::RemoteFetchFailed {
                tag: self.config.tag.clone(),
                reason: "server returned empty kit".to_string(),
            });
        }

        if !verify_kit(&res.kit_json, hash) {
            let actual = hash_kit(&res.kit_json);
            tracing::debug!(got = %actual, expected = %hash, "kit hash mismatch");
            return Err(KitStoreError::HashMismatch {
                tag: self.config.tag.clone(),
                expected: hash.clone(),
                actual,
            });
        }

        Ok(res.kit_json)
    }

    fn extract_entry(&self, kit: &Kit, hash: KitHash) -> KitStoreResult<Entry> {
        let tag = &self.config.tag;
        let version = self.config.supported_version;

        let parsed = VersionedKit::parse(kit).map_err(|e| KitStoreError::KitDecodeFailed {
            tag: tag.clone(),
            reason: e.to_string(),
        })?;

        let sub = parsed
            .entry_for(version)
            .ok_or_else(|| KitStoreError::MissingVersionEntry {
                tag: tag.clone(),
                version,
            })?;
        if is_empty_entry(sub) {
            return Err(KitStoreError::EmptyVersionEntry {
                tag: tag.clone(),
                version,
            });
        }

        Ok(Entry {
            hash,
            entry: sub.to_string(),
        })
    }
}

/// Load a kit from disk and hash it for bookkeeping.
async fn read_kit_file(path: &Path) -> KitStoreResult<(Kit, KitHash)> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| KitStoreError::LocalFileReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    let kit = Kit::new(text);
    let hash = hash_kit(&kit);
    Ok((kit, hash))
}
