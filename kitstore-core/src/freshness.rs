//! Freshness policy for merkle roots.
//!
//! A root is judged by the local time it was fetched. Two thresholds apply:
//! past `should_refresh` the store attempts one refresh, past
//! `require_refresh` the root is refused even if that refresh failed.

use std::time::Duration;

use crate::config::StoreConfig;
use crate::Timestamp;

/// How usable a root is at a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootFreshness {
    /// Age within `should_refresh`. Use as-is.
    Fresh,

    /// Older than `should_refresh` but within `require_refresh`.
    ///
    /// One refresh should be attempted; if it fails the old root is still
    /// acceptable.
    Refreshable,

    /// Older than `require_refresh`, or no root at all. Unusable unless a
    /// refresh produces something newer.
    Expired,
}

impl RootFreshness {
    /// Returns true if a refresh should be attempted before use.
    pub fn wants_refresh(&self) -> bool {
        !matches!(self, Self::Fresh)
    }

    /// Returns true if the root may back a resolution.
    pub fn is_usable(&self) -> bool {
        !matches!(self, Self::Expired)
    }
}

/// The two staleness thresholds for one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    should_refresh: Duration,
    require_refresh: Duration,
}

impl FreshnessPolicy {
    pub fn new(should_refresh: Duration, require_refresh: Duration) -> Self {
        Self {
            should_refresh,
            require_refresh,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.should_refresh(), config.require_refresh())
    }

    pub fn should_refresh(&self) -> Duration {
        self.should_refresh
    }

    pub fn require_refresh(&self) -> Duration {
        self.require_refresh
    }

    /// Age of a root fetched at `fetched`. Fetch times in the future count as zero.
    pub fn age(fetched: Timestamp, now: Timestamp) -> Duration {
        now.signed_duration_since(fetched)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Strictly older than `limit`.
    pub fn is_past_due(fetched: Timestamp, now: Timestamp, limit: Duration) -> bool {
        Self::age(fetched, now) > limit
    }

    /// Classify a root's fetch time, `None` meaning no root is known.
    pub fn classify(&self, fetched: Option<Timestamp>, now: Timestamp) -> RootFreshness {
        let Some(fetched) = fetched else {
            return RootFreshness::Expired;
        };
        if Self::is_past_due(fetched, now, self.require_refresh) {
            RootFreshness::Expired
        } else if Self::is_past_due(fetched, now, self.should_refresh) {
            RootFreshness::Refreshable
        } else {
            RootFreshness::Fresh
        }
    }
}
