//! Single-slot in-process tier.

use kitstore_core::{Kit, KitHash};

use super::record::CacheRecord;

/// Holds at most one record. A store instance is already scoped to one tag,
/// so one slot is all it ever needs.
#[derive(Debug, Default)]
pub struct MemoryTier {
    slot: Option<CacheRecord>,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self::default()
    }

    /// The kit for `hash`, only on an exact hash match.
    pub fn get(&self, hash: &KitHash) -> Option<Kit> {
        self.slot
            .as_ref()
            .filter(|record| record.serves(hash))
            .map(|record| record.kit.clone())
    }

    /// Replace whatever the slot held.
    pub fn set(&mut self, hash: KitHash, kit: Kit) {
        self.slot = Some(CacheRecord::new(hash, kit));
    }

    pub fn current_hash(&self) -> Option<&KitHash> {
        self.slot.as_ref().map(|record| &record.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_misses() {
        let tier = MemoryTier::new();
        assert!(tier.get(&KitHash::new("abc")).is_none());
        assert!(tier.current_hash().is_none());
    }

    #[test]
    fn test_hit_only_on_exact_hash() {
        let mut tier = MemoryTier::new();
        tier.set(KitHash::new("abc123"), Kit::new("kit"));
        assert_eq!(tier.get(&KitHash::new("abc123")), Some(Kit::new("kit")));
        assert!(tier.get(&KitHash::new("abc")).is_none());
        assert!(tier.get(&KitHash::new("abc1234")).is_none());
    }

    #[test]
    fn test_set_overwrites() {
        let mut tier = MemoryTier::new();
        tier.set(KitHash::new("h1"), Kit::new("one"));
        tier.set(KitHash::new("h2"), Kit::new("two"));
        assert!(tier.get(&KitHash::new("h1")).is_none());
        assert_eq!(tier.get(&KitHash::new("h2")), Some(Kit::new("two")));
        assert_eq!(tier.current_hash(), Some(&KitHash::new("h2")));
    }
}
