//! Typed keys for the local key-value store.
//!
//! A `DbKey` pairs a key type with a per-instance key. Every persistent
//! write goes through one, so records of different types cannot collide
//! even when their instance keys are equal.

/// Separator byte between the type tag and the instance key.
///
/// 0xFF never occurs in UTF-8, so no type tag can run into its key.
const SEPARATOR: u8 = 0xFF;

/// Kinds of record kept in the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbKeyType {
    /// Verified kits cached by a merkle store, one per tag.
    MerkleStore,
}

impl DbKeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MerkleStore => "merkle-store",
        }
    }
}

/// A key in the local store: `{typ, key}`.
///
/// # Binary Format
///
/// `[type tag: utf8][0xFF][key: utf8]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DbKey {
    typ: DbKeyType,
    key: String,
}

impl DbKey {
    pub fn new(typ: DbKeyType, key: impl Into<String>) -> Self {
        Self {
            typ,
            key: key.into(),
        }
    }

    /// Key for the kit cached by the merkle store tagged `tag`.
    pub fn merkle_store(tag: impl Into<String>) -> Self {
        Self::new(DbKeyType::MerkleStore, tag)
    }

    pub fn typ(&self) -> DbKeyType {
        self.typ
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn encode(&self) -> Vec<u8> {
        let typ = self.typ.as_str().as_bytes();
        let mut bytes = Vec::with_capacity(typ.len() + 1 + self.key.len());
        bytes.extend_from_slice(typ);
        bytes.push(SEPARATOR);
        bytes.extend_from_slice(self.key.as_bytes());
        bytes
    }
}

impl std::fmt::Display for DbKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.typ.as_str(), self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_layout() {
        let key = DbKey::merkle_store("pvl");
        let bytes = key.encode();
        assert!(bytes.starts_with(b"merkle-store"));
        assert_eq!(bytes[12], SEPARATOR);
        assert_eq!(&bytes[13..], b"pvl");
    }

    #[test]
    fn test_display() {
        assert_eq!(DbKey::merkle_store("pvl").to_string(), "merkle-store:pvl");
    }

    #[test]
    fn test_distinct_tags_distinct_keys() {
        assert_ne!(
            DbKey::merkle_store("pvl").encode(),
            DbKey::merkle_store("externals").encode()
        );
    }

    proptest! {
        #[test]
        fn prop_encoding_keeps_tags_apart(a in ".*", b in ".*") {
            prop_assume!(a != b);
            prop_assert_ne!(
                DbKey::merkle_store(a).encode(),
                DbKey::merkle_store(b).encode()
            );
        }
    }
}
