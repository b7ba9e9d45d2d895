//! Content verification for kits.
//!
//! The hash is hex SHA-512 over the exact kit bytes, so whitespace matters.
//! This is the only check standing between "the server sent X" and "the
//! authority published X".

use sha2::{Digest, Sha512};

use crate::{Kit, KitHash};

/// Compute the hex SHA-512 of a kit's exact bytes.
pub fn hash_kit(kit: &Kit) -> KitHash {
    let mut hasher = Sha512::new();
    hasher.update(kit.as_bytes());
    KitHash::new(hex::encode(hasher.finalize()))
}

/// Returns true iff the kit hashes to `expected`.
pub fn verify_kit(kit: &Kit, expected: &KitHash) -> bool {
    hash_kit(kit) == *expected
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_known_vector() {
        let hash = hash_kit(&Kit::new("hello"));
        assert_eq!(
            hash.as_str(),
            "9b71d224bd62f3785d96d46ad3ea3d73319bfbc2890caadae2dff72519673ca7\
             2323c3d99ba5c11d7c7acc6e14b8c5da0c4663475c2e5c3adef46f73bcdec043"
        );
    }

    #[test]
    fn test_hash_is_whitespace_sensitive() {
        let a = hash_kit(&Kit::new(r#"{"kit_version":1}"#));
        let b = hash_kit(&Kit::new(r#"{"kit_version": 1}"#));
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_wrong_hash() {
        let kit = Kit::new("hello");
        assert!(verify_kit(&kit, &hash_kit(&kit)));
        assert!(!verify_kit(&kit, &KitHash::new("abc123")));
        assert!(!verify_kit(&kit, &KitHash::default()));
    }

    proptest! {
        #[test]
        fn prop_hash_is_128_lowercase_hex(text in ".*") {
            let hash = hash_kit(&Kit::new(text));
            prop_assert_eq!(hash.as_str().len(), 128);
            prop_assert!(hash.as_str().chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }

        #[test]
        fn prop_appending_changes_hash(text in ".*", suffix in ".+") {
            let original = Kit::new(text.clone());
            let tampered = Kit::new(format!("{}{}", text, suffix));
            prop_assert!(!verify_kit(&tampered, &hash_kit(&original)));
        }
    }
}
