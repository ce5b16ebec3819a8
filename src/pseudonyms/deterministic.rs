use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::DeterministicPseudonymStrategy;

/// SHA-256 over `identifier || salt || scope`.
pub struct Sha256DeterministicStrategy {
    salt: Zeroizing<String>,
}

impl Sha256DeterministicStrategy {
    pub const DIGEST_LEN: usize = 32;

    pub fn new(salt: impl Into<String>) -> Self {
        Self {
            salt: Zeroizing::new(salt.into()),
        }
    }
}

impl std::fmt::Debug for Sha256DeterministicStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sha256DeterministicStrategy")
            .field("salt", &"<REDACTED>")
            .finish()
    }
}

impl DeterministicPseudonymStrategy for Sha256DeterministicStrategy {
    fn digest(&self, identifier: &str, scope: &str) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(identifier.as_bytes());
        hasher.update(self.salt.as_bytes());
        hasher.update(scope.as_bytes());
        hasher.finalize().to_vec()
    }

    fn digest_len(&self) -> usize {
        Self::DIGEST_LEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pseudonyms::hash_encoding::encode_hash;

    #[test]
    fn test_digest_is_stable() {
        let strategy = Sha256DeterministicStrategy::new("salt");
        let a = strategy.digest("alice@worklytics.co", "");
        let b = strategy.digest("alice@worklytics.co", "");
        assert_eq!(a, b);
        assert_eq!(a.len(), strategy.digest_len());
    }

    #[test]
    fn test_digest_matches_reference_value() {
        let strategy = Sha256DeterministicStrategy::new("salt");
        assert_eq!(
            encode_hash(&strategy.digest("alice@worklytics.co", "")),
            "Qf4dLJ4jfqZLn9ef4VirvYjvOnRaVI5tf5oLnM65YOA"
        );
        assert_eq!(
            encode_hash(&strategy.digest("1", "hris")),
            "SappwO4KZKGprqqUNruNreBD2BVR98nEM6NRCu3R2dM"
        );
    }

    #[test]
    fn test_scope_changes_digest() {
        let strategy = Sha256DeterministicStrategy::new("salt");
        assert_ne!(strategy.digest("1", "hris"), strategy.digest("1", "slack"));
    }

    #[test]
    fn test_salt_changes_digest() {
        let a = Sha256DeterministicStrategy::new("salt");
        let b = Sha256DeterministicStrategy::new("pepper");
        assert_ne!(a.digest("1", "hris"), b.digest("1", "hris"));
    }

    #[test]
    fn test_debug_hides_salt() {
        let strategy = Sha256DeterministicStrategy::new("super-secret-salt");
        let rendered = format!("{strategy:?}");
        assert!(!rendered.contains("super-secret-salt"));
    }
}
