pub mod aes;
pub mod deterministic;
pub mod encoder;
pub mod hash_encoding;

pub use self::aes::{AesReversibleStrategy, CipherSuite};
pub use deterministic::Sha256DeterministicStrategy;
pub use encoder::{PseudonymEncoder, UrlSafeTokenEncoder, TOKEN_PREFIX};

use crate::error::{GatewayError, Result};

/// Maps an identifier to its canonical form before it is digested.
pub type Canonicalization<'a> = &'a dyn Fn(&str) -> String;

/// Canonicalization that leaves the identifier untouched.
pub fn no_canonicalization(identifier: &str) -> String {
    identifier.to_string()
}

/// One-way pseudonyms: same identifier, salt and scope always give the same bytes.
pub trait DeterministicPseudonymStrategy: Send + Sync {
    /// Digest of `identifier` under this strategy's salt, disambiguated by `scope`.
    fn digest(&self, identifier: &str, scope: &str) -> Vec<u8>;

    /// Length in bytes of every digest this strategy produces.
    fn digest_len(&self) -> usize;
}

/// Pseudonyms that holders of the strategy's key can turn back into identifiers.
pub trait ReversiblePseudonymStrategy: Send + Sync {
    /// Returns `digest(canonical(identifier)) || ciphertext(identifier)`.
    fn seal(&self, identifier: &str, canonicalization: Canonicalization<'_>) -> Result<Vec<u8>>;

    /// Recovers the identifier from bytes produced by [`seal`](Self::seal).
    fn open(&self, sealed: &[u8]) -> Result<String>;

    /// Length of the digest prefix of sealed values.
    fn digest_len(&self) -> usize;
}

/// Binary pseudonym: the deterministic digest plus, optionally, the sealed form.
///
/// When present, `reversible` always starts with `hash`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pseudonym {
    pub hash: Vec<u8>,
    pub reversible: Option<Vec<u8>>,
}

impl Pseudonym {
    /// Digest length of the SHA-256 strategy; tokens are split at this offset.
    pub const HASH_SIZE_BYTES: usize = 32;

    pub fn from_hash(hash: Vec<u8>) -> Self {
        Self {
            hash,
            reversible: None,
        }
    }

    /// Builds a pseudonym from sealed bytes, taking the digest from their prefix.
    pub fn from_reversible(reversible: Vec<u8>) -> Result<Self> {
        if reversible.len() <= Self::HASH_SIZE_BYTES {
            return Err(GatewayError::Decode {
                reason: format!(
                    "reversible pseudonym must be longer than {} bytes, got {}",
                    Self::HASH_SIZE_BYTES,
                    reversible.len()
                ),
            });
        }
        Ok(Self {
            hash: reversible[..Self::HASH_SIZE_BYTES].to_vec(),
            reversible: Some(reversible),
        })
    }
}
