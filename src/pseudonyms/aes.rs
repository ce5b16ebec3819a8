use std::sync::Arc;

use aes::Aes256;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{GatewayError, Result};

use super::{Canonicalization, DeterministicPseudonymStrategy, ReversiblePseudonymStrategy};

const KEY_LEN: usize = 32;
const CBC_IV_LEN: usize = 16;
const GCM_NONCE_LEN: usize = 12;

/// Block cipher mode used to seal identifiers.
///
/// Both modes derive their IV/nonce from the deterministic digest, so sealing
/// the same identifier twice yields the same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CipherSuite {
    /// AES-256-CBC with PKCS#7 padding, IV = digest[..16].
    #[default]
    Cbc,
    /// AES-256-GCM, nonce = digest[..12], 128-bit tag.
    Gcm,
}

impl std::fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CipherSuite::Cbc => write!(f, "cbc"),
            CipherSuite::Gcm => write!(f, "gcm"),
        }
    }
}

impl std::str::FromStr for CipherSuite {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cbc" => Ok(CipherSuite::Cbc),
            "gcm" => Ok(CipherSuite::Gcm),
            _ => Err(format!("unknown cipher suite: {s}")),
        }
    }
}

/// Reversible pseudonyms: `digest || AES(identifier)` under a pre-shared key.
pub struct AesReversibleStrategy {
    suite: CipherSuite,
    deterministic: Arc<dyn DeterministicPseudonymStrategy>,
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl AesReversibleStrategy {
    pub fn new(
        suite: CipherSuite,
        deterministic: Arc<dyn DeterministicPseudonymStrategy>,
        key: &[u8],
    ) -> Result<Self> {
        let key: [u8; KEY_LEN] = key.try_into().map_err(|_| GatewayError::InvalidKey {
            reason: format!("expected {KEY_LEN} key bytes, got {}", key.len()),
        })?;
        let min_digest = match suite {
            CipherSuite::Cbc => CBC_IV_LEN,
            CipherSuite::Gcm => GCM_NONCE_LEN,
        };
        if deterministic.digest_len() < min_digest {
            return Err(GatewayError::InvalidArgument {
                reason: format!(
                    "{suite} needs a digest of at least {min_digest} bytes, strategy yields {}",
                    deterministic.digest_len()
                ),
            });
        }
        Ok(Self {
            suite,
            deterministic,
            key: Zeroizing::new(key),
        })
    }

    fn encrypt(&self, digest: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        match self.suite {
            CipherSuite::Cbc => {
                let encryptor =
                    cbc::Encryptor::<Aes256>::new_from_slices(&self.key[..], &digest[..CBC_IV_LEN])
                        .map_err(|e| GatewayError::InvalidKey {
                            reason: e.to_string(),
                        })?;
                Ok(encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
            }
            CipherSuite::Gcm => {
                let cipher = Aes256Gcm::new_from_slice(&self.key[..]).map_err(|e| {
                    GatewayError::InvalidKey {
                        reason: e.to_string(),
                    }
                })?;
                cipher
                    .encrypt(Nonce::from_slice(&digest[..GCM_NONCE_LEN]), plaintext)
                    .map_err(|e| GatewayError::InvalidArgument {
                        reason: format!("encryption failed: {e}"),
                    })
            }
        }
    }

    fn decrypt(&self, digest: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        match self.suite {
            CipherSuite::Cbc => {
                let decryptor =
                    cbc::Decryptor::<Aes256>::new_from_slices(&self.key[..], &digest[..CBC_IV_LEN])
                        .map_err(|e| GatewayError::InvalidKey {
                            reason: e.to_string(),
                        })?;
                decryptor
                    .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                    .map_err(|_| GatewayError::DecryptionFailed {
                        reason: "bad padding".into(),
                    })
            }
            CipherSuite::Gcm => {
                let cipher = Aes256Gcm::new_from_slice(&self.key[..]).map_err(|e| {
                    GatewayError::InvalidKey {
                        reason: e.to_string(),
                    }
                })?;
                cipher
                    .decrypt(Nonce::from_slice(&digest[..GCM_NONCE_LEN]), ciphertext)
                    .map_err(|_| GatewayError::DecryptionFailed {
                        reason: "authentication tag mismatch".into(),
                    })
            }
        }
    }
}

impl std::fmt::Debug for AesReversibleStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesReversibleStrategy")
            .field("suite", &self.suite)
            .field("key", &"<REDACTED>")
            .finish()
    }
}

impl ReversiblePseudonymStrategy for AesReversibleStrategy {
    fn seal(&self, identifier: &str, canonicalization: Canonicalization<'_>) -> Result<Vec<u8>> {
        let digest = self
            .deterministic
            .digest(&canonicalization(identifier), "");
        let ciphertext = self.encrypt(&digest, identifier.as_bytes())?;

        let mut sealed = digest;
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    fn open(&self, sealed: &[u8]) -> Result<String> {
        let digest_len = self.deterministic.digest_len();
        if sealed.len() <= digest_len {
            return Err(GatewayError::Decode {
                reason: format!(
                    "sealed pseudonym has {} bytes, expected more than {digest_len}",
                    sealed.len()
                ),
            });
        }
        let (digest, ciphertext) = sealed.split_at(digest_len);
        let plain = self.decrypt(digest, ciphertext)?;
        String::from_utf8(plain).map_err(|e| GatewayError::DecryptionFailed {
            reason: format!("plaintext is not utf-8: {e}"),
        })
    }

    fn digest_len(&self) -> usize {
        self.deterministic.digest_len()
    }
}
