use std::sync::LazyLock;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use regex::{Captures, Regex};

use crate::error::{GatewayError, Result};

use super::{Pseudonym, ReversiblePseudonymStrategy};

/// Marks the start of a pseudonym token inside arbitrary text.
pub const TOKEN_PREFIX: &str = "p~";

/// A prefix followed by at least one full digest (32 bytes = 43 base64 chars).
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"p~[A-Za-z0-9_-]{43,}").expect("token pattern should compile")
});

/// Converts binary pseudonyms to and from a text form.
pub trait PseudonymEncoder: Send + Sync {
    fn encode(&self, pseudonym: &Pseudonym) -> String;

    fn decode(&self, encoded: &str) -> Result<Pseudonym>;
}

/// `p~` + URL-safe base64 (no padding) of the reversible bytes, or of the
/// bare hash when the pseudonym is not reversible.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlSafeTokenEncoder;

impl UrlSafeTokenEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Replaces every reversible token in `text` with the identifier it seals.
    ///
    /// Tokens that are hash-only, or that fail to decode or decrypt, stay in
    /// place; everything else passes through unchanged.
    pub fn reverse_all(&self, text: &str, strategy: &dyn ReversiblePseudonymStrategy) -> String {
        TOKEN_PATTERN
            .replace_all(text, |caps: &Captures| {
                let token = &caps[0];
                match self.reverse_token(token, strategy) {
                    Ok(Some(identifier)) => identifier,
                    Ok(None) => token.to_string(),
                    Err(e) => {
                        tracing::debug!("leaving pseudonym token in place: {}", e);
                        token.to_string()
                    }
                }
            })
            .into_owned()
    }

    /// Tokens in `text` that look like pseudonyms, in order of appearance.
    pub fn find_tokens<'t>(&self, text: &'t str) -> Vec<&'t str> {
        TOKEN_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
    }

    fn reverse_token(
        &self,
        token: &str,
        strategy: &dyn ReversiblePseudonymStrategy,
    ) -> Result<Option<String>> {
        let pseudonym = self.decode(token)?;
        match pseudonym.reversible {
            Some(sealed) => strategy.open(&sealed).map(Some),
            None => Ok(None),
        }
    }
}

impl PseudonymEncoder for UrlSafeTokenEncoder {
    fn encode(&self, pseudonym: &Pseudonym) -> String {
        let payload = pseudonym.reversible.as_deref().unwrap_or(&pseudonym.hash);
        format!("{TOKEN_PREFIX}{}", URL_SAFE_NO_PAD.encode(payload))
    }

    fn decode(&self, encoded: &str) -> Result<Pseudonym> {
        let payload = encoded
            .strip_prefix(TOKEN_PREFIX)
            .ok_or_else(|| GatewayError::Decode {
                reason: format!("token does not start with {TOKEN_PREFIX}"),
            })?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.as_bytes())
            .map_err(|e| GatewayError::Decode {
                reason: format!("invalid token payload: {e}"),
            })?;

        match bytes.len() {
            n if n < Pseudonym::HASH_SIZE_BYTES => Err(GatewayError::Decode {
                reason: format!(
                    "token payload has {n} bytes, expected at least {}",
                    Pseudonym::HASH_SIZE_BYTES
                ),
            }),
            n if n == Pseudonym::HASH_SIZE_BYTES => Ok(Pseudonym::from_hash(bytes)),
            _ => Pseudonym::from_reversible(bytes),
        }
    }
}
