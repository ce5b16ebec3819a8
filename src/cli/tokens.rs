use std::sync::Arc;

use crate::config::{encryption_key_from_env, ENCRYPTION_KEY_ENV, SALT_ENV};
use crate::error::{GatewayError, Result};
use crate::pseudonyms::{
    AesReversibleStrategy, CipherSuite, Pseudonym, PseudonymEncoder, ReversiblePseudonymStrategy,
    Sha256DeterministicStrategy, UrlSafeTokenEncoder,
};
use crate::sanitize::Canonicalizer;

/// Build the reversible strategy from `--salt` (or `PSOXY_SALT`) and `PSOXY_ENCRYPTION_KEY`.
pub fn reversible_strategy(salt: Option<&str>, suite: CipherSuite) -> Result<AesReversibleStrategy> {
    let salt = match salt {
        Some(salt) => salt.to_string(),
        None => std::env::var(SALT_ENV).map_err(|_| GatewayError::Config {
            reason: format!("no salt given (--salt or {SALT_ENV})"),
        })?,
    };
    let key = encryption_key_from_env()?.ok_or_else(|| GatewayError::Config {
        reason: format!("{ENCRYPTION_KEY_ENV} is not set"),
    })?;

    AesReversibleStrategy::new(
        suite,
        Arc::new(Sha256DeterministicStrategy::new(salt)),
        &key,
    )
}

/// Seal `identifier` and encode it as a `p~` token.
pub fn tokenize(identifier: &str, strategy: &dyn ReversiblePseudonymStrategy) -> Result<String> {
    // canonical value only; scope never enters the sealed digest
    let canonicalizer = Canonicalizer::new("");
    let canonical = |value: &str| canonicalizer.canonicalize_str(value).value;

    let sealed = strategy.seal(identifier, &canonical)?;
    let pseudonym = Pseudonym::from_reversible(sealed)?;
    Ok(UrlSafeTokenEncoder::new().encode(&pseudonym))
}

pub fn run_tokenize(identifier: &str, salt: Option<&str>, suite: CipherSuite) -> Result<()> {
    let strategy = reversible_strategy(salt, suite)?;
    println!("{}", tokenize(identifier, &strategy)?);
    Ok(())
}

/// Replace every reversible token in `text` with its identifier.
pub fn run_reverse(text: &str, salt: Option<&str>, suite: CipherSuite) -> Result<()> {
    let strategy = reversible_strategy(salt, suite)?;
    let encoder = UrlSafeTokenEncoder::new();

    let reversed = encoder.reverse_all(text, &strategy);
    let untouched = encoder.find_tokens(&reversed).len();
    if untouched > 0 {
        tracing::warn!(untouched, "some tokens could not be reversed");
    }
    println!("{reversed}");
    Ok(())
}
