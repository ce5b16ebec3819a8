pub mod rules;

pub use rules::*;

use std::path::Path;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{GatewayError, Result};

/// Secret salt mixed into every hash.
pub const SALT_ENV: &str = "PSOXY_SALT";
/// Scope assigned to identifiers that are not email addresses.
pub const SCOPE_ENV: &str = "IDENTIFIER_SCOPE_ID";
/// Base64 AES-256 key for reversible pseudonyms.
pub const ENCRYPTION_KEY_ENV: &str = "PSOXY_ENCRYPTION_KEY";

/// Sanitizer options: secrets, default scope and the rule set to enforce.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    #[serde(default, skip_serializing)]
    pub pseudonymization_salt: String,

    #[serde(default)]
    pub default_scope_id: String,

    /// Legacy rules; ignored whenever `rules2` is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Rules1>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules2: Option<Rules2>,
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("pseudonymization_salt", &"<REDACTED>")
            .field("default_scope_id", &self.default_scope_id)
            .field("rules", &self.rules)
            .field("rules2", &self.rules2)
            .finish()
    }
}

impl Options {
    pub fn new(salt: impl Into<String>, default_scope_id: impl Into<String>) -> Self {
        Self {
            pseudonymization_salt: salt.into(),
            default_scope_id: default_scope_id.into(),
            rules: None,
            rules2: None,
        }
    }

    pub fn with_rules(mut self, rules: Rules1) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn with_rules2(mut self, rules2: Rules2) -> Self {
        self.rules2 = Some(rules2);
        self
    }

    /// Load options from a YAML (or JSON) file, then apply environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let options: Self =
            serde_yaml::from_str(&contents).map_err(|e| GatewayError::ConfigParse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(options.with_env_overrides())
    }

    /// `PSOXY_SALT` and `IDENTIFIER_SCOPE_ID` win over file values when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(salt) = std::env::var(SALT_ENV) {
            self.pseudonymization_salt = salt;
        }
        if let Ok(scope) = std::env::var(SCOPE_ENV) {
            self.default_scope_id = scope;
        }
        self
    }

    /// Checks the settings every sanitizer needs before any rule is compiled.
    pub fn validate(&self) -> Result<()> {
        if self.pseudonymization_salt.is_empty() {
            return Err(GatewayError::Config {
                reason: format!("pseudonymization salt is not set (config or {SALT_ENV})"),
            });
        }
        if self.default_scope_id.is_empty() {
            return Err(GatewayError::Config {
                reason: format!("default scope id is not set (config or {SCOPE_ENV})"),
            });
        }
        Ok(())
    }

    /// Fingerprint of the active rule set, for tagging sanitized output.
    pub fn rules_sha(&self) -> Result<String> {
        let serialized = match (&self.rules2, &self.rules) {
            (Some(rules2), _) => serde_json::to_string(rules2)?,
            (None, Some(rules)) => serde_json::to_string(rules)?,
            (None, None) => String::new(),
        };
        Ok(format!("{:x}", Sha256::digest(serialized.as_bytes())))
    }
}

/// Decode a base64 AES key (standard or URL-safe alphabet).
pub fn decode_key(encoded: &str) -> Result<Zeroizing<Vec<u8>>> {
    let trimmed = encoded.trim();
    STANDARD
        .decode(trimmed)
        .or_else(|_| URL_SAFE_NO_PAD.decode(trimmed.trim_end_matches('=')))
        .map(Zeroizing::new)
        .map_err(|e| GatewayError::InvalidKey {
            reason: format!("key is not valid base64: {e}"),
        })
}

/// Read the reversible-pseudonym key from `PSOXY_ENCRYPTION_KEY`, if set.
pub fn encryption_key_from_env() -> Result<Option<Zeroizing<Vec<u8>>>> {
    match std::env::var(ENCRYPTION_KEY_ENV) {
        Ok(encoded) => decode_key(&encoded).map(Some),
        Err(_) => Ok(None),
    }
}
