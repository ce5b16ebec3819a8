use serde::{Deserialize, Serialize};

/// Scope reserved for email addresses.
pub const EMAIL_SCOPE: &str = "email";

/// Replacement written in place of an identifying leaf value.
///
/// Serializes as `{"scope":..,"domain":..,"hash":..,"original":..}` with
/// `domain` and `original` omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PseudonymizedIdentity {
    pub scope: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    pub hash: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
}

/// Scope fed into the hash. Email identifiers hash with an empty scope so
/// their values match those produced before scopes were introduced.
pub fn as_legacy_scope(scope: &str) -> &str {
    if scope == EMAIL_SCOPE {
        ""
    } else {
        scope
    }
}
