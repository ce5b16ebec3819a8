use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::{GatewayError, Result};

use super::identity::EMAIL_SCOPE;

/// A bare RFC 5322 addr-spec: dot-atom local part, hostname domain.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*)@([A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*)$",
    )
    .expect("email pattern should compile")
});

/// Local part and domain of a single email address, as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailParts<'a> {
    pub local_part: &'a str,
    pub domain: &'a str,
}

/// Splits `value` into local part and domain if it is one plain email address.
/// Surrounding whitespace is ignored.
pub fn parse_email(value: &str) -> Option<EmailParts<'_>> {
    let caps = EMAIL_PATTERN.captures(value.trim())?;
    Some(EmailParts {
        local_part: caps.get(1)?.as_str(),
        domain: caps.get(2)?.as_str(),
    })
}

/// Canonical form of a leaf value plus the scope it is hashed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonical {
    pub value: String,
    pub scope: String,
    /// Domain as written in the source, for email identifiers only.
    pub domain: Option<String>,
}

/// Collapses equivalent spellings of an identifier onto one form.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    default_scope: String,
}

impl Canonicalizer {
    pub fn new(default_scope: impl Into<String>) -> Self {
        Self {
            default_scope: default_scope.into(),
        }
    }

    pub fn default_scope(&self) -> &str {
        &self.default_scope
    }

    /// Canonicalize a JSON leaf. Only strings and numbers are identifiers.
    pub fn canonicalize(&self, value: &Value) -> Result<Canonical> {
        match value {
            Value::String(s) => Ok(self.canonicalize_str(s)),
            Value::Number(n) => Ok(self.default_scoped(n.to_string())),
            other => Err(GatewayError::InvalidArgument {
                reason: format!(
                    "value must be a string or number leaf, got {}",
                    value_kind(other)
                ),
            }),
        }
    }

    pub fn canonicalize_str(&self, value: &str) -> Canonical {
        match parse_email(value) {
            Some(email) => Canonical {
                value: format!(
                    "{}@{}",
                    email.local_part.to_lowercase(),
                    email.domain.to_lowercase()
                ),
                scope: EMAIL_SCOPE.to_string(),
                domain: Some(email.domain.to_string()),
            },
            None => self.default_scoped(value.to_string()),
        }
    }

    fn default_scoped(&self, value: String) -> Canonical {
        Canonical {
            value,
            scope: self.default_scope.clone(),
            domain: None,
        }
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
