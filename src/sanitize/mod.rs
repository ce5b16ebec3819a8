pub mod canonical;
pub mod compiled;
pub mod document;
pub mod email_header;
pub mod identity;
pub mod url;

pub use canonical::{Canonical, Canonicalizer};
pub use identity::{as_legacy_scope, PseudonymizedIdentity, EMAIL_SCOPE};
pub use url::relative_url;

use std::collections::HashMap;

use serde_json::Value;

use crate::config::{Options, Rules1};
use crate::error::{GatewayError, Result};
use crate::pseudonyms::hash_encoding::encode_hash;
use crate::pseudonyms::{DeterministicPseudonymStrategy, Sha256DeterministicStrategy};

use canonical::value_kind;
use compiled::{CompiledRules, CompiledTransform};
use document::CompiledPath;

/// What happens to a CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnTransform {
    Redact,
    Pseudonymize { include_original: bool },
}

/// Rewrites payloads from the source API according to a compiled rule set.
///
/// Every regex and JSONPath is compiled in [`Sanitizer::new`]; afterwards the
/// sanitizer is immutable and can be shared across threads.
pub struct Sanitizer {
    canonicalizer: Canonicalizer,
    deterministic: Box<dyn DeterministicPseudonymStrategy>,
    rules: CompiledRules,
    columns: HashMap<String, ColumnTransform>,
    rules_sha: String,
}

impl std::fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sanitizer")
            .field("default_scope", &self.canonicalizer.default_scope())
            .field("rules", &self.rules)
            .field("columns", &self.columns)
            .field("rules_sha", &self.rules_sha)
            .finish()
    }
}

impl Sanitizer {
    /// Build a sanitizer hashing with SHA-256 under the configured salt.
    ///
    /// The salt is moved out of `options` into the strategy, never copied.
    pub fn new(mut options: Options) -> Result<Self> {
        options.validate()?;
        let salt = std::mem::take(&mut options.pseudonymization_salt);
        let deterministic = Box::new(Sha256DeterministicStrategy::new(salt));

        let rules = CompiledRules::compile(options.rules.as_ref(), options.rules2.as_ref())?;
        let columns = options
            .rules
            .as_ref()
            .map(column_transforms)
            .unwrap_or_default();
        let rules_sha = options.rules_sha()?;

        Ok(Self {
            canonicalizer: Canonicalizer::new(options.default_scope_id),
            deterministic,
            rules,
            columns,
            rules_sha,
        })
    }

    pub fn rules_sha(&self) -> &str {
        &self.rules_sha
    }

    /// Whether the proxy may fetch `url` at all.
    pub fn is_allowed(&self, url: &str) -> bool {
        self.rules.is_allowed(&relative_url(url))
    }

    /// Sanitize a JSON response fetched from `url`.
    ///
    /// Documents from endpoints no rule covers come back unchanged.
    pub fn sanitize(&self, url: &str, json: &str) -> Result<String> {
        let relative = relative_url(url);
        if !self.rules.is_allowed(&relative) {
            return Err(GatewayError::InvariantViolation {
                reason: format!("asked to sanitize a response that should not have been fetched: {relative}"),
            });
        }
        if json.is_empty() {
            return Ok(String::new());
        }

        let _span = tracing::debug_span!("sanitize", url = %relative).entered();
        match &self.rules {
            CompiledRules::Endpoints(endpoints) => match endpoints.matching(&relative) {
                Some(endpoint) => {
                    tracing::debug!("matched endpoint {}", endpoint.path_regex());
                    let mut document: Value = serde_json::from_str(json)?;
                    for transform in &endpoint.transforms {
                        self.apply_transform(transform, &mut document)?;
                    }
                    Ok(serde_json::to_string(&document)?)
                }
                None => Ok(json.to_string()),
            },
            CompiledRules::Legacy(rules) => {
                let plan = rules.plan(&relative);
                if plan.is_empty() {
                    return Ok(json.to_string());
                }
                let mut document: Value = serde_json::from_str(json)?;
                for path in &plan.redactions {
                    document::delete(&mut document, path);
                }
                for path in &plan.pseudonymizations {
                    self.pseudonymize_at(&mut document, path, false)?;
                }
                for path in &plan.email_headers {
                    self.pseudonymize_email_header_at(&mut document, path)?;
                }
                for path in &plan.with_originals {
                    self.pseudonymize_at(&mut document, path, true)?;
                }
                Ok(serde_json::to_string(&document)?)
            }
            CompiledRules::None => Ok(json.to_string()),
        }
    }

    fn apply_transform(&self, transform: &CompiledTransform, document: &mut Value) -> Result<()> {
        match transform {
            CompiledTransform::Redact(paths) => {
                for path in paths {
                    document::delete(document, path);
                }
            }
            CompiledTransform::Pseudonymize {
                paths,
                include_original,
            } => {
                for path in paths {
                    self.pseudonymize_at(document, path, *include_original)?;
                }
            }
            CompiledTransform::PseudonymizeEmailHeader(paths) => {
                for path in paths {
                    self.pseudonymize_email_header_at(document, path)?;
                }
            }
        }
        Ok(())
    }

    fn pseudonymize_at(
        &self,
        document: &mut Value,
        path: &CompiledPath,
        include_original: bool,
    ) -> Result<()> {
        document::map(document, path, |value| {
            let identity = self.pseudonymize_value(value, include_original)?;
            Ok(identity.map(serde_json::to_value).transpose()?)
        })
        .map_err(|e| match e {
            GatewayError::InvalidArgument { reason } => GatewayError::InvalidArgument {
                reason: format!("{reason} (at {})", path.as_str()),
            },
            other => other,
        })?;
        Ok(())
    }

    /// Headers that fail to parse lose their value (set to `null`) rather than
    /// leaking the addresses through unchanged.
    fn pseudonymize_email_header_at(&self, document: &mut Value, path: &CompiledPath) -> Result<()> {
        document::map(document, path, |value| {
            if value.is_null() {
                return Ok(None);
            }
            match self.pseudonymize_email_header(value)? {
                Some(identities) => Ok(Some(serde_json::to_value(identities)?)),
                None => Ok(Some(Value::Null)),
            }
        })?;
        Ok(())
    }

    /// Pseudonymize a JSON leaf. `null` stays `null` (returns `None`).
    pub fn pseudonymize(&self, value: &Value) -> Result<Option<PseudonymizedIdentity>> {
        self.pseudonymize_value(value, false)
    }

    /// Like [`pseudonymize`](Self::pseudonymize), keeping the original value alongside.
    pub fn pseudonymize_with_original(
        &self,
        value: &Value,
    ) -> Result<Option<PseudonymizedIdentity>> {
        self.pseudonymize_value(value, true)
    }

    fn pseudonymize_value(
        &self,
        value: &Value,
        include_original: bool,
    ) -> Result<Option<PseudonymizedIdentity>> {
        if value.is_null() {
            return Ok(None);
        }
        let canonical = self.canonicalizer.canonicalize(value)?;
        let original = include_original.then(|| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
        Ok(Some(self.identity(canonical, original)))
    }

    /// Pseudonymize a raw string identifier.
    pub fn pseudonymize_str(&self, value: &str, include_original: bool) -> PseudonymizedIdentity {
        let canonical = self.canonicalizer.canonicalize_str(value);
        self.identity(canonical, include_original.then(|| value.to_string()))
    }

    fn identity(&self, canonical: Canonical, original: Option<String>) -> PseudonymizedIdentity {
        let digest = self
            .deterministic
            .digest(&canonical.value, as_legacy_scope(&canonical.scope));
        PseudonymizedIdentity {
            scope: canonical.scope,
            domain: canonical.domain,
            hash: encode_hash(&digest),
            original,
        }
    }

    /// Pseudonymize every address of an email header value.
    ///
    /// Blank headers give an empty list; `null` and headers that are not a
    /// valid address list give `None`.
    pub fn pseudonymize_email_header(
        &self,
        value: &Value,
    ) -> Result<Option<Vec<PseudonymizedIdentity>>> {
        let header = match value {
            Value::Null => return Ok(None),
            Value::String(s) => s,
            other => {
                return Err(GatewayError::InvalidArgument {
                    reason: format!("email header must be a string, got {}", value_kind(other)),
                })
            }
        };

        if header.trim().is_empty() {
            return Ok(Some(Vec::new()));
        }
        match email_header::parse_address_list(header) {
            Some(addresses) => Ok(Some(
                addresses
                    .iter()
                    .map(|address| self.pseudonymize_str(address, false))
                    .collect(),
            )),
            None => {
                tracing::warn!("value matched by email header rule is not a valid address list");
                Ok(None)
            }
        }
    }

    /// How the CSV column named `header` is treated, if at all.
    pub fn column_transform(&self, header: &str) -> Option<ColumnTransform> {
        self.columns.get(&column_key(header)).copied()
    }

    /// Replacement for one pseudonymized CSV cell. Blank cells stay blank.
    pub fn sanitize_cell(&self, cell: &str, include_original: bool) -> Result<String> {
        if cell.trim().is_empty() {
            return Ok(String::new());
        }
        Ok(serde_json::to_string(
            &self.pseudonymize_str(cell, include_original),
        )?)
    }
}

fn column_key(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Redaction wins over pseudonymization when a column is listed twice.
fn column_transforms(rules: &Rules1) -> HashMap<String, ColumnTransform> {
    let mut columns = HashMap::new();
    let ordered = [
        (&rules.redactions, ColumnTransform::Redact),
        (
            &rules.pseudonymization_with_originals,
            ColumnTransform::Pseudonymize {
                include_original: true,
            },
        ),
        (
            &rules.pseudonymizations,
            ColumnTransform::Pseudonymize {
                include_original: false,
            },
        ),
    ];
    for (list, transform) in ordered {
        for column in list.iter().flat_map(|rule| rule.csv_columns.iter()) {
            columns.entry(column_key(column)).or_insert(transform);
        }
    }
    columns
}
