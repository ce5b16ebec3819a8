use regex::Regex;

use crate::config::{Rule, Rules1, Rules2, Transform};
use crate::error::{GatewayError, Result};

use super::document::CompiledPath;

/// Compile `pattern` so that it must match the entire relative URL.
pub fn compile_full_match(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|e| GatewayError::InvalidRegex {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

fn compile_paths(paths: &[String]) -> Result<Vec<CompiledPath>> {
    paths.iter().map(|p| CompiledPath::compile(p)).collect()
}

/// A legacy rule ready for matching. `None` URL pattern matches everything.
#[derive(Debug)]
pub struct CompiledRule {
    url: Option<Regex>,
    paths: Vec<CompiledPath>,
}

impl CompiledRule {
    fn compile(rule: &Rule) -> Result<Self> {
        Ok(Self {
            url: rule
                .relative_url_regex
                .as_deref()
                .map(compile_full_match)
                .transpose()?,
            paths: compile_paths(&rule.json_paths)?,
        })
    }

    fn matches(&self, relative_url: &str) -> bool {
        self.url
            .as_ref()
            .map_or(true, |re| re.is_match(relative_url))
    }
}

fn compile_rules(rules: &[Rule]) -> Result<Vec<CompiledRule>> {
    rules.iter().map(CompiledRule::compile).collect()
}

/// Paths of every rule in `rules` whose URL pattern matches.
fn applicable<'a>(rules: &'a [CompiledRule], relative_url: &str) -> Vec<&'a CompiledPath> {
    rules
        .iter()
        .filter(|rule| rule.matches(relative_url))
        .flat_map(|rule| rule.paths.iter())
        .collect()
}

/// Paths from the four legacy lists that apply to one URL.
#[derive(Debug, Default)]
pub struct LegacyPlan<'a> {
    pub redactions: Vec<&'a CompiledPath>,
    pub pseudonymizations: Vec<&'a CompiledPath>,
    pub email_headers: Vec<&'a CompiledPath>,
    pub with_originals: Vec<&'a CompiledPath>,
}

impl LegacyPlan<'_> {
    pub fn is_empty(&self) -> bool {
        self.redactions.is_empty()
            && self.pseudonymizations.is_empty()
            && self.email_headers.is_empty()
            && self.with_originals.is_empty()
    }
}

#[derive(Debug)]
pub struct CompiledLegacyRules {
    pseudonymizations: Vec<CompiledRule>,
    redactions: Vec<CompiledRule>,
    email_headers: Vec<CompiledRule>,
    with_originals: Vec<CompiledRule>,
    allowed_endpoints: Vec<Regex>,
}

impl CompiledLegacyRules {
    pub fn compile(rules: &Rules1) -> Result<Self> {
        Ok(Self {
            pseudonymizations: compile_rules(&rules.pseudonymizations)?,
            redactions: compile_rules(&rules.redactions)?,
            email_headers: compile_rules(&rules.email_header_pseudonymizations)?,
            with_originals: compile_rules(&rules.pseudonymization_with_originals)?,
            allowed_endpoints: rules
                .allowed_endpoint_regexes
                .iter()
                .map(|p| compile_full_match(p))
                .collect::<Result<_>>()?,
        })
    }

    pub fn is_allowed(&self, relative_url: &str) -> bool {
        self.allowed_endpoints.is_empty()
            || self.allowed_endpoints.iter().any(|re| re.is_match(relative_url))
    }

    pub fn plan(&self, relative_url: &str) -> LegacyPlan<'_> {
        LegacyPlan {
            redactions: applicable(&self.redactions, relative_url),
            pseudonymizations: applicable(&self.pseudonymizations, relative_url),
            email_headers: applicable(&self.email_headers, relative_url),
            with_originals: applicable(&self.with_originals, relative_url),
        }
    }
}

/// A transform with its paths compiled.
#[derive(Debug)]
pub enum CompiledTransform {
    Redact(Vec<CompiledPath>),
    Pseudonymize {
        paths: Vec<CompiledPath>,
        include_original: bool,
    },
    PseudonymizeEmailHeader(Vec<CompiledPath>),
}

impl CompiledTransform {
    fn compile(transform: &Transform) -> Result<Self> {
        Ok(match transform {
            Transform::Redact { paths } => CompiledTransform::Redact(compile_paths(paths)?),
            Transform::Pseudonymize {
                paths,
                include_original,
            } => CompiledTransform::Pseudonymize {
                paths: compile_paths(paths)?,
                include_original: *include_original,
            },
            Transform::PseudonymizeEmailHeader { paths } => {
                CompiledTransform::PseudonymizeEmailHeader(compile_paths(paths)?)
            }
        })
    }
}

#[derive(Debug)]
pub struct CompiledEndpoint {
    pattern: Regex,
    source: String,
    pub transforms: Vec<CompiledTransform>,
}

impl CompiledEndpoint {
    pub fn path_regex(&self) -> &str {
        &self.source
    }
}

#[derive(Debug)]
pub struct CompiledEndpoints {
    endpoints: Vec<CompiledEndpoint>,
    allow_all: bool,
}

impl CompiledEndpoints {
    pub fn compile(rules: &Rules2) -> Result<Self> {
        let endpoints = rules
            .endpoints
            .iter()
            .map(|endpoint| {
                Ok(CompiledEndpoint {
                    pattern: compile_full_match(&endpoint.path_regex)?,
                    source: endpoint.path_regex.clone(),
                    transforms: endpoint
                        .transforms
                        .iter()
                        .map(CompiledTransform::compile)
                        .collect::<Result<_>>()?,
                })
            })
            .collect::<Result<_>>()?;
        Ok(Self {
            endpoints,
            allow_all: rules.allow_all_endpoints,
        })
    }

    /// With no endpoints declared at all, nothing restricts the proxy.
    pub fn is_allowed(&self, relative_url: &str) -> bool {
        self.allow_all || self.endpoints.is_empty() || self.matching(relative_url).is_some()
    }

    /// First endpoint whose pattern fully matches; later ones are never consulted.
    pub fn matching(&self, relative_url: &str) -> Option<&CompiledEndpoint> {
        self.endpoints
            .iter()
            .find(|endpoint| endpoint.pattern.is_match(relative_url))
    }
}

/// The active rule set after compilation.
#[derive(Debug)]
pub enum CompiledRules {
    Legacy(CompiledLegacyRules),
    Endpoints(CompiledEndpoints),
    /// No rules configured: every endpoint allowed, documents pass through.
    None,
}

impl CompiledRules {
    pub fn compile(rules: Option<&Rules1>, rules2: Option<&Rules2>) -> Result<Self> {
        match (rules2, rules) {
            (Some(rules2), legacy) => {
                if legacy.is_some() {
                    tracing::debug!("both rule sets configured; legacy rules are ignored");
                }
                Ok(CompiledRules::Endpoints(CompiledEndpoints::compile(rules2)?))
            }
            (None, Some(rules)) => Ok(CompiledRules::Legacy(CompiledLegacyRules::compile(rules)?)),
            (None, None) => Ok(CompiledRules::None),
        }
    }

    pub fn is_allowed(&self, relative_url: &str) -> bool {
        match self {
            CompiledRules::Legacy(rules) => rules.is_allowed(relative_url),
            CompiledRules::Endpoints(endpoints) => endpoints.is_allowed(relative_url),
            CompiledRules::None => true,
        }
    }
}
