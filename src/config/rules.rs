use serde::{Deserialize, Serialize};

/// Legacy rule set: four independent lists of URL-scoped path rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rules1 {
    #[serde(default)]
    pub pseudonymizations: Vec<Rule>,

    #[serde(default)]
    pub redactions: Vec<Rule>,

    #[serde(default)]
    pub email_header_pseudonymizations: Vec<Rule>,

    #[serde(default)]
    pub pseudonymization_with_originals: Vec<Rule>,

    /// Endpoints the proxy may fetch. Empty means every endpoint is allowed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_endpoint_regexes: Vec<String>,
}

/// A single legacy rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Regex the relative URL must fully match. Absent means any URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_url_regex: Option<String>,

    #[serde(default, alias = "paths", skip_serializing_if = "Vec::is_empty")]
    pub json_paths: Vec<String>,

    /// Column headers this rule applies to when the payload is CSV.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub csv_columns: Vec<String>,
}

impl Rule {
    pub fn for_url(regex: impl Into<String>, json_paths: &[&str]) -> Self {
        Self {
            relative_url_regex: Some(regex.into()),
            json_paths: json_paths.iter().map(|p| p.to_string()).collect(),
            csv_columns: Vec::new(),
        }
    }

    pub fn for_columns(columns: &[&str]) -> Self {
        Self {
            relative_url_regex: None,
            json_paths: Vec::new(),
            csv_columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Endpoint-oriented rule set: the first matching endpoint's transforms run in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rules2 {
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,

    #[serde(default)]
    pub allow_all_endpoints: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub path_regex: String,

    #[serde(default)]
    pub transforms: Vec<Transform>,
}

/// A document rewrite. Unknown `type` tags are rejected when the config loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Transform {
    Redact {
        #[serde(alias = "jsonPaths")]
        paths: Vec<String>,
    },
    Pseudonymize {
        #[serde(alias = "jsonPaths")]
        paths: Vec<String>,
        #[serde(default, rename = "includeOriginal")]
        include_original: bool,
    },
    PseudonymizeEmailHeader {
        #[serde(alias = "jsonPaths")]
        paths: Vec<String>,
    },
}

impl Transform {
    pub fn redact(paths: &[&str]) -> Self {
        Transform::Redact {
            paths: to_strings(paths),
        }
    }

    pub fn pseudonymize(paths: &[&str]) -> Self {
        Transform::Pseudonymize {
            paths: to_strings(paths),
            include_original: false,
        }
    }

    pub fn pseudonymize_with_original(paths: &[&str]) -> Self {
        Transform::Pseudonymize {
            paths: to_strings(paths),
            include_original: true,
        }
    }

    pub fn pseudonymize_email_header(paths: &[&str]) -> Self {
        Transform::PseudonymizeEmailHeader {
            paths: to_strings(paths),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rules2_yaml() {
        let yaml = r#"
allowAllEndpoints: false
endpoints:
  - pathRegex: "^/admin/directory/v1/users/.*$"
    transforms:
      - type: redact
        paths: ["$.thumbnailPhotoUrl"]
      - type: pseudonymize
        jsonPaths: ["$.primaryEmail"]
        includeOriginal: true
      - type: pseudonymizeEmailHeader
        paths: ["$.headers.to"]
"#;
        let rules: Rules2 = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rules.endpoints.len(), 1);
        let transforms = &rules.endpoints[0].transforms;
        assert_eq!(transforms[0], Transform::redact(&["$.thumbnailPhotoUrl"]));
        assert_eq!(
            transforms[1],
            Transform::pseudonymize_with_original(&["$.primaryEmail"])
        );
        assert_eq!(
            transforms[2],
            Transform::pseudonymize_email_header(&["$.headers.to"])
        );
    }

    #[test]
    fn test_unknown_transform_type_is_rejected() {
        let yaml = r#"
endpoints:
  - pathRegex: ".*"
    transforms:
      - type: encrypt
        paths: ["$.email"]
"#;
        assert!(serde_yaml::from_str::<Rules2>(yaml).is_err());
    }

    #[test]
    fn test_parse_rules1_json() {
        let json = r#"{
            "pseudonymizations": [{"relativeUrlRegex": "/users.*", "jsonPaths": ["$..email"]}],
            "redactions": [{"csvColumns": ["DEPARTMENT"]}]
        }"#;
        let rules: Rules1 = serde_json::from_str(json).unwrap();
        assert_eq!(rules.pseudonymizations[0], Rule::for_url("/users.*", &["$..email"]));
        assert_eq!(rules.redactions[0], Rule::for_columns(&["DEPARTMENT"]));
        assert!(rules.allowed_endpoint_regexes.is_empty());
    }

    #[test]
    fn test_serialized_transform_uses_type_tag() {
        let json = serde_json::to_string(&Transform::pseudonymize(&["$.id"])).unwrap();
        assert_eq!(
            json,
            r#"{"type":"pseudonymize","paths":["$.id"],"includeOriginal":false}"#
        );
    }
}
