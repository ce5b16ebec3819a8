//! Path-addressed edits on a parsed JSON document.
//!
//! A compiled path is evaluated once to collect the locations it selects;
//! the edits then walk those owned locations, so the query's borrow of the
//! document never overlaps with mutation.

use std::cmp::Ordering;

use serde_json::Value;
use serde_json_path::{JsonPath, PathElement};

use crate::error::{GatewayError, Result};

/// A JSONPath expression, compiled once, remembering its source text.
#[derive(Debug, Clone)]
pub struct CompiledPath {
    raw: String,
    path: JsonPath,
}

impl CompiledPath {
    pub fn compile(raw: &str) -> Result<Self> {
        let path = JsonPath::parse(raw).map_err(|e| GatewayError::InvalidJsonPath {
            path: raw.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            raw: raw.to_string(),
            path,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Locations selected in `document`, deduplicated, deepest/last first.
    fn locations(&self, document: &Value) -> Vec<Location> {
        let mut locations: Vec<Location> = self
            .path
            .query_located(document)
            .into_iter()
            .map(|node| {
                node.location()
                    .iter()
                    .map(|element| match element {
                        PathElement::Name(name) => Step::Key(name.to_string()),
                        PathElement::Index(index) => Step::Index(*index),
                    })
                    .collect()
            })
            .collect();
        locations.sort_by(|a, b| compare_locations(b, a));
        locations.dedup();
        locations
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Key(String),
    Index(usize),
}

type Location = Vec<Step>;

fn compare_locations(a: &Location, b: &Location) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = match (x, y) {
            (Step::Key(x), Step::Key(y)) => x.cmp(y),
            (Step::Index(x), Step::Index(y)) => x.cmp(y),
            (Step::Key(_), Step::Index(_)) => Ordering::Less,
            (Step::Index(_), Step::Key(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn resolve_mut<'a>(root: &'a mut Value, location: &[Step]) -> Option<&'a mut Value> {
    location.iter().try_fold(root, |node, step| match step {
        Step::Key(key) => node.get_mut(key.as_str()),
        Step::Index(index) => node.get_mut(*index),
    })
}

/// Removes every value selected by `path`. Absent paths are a no-op.
///
/// Array elements are removed highest index first, so one pass can drop
/// several elements of the same array.
pub fn delete(document: &mut Value, path: &CompiledPath) -> usize {
    let mut removed = 0;
    for location in path.locations(document) {
        let Some((last, parent)) = location.split_last() else {
            tracing::debug!("ignoring redaction of document root via {}", path.as_str());
            continue;
        };
        let Some(parent) = resolve_mut(document, parent) else {
            continue;
        };
        let hit = match (parent, last) {
            (Value::Object(map), Step::Key(key)) => map.shift_remove(key.as_str()).is_some(),
            (Value::Array(items), Step::Index(index)) if *index < items.len() => {
                items.remove(*index);
                true
            }
            _ => false,
        };
        if hit {
            removed += 1;
        }
    }
    if removed == 0 {
        tracing::debug!("no values at {}", path.as_str());
    }
    removed
}

/// Replaces each selected value with `f(value)` when `f` returns `Some`.
///
/// Stops at the first error; edits already made stay applied.
pub fn map<F>(document: &mut Value, path: &CompiledPath, mut f: F) -> Result<usize>
where
    F: FnMut(&Value) -> Result<Option<Value>>,
{
    let mut replaced = 0;
    for location in path.locations(document) {
        let Some(node) = resolve_mut(document, &location) else {
            continue;
        };
        if let Some(replacement) = f(node)? {
            *node = replacement;
            replaced += 1;
        }
    }
    if replaced == 0 {
        tracing::debug!("nothing replaced at {}", path.as_str());
    }
    Ok(replaced)
}
