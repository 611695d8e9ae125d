//! Record normalization.
//!
//! Strips empty, placeholder and link-bearing fields from an acquired record
//! before it reaches any caller. Links are excluded on purpose: downstream
//! summarization has no use for them.

use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

/// Top-level fields dropped regardless of content.
const EXCLUDED_FIELDS: &[&str] = &["people_also_viewed"];

/// Fields holding a list of records; each item is filtered one level deep.
const NESTED_RECORD_FIELDS: &[&str] = &[
    "experiences",
    "education",
    "volunteer_work",
    "certifications",
    "groups",
];

/// Placeholder some sources emit instead of leaving a field out.
const NONE_PLACEHOLDER: &str = "None";

/// A record that has passed through [`normalize`].
///
/// The only way to obtain one is through normalization, so holders can rely
/// on it never containing empty values, placeholders or URL fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedRecord(Map<String, Value>);

impl NormalizedRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Convenience accessor for string fields.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Normalize a raw record.
///
/// Idempotent: normalizing an already-normalized record changes nothing.
pub fn normalize(record: Map<String, Value>) -> NormalizedRecord {
    let mut cleaned: Map<String, Value> = record
        .into_iter()
        .filter(|(key, value)| !EXCLUDED_FIELDS.contains(&key.as_str()) && keep(key, value))
        .collect();

    for field in NESTED_RECORD_FIELDS {
        if let Some(Value::Array(items)) = cleaned.get_mut(*field) {
            for item in items.iter_mut() {
                if let Value::Object(entry) = item {
                    let filtered = std::mem::take(entry)
                        .into_iter()
                        .filter(|(key, value)| keep(key, value))
                        .collect();
                    *entry = filtered;
                }
            }
        }
    }

    NormalizedRecord(cleaned)
}

/// Serialize a typed record and normalize it.
///
/// Records that do not serialize to an object yield an empty record.
pub fn normalize_serialized<T: Serialize>(record: &T) -> NormalizedRecord {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => normalize(map),
        Ok(_) | Err(_) => {
            tracing::warn!("Record did not serialize to an object; normalizing to empty");
            NormalizedRecord(Map::new())
        }
    }
}

/// Whether a single entry survives normalization.
fn keep(key: &str, value: &Value) -> bool {
    !key.to_lowercase().contains("url") && !is_noise(value)
}

fn is_noise(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty() || s == NONE_PLACEHOLDER || is_link(s),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn is_link(s: &str) -> bool {
    matches!(Url::parse(s.trim()), Ok(url) if url.scheme() == "http" || url.scheme() == "https")
}
