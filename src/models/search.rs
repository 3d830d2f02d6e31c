//! Search engine response types.
//!
//! Only the parts of the engine's response the gateway reads are modelled;
//! everything else is ignored during deserialization.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};

/// Response of a `_search` request.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub hits: Hits,

    #[serde(default)]
    pub aggregations: Map<String, Value>,
}

impl SearchResponse {
    /// Total matching documents as reported by the engine.
    ///
    /// When total tracking was disabled this falls back to the page length.
    pub fn total(&self) -> u64 {
        match &self.hits.total {
            Some(TotalHits::Object { value, .. }) => *value,
            Some(TotalHits::Count(value)) => *value,
            None => self.hits.hits.len() as u64,
        }
    }

    /// Read the buckets of a (possibly nested) aggregation.
    ///
    /// `path` names the aggregation and any sub-aggregations, e.g.
    /// `["sample", "topterms"]`.
    pub fn buckets(&self, path: &[&str]) -> Result<Vec<Bucket>> {
        let (first, rest) = path
            .split_first()
            .ok_or_else(|| AppError::upstream(200, "empty aggregation path"))?;
        let mut node = self.aggregations.get(*first);
        for name in rest {
            node = node.and_then(|n| n.get(*name));
        }
        let buckets = node
            .and_then(|n| n.get("buckets"))
            .ok_or_else(|| {
                AppError::upstream(200, format!("missing aggregation '{}'", path.join(".")))
            })?;
        Ok(Vec::<Bucket>::deserialize(buckets)?)
    }
}

/// The `hits` section of a search response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub total: Option<TotalHits>,

    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// Total hit count, either as an object (current engines) or a bare number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Object {
        value: u64,
        #[serde(default)]
        relation: Option<String>,
    },
    Count(u64),
}

/// A single document hit (also the shape of a `_doc` lookup).
#[derive(Debug, Clone, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_source", default)]
    pub source: ArticleSource,

    /// Sort values, present when the query was sorted
    #[serde(default)]
    pub sort: Vec<Value>,
}

impl Hit {
    /// The stable sort key of this hit as a string.
    ///
    /// Prefers the engine's reported sort value over the stored field.
    pub fn sort_key(&self) -> Option<String> {
        match self.sort.first() {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => self.source.surt_url.clone(),
            Some(other) => Some(other.to_string()),
        }
    }
}

/// Stored article record, as returned in `_source`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ArticleSource {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub publication_date: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub language: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub domain: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,

    /// Compact `YYYYMMDDhhmmss` capture timestamp
    #[serde(default, deserialize_with = "lenient_string")]
    pub first_captured: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub surt_url: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub snippet: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub text_extraction_method: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub version: Option<String>,
}

/// An aggregation bucket.
#[derive(Debug, Clone, Deserialize)]
pub struct Bucket {
    pub key: Value,

    #[serde(default)]
    pub key_as_string: Option<String>,

    #[serde(default)]
    pub doc_count: u64,
}

impl Bucket {
    /// Bucket key rendered as a map key.
    pub fn key_string(&self) -> String {
        match &self.key {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Formatted key, falling back to the raw key.
    pub fn formatted_key(&self) -> String {
        self.key_as_string
            .clone()
            .unwrap_or_else(|| self.key_string())
    }
}

/// Accept strings, numbers and booleans as text; null as absent.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}
