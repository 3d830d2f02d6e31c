//! Query body builders.

use serde_json::{Value, json};

use crate::codec;
use crate::error::Result;
use crate::models::{AggregationKind, TermField};
use crate::query::{DEFAULT_FIELD, LIST_FIELDS, QueryLimits, SORT_FIELD};

/// Free-text match over the default field, AND-combining tokens, projecting
/// the list-view fields.
pub fn basic_query(q: &str) -> Value {
    json!({
        "_source": LIST_FIELDS,
        "query": {
            "query_string": {
                "default_field": DEFAULT_FIELD,
                "default_operator": "AND",
                "query": q
            }
        }
    })
}

/// Builds engine query bodies for each public request shape.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    limits: QueryLimits,
}

impl QueryBuilder {
    pub fn new(limits: QueryLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &QueryLimits {
        &self.limits
    }

    /// Basic query plus daily histogram and language/domain/tld buckets.
    pub fn overview(&self, q: &str) -> Value {
        let size = self.limits.overview_buckets;
        let mut query = basic_query(q);
        query["aggregations"] = json!({
            "daily": {
                "date_histogram": {
                    "field": "publication_date",
                    "calendar_interval": "day",
                    "min_doc_count": 1
                }
            },
            "lang": {"terms": {"field": "language", "size": size}},
            "domain": {"terms": {"field": "domain", "size": size}},
            "tld": {"terms": {"field": "tld", "size": size}}
        });
        query
    }

    /// Aggregation-only query over a sample of the best matches.
    pub fn terms(&self, q: &str, field: &TermField, kind: AggregationKind) -> Value {
        let limits = &self.limits;
        let field = field.as_str();
        let (aggregation, shard_size) = match kind {
            AggregationKind::Top => (
                json!({
                    "terms": {
                        "field": field,
                        "size": limits.terms_size,
                        "min_doc_count": limits.min_doc_count,
                        "shard_min_doc_count": limits.shard_min_doc_count
                    }
                }),
                limits.sample_size,
            ),
            AggregationKind::Significant => (
                json!({
                    "significant_terms": {
                        "field": field,
                        "size": limits.terms_size,
                        "min_doc_count": limits.min_doc_count,
                        "shard_min_doc_count": limits.shard_min_doc_count
                    }
                }),
                limits.sample_size,
            ),
            AggregationKind::Rare => (
                json!({
                    "rare_terms": {
                        "field": field,
                        "exclude": limits.rare_exclude
                    }
                }),
                limits.rare_sample_size,
            ),
        };

        let mut query = basic_query(q);
        query["track_total_hits"] = json!(false);
        query["_source"] = json!(false);
        query["aggregations"] = json!({
            "sample": {
                "sampler": {"shard_size": shard_size},
                "aggregations": {"topterms": aggregation}
            }
        });
        query
    }

    /// Fixed-size page sorted by the stable key, resuming strictly after the
    /// decoded cursor when one is given.
    ///
    /// Fails with a decode error before anything is sent to the engine.
    pub fn page(&self, q: &str, resume: Option<&str>) -> Result<Value> {
        let mut query = basic_query(q);
        query["size"] = json!(self.limits.page_size);
        query["track_total_hits"] = json!(false);
        query["sort"] = json!([{ SORT_FIELD: "asc" }]);
        if let Some(token) = resume.filter(|t| !t.is_empty()) {
            query["search_after"] = json!([codec::decode(token)?]);
        }
        Ok(query)
    }
}
