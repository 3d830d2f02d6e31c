//! In-process search backend over fixture documents.
//!
//! Evaluates the query bodies the gateway builds (plus what the debug
//! passthrough commonly receives) with engine-compatible response shapes.
//! Documents are kept in load order, which stands in for relevance order.
//!
//! ## Fixture file
//!
//! ```text
//! {
//!   "<index>": [ { "_id": "...", "_source": { ... } }, ... ]
//! }
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde_json::{Map, Value, json};

use crate::backend::query_string::{self, DefaultOperator, Expr, FieldSource, analyze};
use crate::backend::{SearchBackend, StoredDocument};
use crate::error::{AppError, Result};
use crate::models::Hit;
use crate::utils::url::tld;

/// Default number of hits when a body has no `size`.
const DEFAULT_SIZE: usize = 10;

/// In-memory backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    indexes: HashMap<String, Vec<StoredDocument>>,
    text_fields: HashSet<String>,
}

impl MemoryBackend {
    /// Create a backend over the given indexes. `title` and `snippet` are
    /// analyzed text fields; every other field is a keyword.
    pub fn new(indexes: HashMap<String, Vec<StoredDocument>>) -> Self {
        Self {
            indexes,
            text_fields: ["title", "snippet"].iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the set of analyzed text fields.
    pub fn with_text_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.text_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Load a fixture file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        let indexes: HashMap<String, Vec<StoredDocument>> = serde_json::from_slice(&bytes)?;
        log::info!(
            "Loaded fixtures from {}: {}",
            path.as_ref().display(),
            indexes
                .iter()
                .map(|(name, docs)| format!("{name}={}", docs.len()))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(Self::new(indexes))
    }

    /// Number of documents in an index.
    pub fn document_count(&self, index: &str) -> usize {
        self.indexes.get(index).map_or(0, Vec::len)
    }

    fn index(&self, index: &str) -> Result<&[StoredDocument]> {
        self.indexes
            .get(index)
            .map(Vec::as_slice)
            .ok_or_else(|| AppError::upstream(404, format!("no such index [{index}]")))
    }

    fn view<'a>(&'a self, doc: &'a StoredDocument) -> DocView<'a> {
        DocView {
            doc,
            text_fields: &self.text_fields,
        }
    }

    fn execute(&self, index: &str, body: &Value) -> Result<Value> {
        let docs = self.index(index)?;
        let (expr, default_field) = parse_query(body.get("query"))?;

        let mut matched: Vec<&StoredDocument> = docs
            .iter()
            .filter(|doc| expr.matches(&self.view(doc), &default_field))
            .collect();
        let total = matched.len();

        let sort = parse_sort(body.get("sort"))?;
        if let Some((field, descending)) = &sort {
            matched.sort_by(|a, b| {
                let ord = compare_keys(
                    sort_value(&self.view(a), field).as_deref(),
                    sort_value(&self.view(b), field).as_deref(),
                );
                if *descending { ord.reverse() } else { ord }
            });
        }

        let aggregations = match body.get("aggregations").or_else(|| body.get("aggs")) {
            Some(Value::Object(aggs)) => Some(self.aggregate(aggs, &matched, docs)?),
            Some(_) => return Err(AppError::InvalidQuery("aggregations must be an object".into())),
            None => None,
        };

        let mut page = matched;
        if let Some(after) = body.get("search_after") {
            let (field, descending) = sort.as_ref().ok_or_else(|| {
                AppError::InvalidQuery("search_after requires a sort".into())
            })?;
            let after = after
                .get(0)
                .map(value_text)
                .ok_or_else(|| AppError::InvalidQuery("search_after is empty".into()))?;
            page.retain(|doc| {
                let key = sort_value(&self.view(doc), field);
                let ord = compare_keys(key.as_deref(), Some(after.as_str()));
                if *descending {
                    ord == Ordering::Less
                } else {
                    ord == Ordering::Greater
                }
            });
        }

        let from = body.get("from").and_then(Value::as_u64).unwrap_or(0) as usize;
        let size = body
            .get("size")
            .and_then(Value::as_u64)
            .map_or(DEFAULT_SIZE, |s| s as usize);

        let projection = body.get("_source");
        let hits: Vec<Value> = page
            .iter()
            .skip(from)
            .take(size)
            .map(|doc| {
                let mut hit = json!({
                    "_index": index,
                    "_id": doc.id,
                    "_score": if sort.is_some() { Value::Null } else { json!(1.0) },
                });
                if let Some(source) = project(&doc.source, projection) {
                    hit["_source"] = source;
                }
                if let Some((field, _)) = &sort {
                    hit["sort"] = json!([sort_value(&self.view(doc), field)]);
                }
                hit
            })
            .collect();

        let mut hits_section = json!({ "hits": hits });
        if body.get("track_total_hits") != Some(&Value::Bool(false)) {
            hits_section["total"] = json!({"value": total, "relation": "eq"});
        }

        let mut response = json!({
            "took": 0,
            "timed_out": false,
            "hits": hits_section
        });
        if let Some(aggs) = aggregations {
            response["aggregations"] = Value::Object(aggs);
        }
        Ok(response)
    }

    fn aggregate(
        &self,
        aggs: &Map<String, Value>,
        docs: &[&StoredDocument],
        background: &[StoredDocument],
    ) -> Result<Map<String, Value>> {
        let mut out = Map::new();
        for (name, definition) in aggs {
            let definition = definition
                .as_object()
                .ok_or_else(|| AppError::InvalidQuery(format!("aggregation [{name}] must be an object")))?;
            let sub = definition
                .get("aggregations")
                .or_else(|| definition.get("aggs"))
                .and_then(Value::as_object);

            let (kind, params) = definition
                .iter()
                .find(|(k, _)| k.as_str() != "aggregations" && k.as_str() != "aggs")
                .ok_or_else(|| AppError::InvalidQuery(format!("aggregation [{name}] has no type")))?;

            let mut result = match kind.as_str() {
                "sampler" => {
                    let shard_size = usize_param(params, "shard_size", 100);
                    let sample: Vec<&StoredDocument> = docs.iter().take(shard_size).copied().collect();
                    let mut result = json!({ "doc_count": sample.len() });
                    if let Some(sub) = sub {
                        for (k, v) in self.aggregate(sub, &sample, background)? {
                            result[k] = v;
                        }
                    }
                    result
                }
                "terms" => self.terms(params, docs)?,
                "significant_terms" => self.significant_terms(params, docs, background)?,
                "rare_terms" => self.rare_terms(params, docs)?,
                "date_histogram" => self.date_histogram(params, docs)?,
                other => {
                    return Err(AppError::InvalidQuery(format!(
                        "unsupported aggregation type [{other}]"
                    )));
                }
            };
            if kind.as_str() != "sampler" {
                if let Some(sub) = sub {
                    if !sub.is_empty() {
                        return Err(AppError::InvalidQuery(format!(
                            "sub-aggregations of [{kind}] are not supported"
                        )));
                    }
                }
            }
            if let Value::Object(map) = &mut result {
                map.retain(|_, v| !v.is_null());
            }
            out.insert(name.clone(), result);
        }
        Ok(out)
    }

    /// Document frequency of every term of `field` across `docs`.
    fn term_counts(&self, field: &str, docs: &[&StoredDocument]) -> BTreeMap<String, u64> {
        let mut counts = BTreeMap::new();
        for doc in docs {
            for term in self.view(doc).terms(field) {
                *counts.entry(term).or_insert(0) += 1;
            }
        }
        counts
    }

    fn terms(&self, params: &Value, docs: &[&StoredDocument]) -> Result<Value> {
        let field = field_param(params)?;
        let size = usize_param(params, "size", 10);
        let min_doc_count = params.get("min_doc_count").and_then(Value::as_u64).unwrap_or(1);
        let exclude = exclude_param(params)?;

        let mut buckets: Vec<(String, u64)> = self
            .term_counts(field, docs)
            .into_iter()
            .filter(|(term, count)| *count >= min_doc_count && !is_excluded(&exclude, term))
            .collect();
        buckets.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let other: u64 = buckets.iter().skip(size).map(|(_, c)| c).sum();
        buckets.truncate(size);
        Ok(json!({
            "doc_count_error_upper_bound": 0,
            "sum_other_doc_count": other,
            "buckets": buckets
                .into_iter()
                .map(|(key, count)| json!({"key": key, "doc_count": count}))
                .collect::<Vec<_>>()
        }))
    }

    fn significant_terms(
        &self,
        params: &Value,
        docs: &[&StoredDocument],
        background: &[StoredDocument],
    ) -> Result<Value> {
        let field = field_param(params)?;
        let size = usize_param(params, "size", 10);
        let min_doc_count = params.get("min_doc_count").and_then(Value::as_u64).unwrap_or(3);
        let exclude = exclude_param(params)?;

        let background: Vec<&StoredDocument> = background.iter().collect();
        let bg_counts = self.term_counts(field, &background);
        let fg_total = docs.len().max(1) as f64;
        let bg_total = background.len().max(1) as f64;

        // JLH score: absolute change times relative change of the term's rate
        let mut buckets: Vec<(String, u64, u64, f64)> = self
            .term_counts(field, docs)
            .into_iter()
            .filter(|(term, count)| *count >= min_doc_count && !is_excluded(&exclude, term))
            .filter_map(|(term, fg)| {
                let bg = bg_counts.get(&term).copied().unwrap_or(fg).max(1);
                let fg_rate = fg as f64 / fg_total;
                let bg_rate = bg as f64 / bg_total;
                let score = (fg_rate - bg_rate) * (fg_rate / bg_rate);
                (score > 0.0).then_some((term, fg, bg, score))
            })
            .collect();
        buckets.sort_by(|a, b| {
            b.3.partial_cmp(&a.3)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        buckets.truncate(size);

        Ok(json!({
            "doc_count": docs.len(),
            "bg_count": background.len(),
            "buckets": buckets
                .into_iter()
                .map(|(key, fg, bg, score)| json!({
                    "key": key,
                    "doc_count": fg,
                    "score": score,
                    "bg_count": bg
                }))
                .collect::<Vec<_>>()
        }))
    }

    fn rare_terms(&self, params: &Value, docs: &[&StoredDocument]) -> Result<Value> {
        let field = field_param(params)?;
        let max_doc_count = params.get("max_doc_count").and_then(Value::as_u64).unwrap_or(1);
        let exclude = exclude_param(params)?;

        let mut buckets: Vec<(String, u64)> = self
            .term_counts(field, docs)
            .into_iter()
            .filter(|(term, count)| *count <= max_doc_count && !is_excluded(&exclude, term))
            .collect();
        buckets.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        Ok(json!({
            "buckets": buckets
                .into_iter()
                .map(|(key, count)| json!({"key": key, "doc_count": count}))
                .collect::<Vec<_>>()
        }))
    }

    fn date_histogram(&self, params: &Value, docs: &[&StoredDocument]) -> Result<Value> {
        let field = field_param(params)?;
        let interval = params
            .get("calendar_interval")
            .or_else(|| params.get("interval"))
            .and_then(Value::as_str)
            .unwrap_or("day");
        if !matches!(interval, "day" | "1d") {
            return Err(AppError::InvalidQuery(format!(
                "unsupported calendar_interval [{interval}]"
            )));
        }
        let min_doc_count = params.get("min_doc_count").and_then(Value::as_u64).unwrap_or(0);

        let mut days: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for doc in docs {
            // Malformed dates are skipped, as with `ignore_malformed`
            let day = self
                .view(doc)
                .raw_values(field)
                .iter()
                .find_map(|v| v.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()));
            if let Some(day) = day {
                *days.entry(day).or_insert(0) += 1;
            }
        }

        if min_doc_count == 0 {
            if let (Some(first), Some(last)) =
                (days.keys().next().copied(), days.keys().next_back().copied())
            {
                for day in first.iter_days().take_while(|d| *d <= last) {
                    days.entry(day).or_insert(0);
                }
            }
        }

        let buckets: Vec<Value> = days
            .into_iter()
            .filter(|(_, count)| *count >= min_doc_count)
            .map(|(day, count)| {
                let start = day.and_time(NaiveTime::MIN).and_utc();
                json!({
                    "key_as_string": format!("{}T00:00:00.000Z", day.format("%Y-%m-%d")),
                    "key": start.timestamp_millis(),
                    "doc_count": count
                })
            })
            .collect();
        Ok(json!({ "buckets": buckets }))
    }
}

#[async_trait]
impl SearchBackend for MemoryBackend {
    async fn search_raw(&self, index: &str, body: &Value) -> Result<Value> {
        self.execute(index, body)
    }

    async fn get_document(&self, index: &str, id: &str) -> Result<Option<Hit>> {
        let docs = self.index(index)?;
        docs.iter()
            .find(|doc| doc.id == id)
            .map(|doc| {
                serde_json::from_value(json!({
                    "_index": index,
                    "_id": doc.id,
                    "found": true,
                    "_source": doc.source
                }))
                .map_err(AppError::from)
            })
            .transpose()
    }
}

/// Field access over a stored document.
struct DocView<'a> {
    doc: &'a StoredDocument,
    text_fields: &'a HashSet<String>,
}

impl DocView<'_> {
    fn raw_values(&self, field: &str) -> Vec<String> {
        let values = match self.doc.source.get(field) {
            Some(Value::Array(items)) => items.iter().filter(|v| !v.is_null()).map(value_text).collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(value) => vec![value_text(value)],
        };
        if values.is_empty() && field == "tld" {
            // Derived from the domain when not indexed explicitly
            return self
                .raw_values("domain")
                .iter()
                .filter_map(|d| tld(d).map(str::to_string))
                .collect();
        }
        values
    }

    /// Distinct aggregation terms of a field.
    fn terms(&self, field: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let raw = self.raw_values(field);
        let terms: Vec<String> = if self.is_text(field) {
            raw.iter().flat_map(|v| analyze(v)).collect()
        } else {
            raw
        };
        terms.into_iter().filter(|t| seen.insert(t.clone())).collect()
    }
}

impl FieldSource for DocView<'_> {
    fn values(&self, field: &str) -> Vec<String> {
        self.raw_values(field)
    }

    fn is_text(&self, field: &str) -> bool {
        self.text_fields.contains(field)
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_query(query: Option<&Value>) -> Result<(Expr, String)> {
    let Some(query) = query else {
        return Ok((Expr::All, "*".to_string()));
    };
    if query.get("match_all").is_some() {
        return Ok((Expr::All, "*".to_string()));
    }
    let qs = query
        .get("query_string")
        .ok_or_else(|| AppError::InvalidQuery("only query_string and match_all are supported".into()))?;
    let text = qs
        .get("query")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::InvalidQuery("query_string.query must be a string".into()))?;
    let default_field = qs
        .get("default_field")
        .and_then(Value::as_str)
        .unwrap_or("*")
        .to_string();
    let default_op = DefaultOperator::parse(
        qs.get("default_operator")
            .and_then(Value::as_str)
            .unwrap_or("OR"),
    );
    Ok((query_string::parse(text, default_op)?, default_field))
}

/// First sort clause as `(field, descending)`.
fn parse_sort(sort: Option<&Value>) -> Result<Option<(String, bool)>> {
    let clause = match sort {
        None => return Ok(None),
        Some(Value::Array(items)) => match items.first() {
            Some(first) => first,
            None => return Ok(None),
        },
        Some(other) => other,
    };
    match clause {
        Value::String(field) => Ok(Some((field.clone(), false))),
        Value::Object(map) => {
            let (field, order) = map
                .iter()
                .next()
                .ok_or_else(|| AppError::InvalidQuery("empty sort clause".into()))?;
            let order = order
                .as_str()
                .or_else(|| order.get("order").and_then(Value::as_str))
                .unwrap_or("asc");
            Ok(Some((field.clone(), order.eq_ignore_ascii_case("desc"))))
        }
        _ => Err(AppError::InvalidQuery("malformed sort clause".into())),
    }
}

fn sort_value(doc: &DocView<'_>, field: &str) -> Option<String> {
    doc.raw_values(field).into_iter().next()
}

/// Missing keys sort last.
fn compare_keys(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn project(source: &Value, projection: Option<&Value>) -> Option<Value> {
    match projection {
        Some(Value::Bool(false)) => None,
        Some(Value::Array(fields)) => {
            let mut out = Map::new();
            for field in fields.iter().filter_map(Value::as_str) {
                if let Some(v) = source.get(field) {
                    out.insert(field.to_string(), v.clone());
                }
            }
            Some(Value::Object(out))
        }
        _ => Some(source.clone()),
    }
}

fn field_param(params: &Value) -> Result<&str> {
    params
        .get("field")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::InvalidQuery("aggregation requires a field".into()))
}

fn usize_param(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map_or(default, |v| v as usize)
}

/// Exclusion patterns match whole terms.
fn exclude_param(params: &Value) -> Result<Option<Regex>> {
    params
        .get("exclude")
        .and_then(Value::as_str)
        .map(|pattern| {
            Regex::new(&format!("^(?:{pattern})$"))
                .map_err(|e| AppError::InvalidQuery(format!("invalid exclude pattern: {e}")))
        })
        .transpose()
}

fn is_excluded(exclude: &Option<Regex>, term: &str) -> bool {
    exclude.as_ref().is_some_and(|re| re.is_match(term))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AggregationKind, Catalog, Config, SearchResponse};
    use crate::query::{QueryBuilder, QueryLimits, basic_query};

    fn doc(id: &str, source: Value) -> StoredDocument {
        StoredDocument {
            id: id.to_string(),
            source,
        }
    }

    fn backend() -> MemoryBackend {
        let docs = vec![
            doc("a", json!({
                "title": "Storm hits coast", "snippet": "storm damage on the coast",
                "domain": "news.example.com", "url": "http://news.example.com/a",
                "language": "en", "publication_date": "2023-11-01", "surt_url": "com,example,news)/a"
            })),
            doc("b", json!({
                "title": "Storm warning 2023", "snippet": "a storm warning was issued",
                "domain": "example.org", "url": "http://example.org/b",
                "language": "en", "publication_date": "2023-11-01T10:00:00", "surt_url": "org,example)/b"
            })),
            doc("c", json!({
                "title": "Elections", "snippet": "election results are in",
                "domain": "example.fr", "url": "http://example.fr/c",
                "language": "fr", "publication_date": "2023-11-03", "surt_url": "fr,example)/c"
            })),
        ];
        MemoryBackend::new(HashMap::from([("news".to_string(), docs)]))
    }

    async fn search(body: Value) -> SearchResponse {
        backend().search("news", &body).await.unwrap()
    }

    fn title_field() -> crate::models::TermField {
        let config = Config {
            indexes: vec!["news".into()],
            ..Config::default()
        };
        Catalog::from_config(&config)
            .unwrap()
            .term_field("title")
            .unwrap()
            .clone()
    }

    #[tokio::test]
    async fn test_basic_query_filters_and_projects() {
        let resp = search(basic_query("storm")).await;
        assert_eq!(resp.total(), 2);
        let raw = backend().search_raw("news", &basic_query("storm")).await.unwrap();
        let source = raw["hits"]["hits"][0]["_source"].as_object().unwrap();
        assert!(source.contains_key("title"));
        assert!(!source.contains_key("snippet"));
    }

    #[tokio::test]
    async fn test_unknown_index_is_upstream_error() {
        let err = backend().search_raw("missing", &basic_query("*")).await.unwrap_err();
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn test_overview_aggregations() {
        let resp = search(QueryBuilder::default().overview("*")).await;
        assert_eq!(resp.total(), 3);

        let tlds = resp.buckets(&["tld"]).unwrap();
        let keys: Vec<String> = tlds.iter().map(|b| b.key_string()).collect();
        assert_eq!(keys, vec!["com", "fr", "org"]);

        let daily = resp.buckets(&["daily"]).unwrap();
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].formatted_key(), "2023-11-01T00:00:00.000Z");
        assert_eq!(daily[0].doc_count, 2);

        let langs = resp.buckets(&["lang"]).unwrap();
        assert_eq!(langs[0].key_string(), "en");
        assert_eq!(langs[0].doc_count, 2);
    }

    #[tokio::test]
    async fn test_page_sorting_and_search_after() {
        let limits = QueryLimits {
            page_size: 2,
            ..QueryLimits::default()
        };
        let builder = QueryBuilder::new(limits);

        let first = search(builder.page("*", None).unwrap()).await;
        assert!(first.hits.total.is_none());
        let ids: Vec<&str> = first.hits.hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        let token = crate::codec::encode(&first.hits.hits[1].sort_key().unwrap());
        let second = search(builder.page("*", Some(&token)).unwrap()).await;
        let ids: Vec<&str> = second.hits.hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[tokio::test]
    async fn test_terms_top_respects_floor() {
        let limits = QueryLimits {
            min_doc_count: 2,
            ..QueryLimits::default()
        };
        let q = QueryBuilder::new(limits).terms("*", &title_field(), AggregationKind::Top);
        let resp = search(q).await;
        let buckets = resp.buckets(&["sample", "topterms"]).unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].key_string(), "storm");
        assert_eq!(buckets[0].doc_count, 2);
    }

    #[tokio::test]
    async fn test_rare_terms_exclude_numbers() {
        let q = QueryBuilder::default().terms("*", &title_field(), AggregationKind::Rare);
        let resp = search(q).await;
        let keys: Vec<String> = resp
            .buckets(&["sample", "topterms"])
            .unwrap()
            .iter()
            .map(|b| b.key_string())
            .collect();
        assert!(keys.contains(&"elections".to_string()));
        assert!(!keys.contains(&"2023".to_string()));
        assert!(!keys.contains(&"storm".to_string()));
    }

    #[tokio::test]
    async fn test_significant_terms_prefers_foreground() {
        let limits = QueryLimits {
            min_doc_count: 1,
            ..QueryLimits::default()
        };
        let q = QueryBuilder::new(limits).terms("election", &title_field(), AggregationKind::Significant);
        let resp = search(q).await;
        let buckets = resp.buckets(&["sample", "topterms"]).unwrap();
        assert_eq!(buckets[0].key_string(), "elections");
    }

    #[tokio::test]
    async fn test_get_document() {
        let backend = backend();
        let hit = backend.get_document("news", "b").await.unwrap().unwrap();
        assert_eq!(hit.source.surt_url.as_deref(), Some("org,example)/b"));
        assert!(backend.get_document("news", "zzz").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bad_query_string_is_invalid_query() {
        let err = backend()
            .search_raw("news", &basic_query("(storm"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidQuery(_)));
    }
}
