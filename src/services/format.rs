// src/services/format.rs

//! Reshaping of engine hits and aggregation buckets into public responses.

use crate::codec;
use crate::error::{AppError, Result};
use crate::models::{Bucket, Counts, ExpandedFields, Hit, PublicMatch};

/// Capture time used when a record has none.
pub const EPOCH_CAPTURE: &str = "19700101000000";

/// Title used when a record has none.
pub const UNKNOWN_TITLE: &str = "[UNKNOWN]";

/// Formats hits into public matches, building archive links from the
/// configured replay service.
#[derive(Debug, Clone)]
pub struct MatchFormatter {
    wayback: String,
}

impl MatchFormatter {
    pub fn new(wayback: impl Into<String>) -> Self {
        let wayback: String = wayback.into();
        Self {
            wayback: wayback.trim_end_matches('/').to_string(),
        }
    }

    /// Reshape a hit into a public match.
    ///
    /// `base` is the API root (including the version prefix) used for the
    /// self link. Missing `domain` or `url` is an integrity error, as is a
    /// missing `surt_url` in the expanded view.
    pub fn format_match(
        &self,
        hit: &Hit,
        base: &str,
        collection: &str,
        expanded: bool,
    ) -> Result<PublicMatch> {
        let src = &hit.source;
        let domain = required(hit, "domain", src.domain.as_deref())?;
        let url = required(hit, "url", src.url.as_deref())?;
        let captured = non_empty(src.first_captured.as_deref()).unwrap_or(EPOCH_CAPTURE);

        let expanded = if expanded {
            Some(ExpandedFields {
                surt_url: required(hit, "surt_url", src.surt_url.as_deref())?.to_string(),
                snippet: src.snippet.clone().unwrap_or_default(),
                text_extraction_method: src.text_extraction_method.clone().unwrap_or_default(),
                version: src.version.clone().unwrap_or_default(),
            })
        } else {
            None
        };

        Ok(PublicMatch {
            title: non_empty(src.title.as_deref())
                .unwrap_or(UNKNOWN_TITLE)
                .to_string(),
            publication_date: prefix(src.publication_date.as_deref().unwrap_or(""), 10),
            capture_time: capture_time(captured),
            language: src.language.clone().unwrap_or_default(),
            domain: domain.to_string(),
            url: url.to_string(),
            original_capture_url: format!("{}/{}id_/{}", self.wayback, captured, url),
            archive_playback_url: format!("{}/{}/{}", self.wayback, captured, url),
            article_url: format!(
                "{}/{}/article/{}",
                base.trim_end_matches('/'),
                collection,
                codec::encode(&hit.id)
            ),
            expanded,
        })
    }
}

/// Reconstruct an ISO-8601 instant from a compact `YYYYMMDDhhmmss` stamp.
///
/// The stamp is already UTC. It is sliced positionally and never
/// validated, so malformed stamps pass through unchanged in shape.
pub fn capture_time(compact: &str) -> String {
    let part = |from: usize, to: usize| -> String {
        compact.chars().skip(from).take(to - from).collect()
    };
    format!(
        "{}-{}-{}T{}:{}:{}Z",
        part(0, 4),
        part(4, 6),
        part(6, 8),
        part(8, 10),
        part(10, 12),
        part(12, 14)
    )
}

/// Day histogram buckets as `date -> count`, keyed by the first ten
/// characters of the formatted key. Later duplicates overwrite earlier ones.
pub fn format_day_counts(buckets: &[Bucket]) -> Counts {
    buckets
        .iter()
        .map(|b| (prefix(&b.formatted_key(), 10), b.doc_count))
        .collect()
}

/// Term buckets as `term -> count`, in engine order.
pub fn format_counts(buckets: &[Bucket]) -> Counts {
    buckets
        .iter()
        .map(|b| (b.key_string(), b.doc_count))
        .collect()
}

fn required<'a>(hit: &Hit, field: &str, value: Option<&'a str>) -> Result<&'a str> {
    value.ok_or_else(|| AppError::integrity(&hit.id, format!("missing required field '{field}'")))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn prefix(value: &str, n: usize) -> String {
    value.chars().take(n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit(source: serde_json::Value) -> Hit {
        serde_json::from_value(json!({"_id": "doc-1", "_source": source})).unwrap()
    }

    fn formatter() -> MatchFormatter {
        MatchFormatter::new("https://web.archive.org/web/")
    }

    #[test]
    fn test_format_full_record() {
        let h = hit(json!({
            "title": "Sample Article",
            "publication_date": "2023-11-01T08:30:00",
            "language": "en",
            "domain": "example.com",
            "url": "http://example.com/article",
            "first_captured": "20231102134501"
        }));
        let m = formatter()
            .format_match(&h, "http://api.test/v1", "news", false)
            .unwrap();
        assert_eq!(m.title, "Sample Article");
        assert_eq!(m.publication_date, "2023-11-01");
        assert_eq!(m.capture_time, "2023-11-02T13:45:01Z");
        assert_eq!(
            m.original_capture_url,
            "https://web.archive.org/web/20231102134501id_/http://example.com/article"
        );
        assert_eq!(
            m.archive_playback_url,
            "https://web.archive.org/web/20231102134501/http://example.com/article"
        );
        assert_eq!(
            m.article_url,
            format!("http://api.test/v1/news/article/{}", codec::encode("doc-1"))
        );
        assert!(m.expanded.is_none());
    }

    #[test]
    fn test_defaults_for_missing_optional_fields() {
        let h = hit(json!({"domain": "example.com", "url": "http://example.com/"}));
        let m = formatter().format_match(&h, "b", "c", false).unwrap();
        assert_eq!(m.title, UNKNOWN_TITLE);
        assert_eq!(m.language, "");
        assert_eq!(m.publication_date, "");
        assert_eq!(m.capture_time, "1970-01-01T00:00:00Z");
        assert!(m.archive_playback_url.contains("/19700101000000/"));
    }

    #[test]
    fn test_empty_title_is_unknown() {
        let h = hit(json!({"title": "", "domain": "d", "url": "u"}));
        let m = formatter().format_match(&h, "b", "c", false).unwrap();
        assert_eq!(m.title, UNKNOWN_TITLE);
    }

    #[test]
    fn test_missing_required_field_is_error() {
        let h = hit(json!({"url": "http://example.com/"}));
        let err = formatter().format_match(&h, "b", "c", false).unwrap_err();
        assert!(matches!(err, AppError::Integrity { .. }));
    }

    #[test]
    fn test_expanded_view() {
        let h = hit(json!({
            "domain": "example.com",
            "url": "http://example.com/a",
            "surt_url": "com,example)/a",
            "snippet": "body text",
            "version": 2
        }));
        let m = formatter().format_match(&h, "b", "c", true).unwrap();
        let expanded = m.expanded.unwrap();
        assert_eq!(expanded.surt_url, "com,example)/a");
        assert_eq!(expanded.snippet, "body text");
        assert_eq!(expanded.text_extraction_method, "");
        assert_eq!(expanded.version, "2");
    }

    #[test]
    fn test_format_is_idempotent() {
        let h = hit(json!({"title": "T", "domain": "d", "url": "u"}));
        let f = formatter();
        assert_eq!(
            f.format_match(&h, "b", "c", true).ok(),
            f.format_match(&h, "b", "c", true).ok()
        );
        assert_eq!(
            f.format_match(&h, "b", "c", false).unwrap(),
            f.format_match(&h, "b", "c", false).unwrap()
        );
    }

    #[test]
    fn test_capture_time_slices_unparseable_stamp() {
        assert_eq!(capture_time("20231301000000"), "2023-13-01T00:00:00Z");
    }

    #[test]
    fn test_capture_time_keeps_malformed_shape() {
        assert_eq!(capture_time("2023110213450"), "2023-11-02T13:45:0Z");
        assert_eq!(capture_time(" 20231102134501"), " 202-31-10T21:34:50Z");
        assert_eq!(capture_time("2023"), "2023---T::Z");
    }

    #[test]
    fn test_day_counts_truncate_and_overwrite() {
        let buckets: Vec<Bucket> = serde_json::from_value(json!([
            {"key": 1, "key_as_string": "2023-11-01T00:00:00.000Z", "doc_count": 3},
            {"key": 2, "key_as_string": "2023-11-02T00:00:00.000Z", "doc_count": 5},
            {"key": 3, "key_as_string": "2023-11-01T12:00:00.000Z", "doc_count": 7}
        ]))
        .unwrap();
        let counts = format_day_counts(&buckets);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.get("2023-11-01"), Some(7));
        assert_eq!(counts.get("2023-11-02"), Some(5));
    }

    #[test]
    fn test_counts_keep_engine_order() {
        let buckets: Vec<Bucket> = serde_json::from_value(json!([
            {"key": "en", "doc_count": 9},
            {"key": "fr", "doc_count": 4},
            {"key": "de", "doc_count": 1}
        ]))
        .unwrap();
        let counts = format_counts(&buckets);
        assert_eq!(counts.keys().collect::<Vec<_>>(), vec!["en", "fr", "de"]);
    }
}
