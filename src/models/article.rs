//! Public response shapes.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A matching article as exposed by the API.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PublicMatch {
    pub title: String,

    /// Date-only publication date (`YYYY-MM-DD`), empty when unknown
    pub publication_date: String,

    /// ISO-8601 capture instant
    pub capture_time: String,

    pub language: String,
    pub domain: String,
    pub url: String,

    /// Raw archived capture
    pub original_capture_url: String,

    /// Archive playback page
    pub archive_playback_url: String,

    /// Self link to the expanded article view
    pub article_url: String,

    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub expanded: Option<ExpandedFields>,
}

/// Extra fields of the single-article view.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ExpandedFields {
    pub surt_url: String,
    pub snippet: String,
    pub text_extraction_method: String,
    pub version: String,
}

/// Response of the overview endpoint.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Overview {
    pub query: String,
    pub total: u64,
    pub topdomains: Counts,
    pub toptlds: Counts,
    pub toplangs: Counts,
    pub dailycounts: Counts,
    pub matches: Vec<PublicMatch>,
}

/// Ordered `key -> count` table.
///
/// Keeps first-insertion order; inserting an existing key replaces its count
/// in place. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counts {
    entries: Vec<(String, u64)>,
    positions: HashMap<String, usize>,
}

impl Counts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, count: u64) {
        match self.positions.get(&key) {
            Some(&at) => self.entries[at].1 = count,
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, count));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.positions.get(key).map(|&at| self.entries[at].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Sum of all counts.
    pub fn sum(&self) -> u64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }
}

impl FromIterator<(String, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (key, count) in iter {
            counts.insert(key, count);
        }
        counts
    }
}

impl Serialize for Counts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in &self.entries {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_last_write_wins_in_place() {
        let counts: Counts = vec![
            ("b".to_string(), 5),
            ("a".to_string(), 3),
            ("b".to_string(), 1),
        ]
        .into_iter()
        .collect();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.get("b"), Some(1));
        assert_eq!(counts.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(counts.sum(), 4);
    }

    #[test]
    fn test_counts_many_keys_keep_order() {
        let mut counts = Counts::new();
        for day in 0..5_000u64 {
            counts.insert(format!("day-{day:05}"), day);
        }
        counts.insert("day-00010".to_string(), 99);
        assert_eq!(counts.len(), 5_000);
        assert_eq!(counts.get("day-00010"), Some(99));
        assert_eq!(counts.get("day-04999"), Some(4_999));
        assert_eq!(counts.get("missing"), None);
        assert_eq!(counts.keys().nth(10), Some("day-00010"));
    }

    #[test]
    fn test_counts_serializes_in_order() {
        let counts: Counts = vec![("z".to_string(), 9), ("a".to_string(), 1)]
            .into_iter()
            .collect();
        assert_eq!(serde_json::to_string(&counts).unwrap(), r#"{"z":9,"a":1}"#);
    }

    #[test]
    fn test_public_match_omits_expanded_fields() {
        let m = PublicMatch {
            title: "t".into(),
            publication_date: String::new(),
            capture_time: "1970-01-01T00:00:00Z".into(),
            language: String::new(),
            domain: "d".into(),
            url: "u".into(),
            original_capture_url: "o".into(),
            archive_playback_url: "p".into(),
            article_url: "a".into(),
            expanded: None,
        };
        let value = serde_json::to_value(&m).unwrap();
        assert!(value.get("snippet").is_none());
        assert_eq!(value["title"], "t");
    }
}
