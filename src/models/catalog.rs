//! Collections, term fields and aggregation kinds exposed by the gateway.
//!
//! The catalog is built once from a validated [`Config`] and is immutable
//! afterwards. Path segments are resolved against it before any query is
//! built, so handlers only ever see known values.

use std::fmt;

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::models::config::split_index_entry;

/// Term aggregation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationKind {
    /// Frequency-ranked terms
    Top,
    /// Terms over-represented relative to the background set
    Significant,
    /// Least frequent terms
    Rare,
}

impl AggregationKind {
    pub const ALL: [AggregationKind; 3] = [Self::Top, Self::Significant, Self::Rare];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Significant => "significant",
            Self::Rare => "rare",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s.trim())
    }
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A search index exposed under a public path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    index: String,
    name: String,
}

impl Collection {
    /// Backend index name.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Public path segment.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A document field exposed by the terms endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermField(String);

impl TermField {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Immutable registry of everything a request may name.
#[derive(Debug, Clone)]
pub struct Catalog {
    collections: Vec<Collection>,
    term_fields: Vec<TermField>,
    aggregations: Vec<AggregationKind>,
}

impl Catalog {
    /// Build the catalog from a configuration, validating it first.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let collections = config
            .indexes
            .iter()
            .map(|entry| {
                let (index, name) = split_index_entry(entry);
                Collection {
                    index: index.to_string(),
                    name: name.to_string(),
                }
            })
            .collect();

        let mut term_fields: Vec<TermField> = Vec::new();
        for field in &config.termfields {
            let field = TermField(field.trim().to_string());
            if !term_fields.contains(&field) {
                term_fields.push(field);
            }
        }

        let mut aggregations = Vec::new();
        for aggr in config.termaggrs.iter().filter_map(|a| AggregationKind::parse(a)) {
            if !aggregations.contains(&aggr) {
                aggregations.push(aggr);
            }
        }

        Ok(Self {
            collections,
            term_fields,
            aggregations,
        })
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn term_fields(&self) -> &[TermField] {
        &self.term_fields
    }

    pub fn aggregations(&self) -> &[AggregationKind] {
        &self.aggregations
    }

    /// Resolve a collection path segment.
    pub fn collection(&self, segment: &str) -> Result<&Collection> {
        self.collections
            .iter()
            .find(|c| c.name == segment)
            .ok_or_else(|| AppError::invalid_path(format!("Unknown collection '{segment}'")))
    }

    /// Resolve a term field path segment.
    pub fn term_field(&self, segment: &str) -> Result<&TermField> {
        self.term_fields
            .iter()
            .find(|f| f.0 == segment)
            .ok_or_else(|| AppError::invalid_path(format!("Unknown term field '{segment}'")))
    }

    /// Resolve an aggregation kind path segment.
    pub fn aggregation(&self, segment: &str) -> Result<AggregationKind> {
        AggregationKind::parse(segment)
            .filter(|kind| self.aggregations.contains(kind))
            .ok_or_else(|| AppError::invalid_path(format!("Unknown aggregation '{segment}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        let config = Config {
            indexes: vec!["mc_search:mediacloud".into(), "plain".into()],
            termfields: vec!["title".into(), "title".into()],
            termaggrs: vec!["top".into(), "rare".into()],
            ..Config::default()
        };
        Catalog::from_config(&config).unwrap()
    }

    #[test]
    fn test_collection_resolves_public_name() {
        let catalog = catalog();
        let c = catalog.collection("mediacloud").unwrap();
        assert_eq!(c.index(), "mc_search");
        assert_eq!(catalog.collection("plain").unwrap().index(), "plain");
    }

    #[test]
    fn test_collection_rejects_index_name() {
        let err = catalog().collection("mc_search").unwrap_err();
        assert!(matches!(err, AppError::InvalidPath(_)));
    }

    #[test]
    fn test_term_fields_deduplicated() {
        assert_eq!(catalog().term_fields().len(), 1);
        assert!(catalog().term_field("snippet").is_err());
    }

    #[test]
    fn test_aggregation_restricted_to_configured() {
        let catalog = catalog();
        assert_eq!(catalog.aggregation("rare").unwrap(), AggregationKind::Rare);
        assert!(catalog.aggregation("significant").is_err());
        assert!(catalog.aggregation("median").is_err());
    }

    #[test]
    fn test_aggregation_kind_parse() {
        assert_eq!(AggregationKind::parse("top"), Some(AggregationKind::Top));
        assert_eq!(AggregationKind::parse("TOP"), None);
    }
}
