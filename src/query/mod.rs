//! Search engine query construction.
//!
//! Every public request shape maps to one builder. Builders are pure: they
//! only read the immutable [`QueryLimits`] and their arguments.

mod builder;

pub use builder::{QueryBuilder, basic_query};

use crate::models::Config;

/// Field searched by free-text queries.
pub const DEFAULT_FIELD: &str = "snippet";

/// Stable pagination sort key.
pub const SORT_FIELD: &str = "surt_url";

/// Fields projected for list views.
pub const LIST_FIELDS: [&str; 6] = [
    "title",
    "publication_date",
    "language",
    "domain",
    "url",
    "first_captured",
];

/// Numeric knobs of the query builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryLimits {
    /// Page size of the page-scan query
    pub page_size: usize,
    /// Top-N cap for overview term buckets
    pub overview_buckets: usize,
    /// Bucket cap for top/significant terms
    pub terms_size: usize,
    pub min_doc_count: u64,
    pub shard_min_doc_count: u64,
    /// Sampler size for top/significant terms
    pub sample_size: usize,
    /// Sampler size for rare terms
    pub rare_sample_size: usize,
    /// Exclusion pattern for rare terms
    pub rare_exclude: String,
}

impl QueryLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_size: config.maxpage,
            overview_buckets: config.overview.bucket_size,
            terms_size: config.terms.size,
            min_doc_count: config.terms.min_doc_count,
            shard_min_doc_count: config.terms.shard_min_doc_count,
            sample_size: config.terms.sample_size,
            rare_sample_size: config.terms.rare_sample_size,
            rare_exclude: config.terms.rare_exclude.clone(),
        }
    }
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
