// src/models/mod.rs

//! Domain models for the gateway.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod article;
mod catalog;
pub mod config;
mod search;

// Re-export all public types
pub use article::{Counts, ExpandedFields, Overview, PublicMatch};
pub use catalog::{AggregationKind, Catalog, Collection, TermField};
pub use config::{
    Config, LoggingConfig, OverviewConfig, SearchConfig, ServerConfig, TermsConfig,
};
pub use search::{ArticleSource, Bucket, Hit, Hits, SearchResponse, TotalHits};
