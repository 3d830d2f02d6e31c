// src/services/search.rs

//! Endpoint orchestration, independent of the HTTP layer.
//!
//! Every operation resolves to the same steps: build a query body, run it
//! against the injected backend, turn an empty result into not-found, then
//! reshape the engine response into the public shape.

use std::sync::Arc;

use serde_json::Value;

use crate::backend::SearchBackend;
use crate::codec;
use crate::error::{AppError, Result};
use crate::models::{AggregationKind, Catalog, Collection, Config, Counts, Overview, PublicMatch, TermField};
use crate::query::{QueryBuilder, QueryLimits};
use crate::services::format::{MatchFormatter, format_counts, format_day_counts};
use crate::services::pagination::{NO_RESULTS, PageState};

/// One page of a page scan.
#[derive(Debug, Clone)]
pub struct Page {
    pub matches: Vec<PublicMatch>,
    pub state: PageState,
}

/// Read-only search operations over the configured collections.
pub struct SearchService {
    backend: Arc<dyn SearchBackend>,
    catalog: Arc<Catalog>,
    builder: QueryBuilder,
    formatter: MatchFormatter,
}

impl SearchService {
    pub fn new(backend: Arc<dyn SearchBackend>, catalog: Arc<Catalog>, config: &Config) -> Self {
        Self {
            backend,
            catalog,
            builder: QueryBuilder::new(QueryLimits::from_config(config)),
            formatter: MatchFormatter::new(&config.wayback),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn builder(&self) -> &QueryBuilder {
        &self.builder
    }

    /// Summary of a query: totals, top buckets, daily counts and the first
    /// matches.
    pub async fn overview(&self, collection: &Collection, q: &str, base: &str) -> Result<Overview> {
        let body = self.builder.overview(q);
        let response = self.backend.search(collection.index(), &body).await?;
        if response.hits.hits.is_empty() {
            return Err(AppError::not_found(NO_RESULTS));
        }

        let toptlds = format_counts(&response.buckets(&["tld"])?);
        // Bucket caps can undercount, never overcount
        let total = response.total().max(toptlds.sum());

        let matches = response
            .hits
            .hits
            .iter()
            .map(|hit| self.formatter.format_match(hit, base, collection.name(), false))
            .collect::<Result<Vec<_>>>()?;

        Ok(Overview {
            query: q.to_string(),
            total,
            topdomains: format_counts(&response.buckets(&["domain"])?),
            toptlds,
            toplangs: format_counts(&response.buckets(&["lang"])?),
            dailycounts: format_day_counts(&response.buckets(&["daily"])?),
            matches,
        })
    }

    /// One page of matches in stable sort order, resuming after `resume`.
    ///
    /// A malformed cursor fails before the engine is queried.
    pub async fn page(
        &self,
        collection: &Collection,
        q: &str,
        resume: Option<&str>,
        base: &str,
    ) -> Result<Page> {
        let body = self.builder.page(q, resume)?;
        let response = self.backend.search(collection.index(), &body).await?;
        let state = PageState::of(&response.hits.hits, self.builder.limits().page_size)?;

        let matches = response
            .hits
            .hits
            .iter()
            .map(|hit| self.formatter.format_match(hit, base, collection.name(), false))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "Page of {} matches for '{}' in {} (more: {})",
            matches.len(),
            q,
            collection.name(),
            state.has_more()
        );
        Ok(Page { matches, state })
    }

    /// Term frequency table of a field over the best matches.
    pub async fn terms(
        &self,
        collection: &Collection,
        field: &TermField,
        kind: AggregationKind,
        q: &str,
    ) -> Result<Counts> {
        let body = self.builder.terms(q, field, kind);
        let response = self.backend.search(collection.index(), &body).await?;
        if response.hits.hits.is_empty() {
            return Err(AppError::not_found(NO_RESULTS));
        }

        let counts = format_counts(&response.buckets(&["sample", "topterms"])?);
        if counts.is_empty() {
            return Err(AppError::not_found(NO_RESULTS));
        }
        Ok(counts)
    }

    /// Expanded view of a single article by its opaque ID.
    pub async fn article(&self, collection: &Collection, id: &str, base: &str) -> Result<PublicMatch> {
        let doc_id = codec::decode(id)?;
        let hit = self
            .backend
            .get_document(collection.index(), &doc_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("An article with ID {doc_id} not found!")))?;
        self.formatter.format_match(&hit, base, collection.name(), true)
    }

    /// Pass a raw query body through to the engine.
    pub async fn raw(&self, collection: &Collection, body: &Value) -> Result<Value> {
        log::info!("Raw query against {}", collection.index());
        self.backend.search_raw(collection.index(), body).await
    }
}
