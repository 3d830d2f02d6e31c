//! Search engine backends.
//!
//! The gateway talks to its search engine only through [`SearchBackend`],
//! which is constructed once at startup and handed to the services:
//!
//! - [`ElasticBackend`]: the production engine over HTTP
//! - [`MemoryBackend`]: an in-process engine over fixture documents, for
//!   development and tests

mod elastic;
mod memory;
mod query_string;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{Hit, SearchResponse};

pub use elastic::ElasticBackend;
pub use memory::MemoryBackend;

/// A stored document as held by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_source")]
    pub source: Value,
}

/// Trait for search engine backends.
///
/// Every call is a suspending I/O operation; implementations hold no
/// per-request state and must not cache results.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a search body against an index, returning the raw response.
    async fn search_raw(&self, index: &str, body: &Value) -> Result<Value>;

    /// Fetch a single document by ID. `None` when it does not exist.
    async fn get_document(&self, index: &str, id: &str) -> Result<Option<Hit>>;

    /// Run a search body and parse the response.
    async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse> {
        let raw = self.search_raw(index, body).await?;
        serde_json::from_value(raw)
            .map_err(|e| AppError::upstream(200, format!("malformed search response: {e}")))
    }
}
