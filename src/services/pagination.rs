// src/services/pagination.rs

//! Page-scan continuation.
//!
//! A page is "full" when it holds exactly the configured page size; only then
//! is a resume cursor emitted. An empty page is never a valid page: it is
//! reported as not found, which is also how a scan that ended on a full page
//! terminates.

use crate::codec;
use crate::error::{AppError, Result};
use crate::models::Hit;
use crate::utils::url::quote_plus;

/// Header carrying the opaque resume cursor.
pub const RESUME_HEADER: &str = "x-resume-token";

/// Message for empty result sets.
pub const NO_RESULTS: &str = "No results found!";

/// Continuation state of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    /// More documents likely follow; resume with this cursor
    HasMore { cursor: String },
    /// This was the final page
    Exhausted,
}

impl PageState {
    /// Decide the state of a page of hits.
    pub fn of(hits: &[Hit], page_size: usize) -> Result<Self> {
        let last = hits.last().ok_or_else(|| AppError::not_found(NO_RESULTS))?;
        if hits.len() < page_size {
            return Ok(Self::Exhausted);
        }
        let key = last.sort_key().ok_or_else(|| {
            AppError::integrity(&last.id, "hit has no sort value to resume from")
        })?;
        Ok(Self::HasMore {
            cursor: codec::encode(&key),
        })
    }

    pub fn cursor(&self) -> Option<&str> {
        match self {
            Self::HasMore { cursor } => Some(cursor),
            Self::Exhausted => None,
        }
    }

    pub fn has_more(&self) -> bool {
        matches!(self, Self::HasMore { .. })
    }
}

/// Build the `link` header value pointing at the next page of a query.
pub fn next_link(base: &str, collection: &str, q: &str, cursor: &str) -> String {
    format!(
        "<{}/{}/search/result?q={}&resume={}>; rel=\"next\"",
        base.trim_end_matches('/'),
        collection,
        quote_plus(q),
        cursor
    )
}
