//! Service layer of the gateway.
//!
//! This module contains the request-independent logic for:
//! - Result formatting (`format`)
//! - Page-scan continuation (`pagination`)
//! - Endpoint orchestration (`SearchService`)

pub mod format;
pub mod pagination;
mod search;

pub use format::MatchFormatter;
pub use pagination::PageState;
pub use search::{Page, SearchService};
