//! Utility functions and helpers.

pub mod fixtures;
pub mod http;
pub mod url;
