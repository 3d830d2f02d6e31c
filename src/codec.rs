// src/codec.rs

//! Opaque token codec for document IDs and resume cursors.
//!
//! Tokens are URL-safe base64 without padding, so they can be placed in a
//! path segment, a query string or a header value as-is. Tokens carrying
//! `~` padding (as issued by earlier deployments) are still accepted.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

use crate::error::{AppError, Result};

/// Encode an opaque string value into a token.
pub fn encode(value: &str) -> String {
    URL_SAFE_NO_PAD.encode(value.as_bytes())
}

/// Decode a token back into its string value.
pub fn decode(token: &str) -> Result<String> {
    let trimmed = token.trim().trim_end_matches('~');
    let bytes = URL_SAFE_NO_PAD
        .decode(trimmed.as_bytes())
        .map_err(|e| AppError::decode(truncate(token), e))?;
    String::from_utf8(bytes).map_err(|e| AppError::decode(truncate(token), e))
}

fn truncate(token: &str) -> String {
    token.chars().take(64).collect()
}
