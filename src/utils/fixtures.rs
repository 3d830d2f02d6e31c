// src/utils/fixtures.rs

//! Synthetic article fixtures for local development and tests.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::json;
use sha2::{Digest, Sha256};

use crate::backend::StoredDocument;
use crate::error::Result;

/// Generate `count` sample articles on `example.com`.
///
/// IDs are the hex SHA-256 of the article URL; publication dates cycle
/// through days 1-29 and advance one month per thousand articles.
pub fn sample_articles(count: usize) -> Vec<StoredDocument> {
    (0..count).map(sample_article).collect()
}

fn sample_article(idx: usize) -> StoredDocument {
    let url = format!("http://example.com/article{idx}");
    let month = 10 + (idx / 1000) % 3;
    let day = 1 + idx % 29;
    let date = format!("2023-{month:02}-{day:02}");
    let captured = format!("2023{month:02}{day:02}120000");

    StoredDocument {
        id: hex::encode(Sha256::digest(url.as_bytes())),
        source: json!({
            "title": format!("Sample Article {idx}"),
            "snippet": format!("This is the content of the sample article {idx}"),
            "publication_date": date,
            "language": "en",
            "domain": "example.com",
            "tld": "com",
            "url": url,
            "surt_url": format!("com,example)/article{idx}"),
            "first_captured": captured,
            "text_extraction_method": "trafilatura",
            "version": "1.0"
        }),
    }
}

/// Write a fixture file holding `docs` under `index`.
pub async fn write_fixture_file(
    path: impl AsRef<Path>,
    index: &str,
    docs: Vec<StoredDocument>,
) -> Result<()> {
    let mut indexes = BTreeMap::new();
    indexes.insert(index.to_string(), docs);
    let json = serde_json::to_vec_pretty(&indexes)?;
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, json).await?;
    Ok(())
}
