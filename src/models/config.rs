//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::AggregationKind;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Display title of the API
    #[serde(default)]
    pub title: String,

    /// Display description of the API
    #[serde(default)]
    pub description: String,

    /// Enables debugging endpoints (raw query passthrough)
    #[serde(default)]
    pub debug: bool,

    /// Base URL of the web archive replay service
    #[serde(default = "defaults::wayback")]
    pub wayback: String,

    /// Number of matches per page of `/search/result`
    #[serde(default = "defaults::maxpage")]
    pub maxpage: usize,

    /// Public base URL used for self links (falls back to the request host)
    #[serde(default)]
    pub proxy_base: Option<String>,

    /// Collections as `index_name:public_name` (or a bare name)
    #[serde(default)]
    pub indexes: Vec<String>,

    /// Fields exposed by the terms endpoints
    #[serde(default = "defaults::termfields")]
    pub termfields: Vec<String>,

    /// Aggregation kinds exposed by the terms endpoints
    #[serde(default = "defaults::termaggrs")]
    pub termaggrs: Vec<String>,

    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Search engine connection settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Term aggregation thresholds
    #[serde(default)]
    pub terms: TermsConfig,

    /// Overview aggregation settings
    #[serde(default)]
    pub overview: OverviewConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.indexes.is_empty() {
            return Err(AppError::config("No indexes defined"));
        }
        let mut names = HashSet::new();
        for entry in &self.indexes {
            let (index, name) = split_index_entry(entry);
            if index.is_empty() || name.is_empty() {
                return Err(AppError::config(format!("Malformed index entry '{entry}'")));
            }
            if !names.insert(name) {
                return Err(AppError::config(format!("Duplicate collection name '{name}'")));
            }
        }
        for aggr in &self.termaggrs {
            if AggregationKind::parse(aggr).is_none() {
                return Err(AppError::config(format!(
                    "Unknown term aggregation '{aggr}' (expected top, significant or rare)"
                )));
            }
        }
        if self.termfields.iter().any(|f| f.trim().is_empty()) {
            return Err(AppError::config("termfields contains an empty name"));
        }
        if self.maxpage == 0 {
            return Err(AppError::config("maxpage must be > 0"));
        }
        if self.search.hosts.is_empty() {
            return Err(AppError::config("search.hosts is empty"));
        }
        if self.search.timeout_secs == 0 {
            return Err(AppError::config("search.timeout_secs must be > 0"));
        }
        if self.overview.bucket_size == 0 {
            return Err(AppError::config("overview.bucket_size must be > 0"));
        }
        if self.terms.size == 0 || self.terms.sample_size == 0 || self.terms.rare_sample_size == 0
        {
            return Err(AppError::config(
                "terms.size, terms.sample_size and terms.rare_sample_size must be > 0",
            ));
        }
        regex::Regex::new(&self.terms.rare_exclude).map_err(|e| {
            AppError::config(format!(
                "terms.rare_exclude is not a valid pattern: {e}"
            ))
        })?;
        Ok(())
    }
}

/// Split an `index_name:public_name` entry; a bare name is used for both.
pub fn split_index_entry(entry: &str) -> (&str, &str) {
    let entry = entry.trim();
    match entry.split_once(':') {
        Some((index, name)) => (index.trim(), name.trim()),
        None => (entry, entry),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            debug: false,
            wayback: defaults::wayback(),
            maxpage: defaults::maxpage(),
            proxy_base: None,
            indexes: Vec::new(),
            termfields: defaults::termfields(),
            termaggrs: defaults::termaggrs(),
            server: ServerConfig::default(),
            search: SearchConfig::default(),
            terms: TermsConfig::default(),
            overview: OverviewConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the gateway binds to
    #[serde(default = "defaults::bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: defaults::bind(),
        }
    }
}

/// Search engine connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Engine base URLs, tried in order
    #[serde(default = "defaults::hosts")]
    pub hosts: Vec<String>,

    /// Basic auth user
    #[serde(default)]
    pub username: Option<String>,

    /// Basic auth password
    #[serde(default)]
    pub password: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for engine requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            hosts: defaults::hosts(),
            username: None,
            password: None,
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
        }
    }
}

/// Term aggregation thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermsConfig {
    /// Maximum number of buckets for top/significant terms
    #[serde(default = "defaults::terms_size")]
    pub size: usize,

    /// Minimum global document count of a bucket
    #[serde(default = "defaults::min_doc_count")]
    pub min_doc_count: u64,

    /// Minimum per-shard document count of a bucket
    #[serde(default = "defaults::shard_min_doc_count")]
    pub shard_min_doc_count: u64,

    /// Sampler size for top/significant terms
    #[serde(default = "defaults::sample_size")]
    pub sample_size: usize,

    /// Sampler size for rare terms
    #[serde(default = "defaults::rare_sample_size")]
    pub rare_sample_size: usize,

    /// Terms matching this pattern are dropped from rare terms
    #[serde(default = "defaults::rare_exclude")]
    pub rare_exclude: String,
}

impl Default for TermsConfig {
    fn default() -> Self {
        Self {
            size: defaults::terms_size(),
            min_doc_count: defaults::min_doc_count(),
            shard_min_doc_count: defaults::shard_min_doc_count(),
            sample_size: defaults::sample_size(),
            rare_sample_size: defaults::rare_sample_size(),
            rare_exclude: defaults::rare_exclude(),
        }
    }
}

/// Overview aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewConfig {
    /// Top-N cap for language/domain/tld buckets
    #[serde(default = "defaults::bucket_size")]
    pub bucket_size: usize,
}

impl Default for OverviewConfig {
    fn default() -> Self {
        Self {
            bucket_size: defaults::bucket_size(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    pub fn wayback() -> String {
        "https://web.archive.org/web".into()
    }
    pub fn maxpage() -> usize {
        1000
    }
    pub fn termfields() -> Vec<String> {
        vec!["title".into(), "snippet".into()]
    }
    pub fn termaggrs() -> Vec<String> {
        vec!["top".into(), "significant".into(), "rare".into()]
    }

    // Server defaults
    pub fn bind() -> String {
        "0.0.0.0:8000".into()
    }

    // Search engine defaults
    pub fn hosts() -> Vec<String> {
        vec!["http://localhost:9200".into()]
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn user_agent() -> String {
        concat!("archive-gateway/", env!("CARGO_PKG_VERSION")).into()
    }

    // Terms defaults
    pub fn terms_size() -> usize {
        200
    }
    pub fn min_doc_count() -> u64 {
        10
    }
    pub fn shard_min_doc_count() -> u64 {
        5
    }
    pub fn sample_size() -> usize {
        500
    }
    pub fn rare_sample_size() -> usize {
        10
    }
    pub fn rare_exclude() -> String {
        "[0-9]+".into()
    }

    // Overview defaults
    pub fn bucket_size() -> usize {
        100
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
