// src/config.rs

//! Configuration loading utilities.
//!
//! The configuration file is read first; deployment environment variables
//! are then laid over it, so a container can be configured without a file.
//!
//! | Variable | Field |
//! |---|---|
//! | `INDEXES` | `indexes` (list) |
//! | `TERMFIELDS` | `termfields` (list) |
//! | `TERMAGGRS` | `termaggrs` (list) |
//! | `ESHOSTS` | `search.hosts` (list) |
//! | `ESUSER` / `ESPASS` | `search.username` / `search.password` |
//! | `ESTIMEOUT` | `search.timeout_secs` |
//! | `WAYBACK` | `wayback` |
//! | `MAXPAGE` | `maxpage` |
//! | `TITLE` / `DESCRIPTION` | `title` / `description` |
//! | `DEBUG` | `debug` (`true`, `1` or `t`) |
//! | `PROXY_BASE` | `proxy_base` |
//! | `BIND` | `server.bind` |
//!
//! Lists are separated by commas and/or whitespace.

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::Config;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "CONFIG";

/// Configuration file used when neither a path nor `CONFIG` is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Resolve the configuration file path: explicit path, then `CONFIG`, then
/// the default file name.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load configuration from a TOML file, falling back to defaults when the
/// file is missing or unreadable.
pub fn load_config(path: &Path) -> Config {
    if !path.exists() {
        log::info!("No config file at {}; using defaults", path.display());
        return Config::default();
    }
    Config::load_or_default(path)
}

/// Overlay environment variables onto a configuration.
///
/// `lookup` returns the value of a variable; empty values are ignored.
pub fn apply_env<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = var("INDEXES") {
        config.indexes = split_list(&v);
    }
    if let Some(v) = var("TERMFIELDS") {
        config.termfields = split_list(&v);
    }
    if let Some(v) = var("TERMAGGRS") {
        config.termaggrs = split_list(&v);
    }
    if let Some(v) = var("ESHOSTS") {
        config.search.hosts = split_list(&v);
    }
    if let Some(v) = var("ESUSER") {
        config.search.username = Some(v);
    }
    if let Some(v) = var("ESPASS") {
        config.search.password = Some(v);
    }
    if let Some(v) = var("ESTIMEOUT") {
        config.search.timeout_secs = parse_number("ESTIMEOUT", &v)?;
    }
    if let Some(v) = var("WAYBACK") {
        config.wayback = v.trim().trim_end_matches('/').to_string();
    }
    if let Some(v) = var("MAXPAGE") {
        config.maxpage = parse_number("MAXPAGE", &v)?;
    }
    if let Some(v) = var("TITLE") {
        config.title = v;
    }
    if let Some(v) = var("DESCRIPTION") {
        config.description = v;
    }
    if let Some(v) = var("DEBUG") {
        config.debug = parse_flag(&v);
    }
    if let Some(v) = var("PROXY_BASE") {
        config.proxy_base = Some(v.trim().to_string());
    }
    if let Some(v) = var("BIND") {
        config.server.bind = v.trim().to_string();
    }
    Ok(())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::config(format!("{key} must be a non-negative integer, got '{value}'")))
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "t")
}
