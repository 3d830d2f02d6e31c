// src/utils/url.rs

//! URL manipulation utilities.

use url::form_urlencoded;

/// Form-encode a query value (spaces become `+`).
///
/// # Examples
/// ```
/// use archive_gateway::utils::url::quote_plus;
///
/// assert_eq!(quote_plus("a b/c"), "a+b%2Fc");
/// ```
pub fn quote_plus(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Join an API root and a version prefix without doubled slashes.
///
/// # Examples
/// ```
/// use archive_gateway::utils::url::join_base;
///
/// assert_eq!(join_base("http://host/", "/v1"), "http://host/v1");
/// ```
pub fn join_base(root: &str, prefix: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let root = root.trim_end_matches('/');
    if prefix.is_empty() {
        root.to_string()
    } else {
        format!("{root}/{prefix}")
    }
}

/// Top-level domain of a host name (its last label).
pub fn tld(domain: &str) -> Option<&str> {
    domain
        .trim_end_matches('.')
        .rsplit('.')
        .next()
        .filter(|label| !label.is_empty())
}
