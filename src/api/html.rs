// src/api/html.rs

//! Human-readable link indexes for browsing the API.

use axum::extract::{Path, State};
use axum::response::Html;
use std::sync::Arc;

use crate::api::{API_PREFIX, AppState};
use crate::error::Result;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Render `(href, label)` pairs as an unordered list.
fn link_list<'a>(links: impl IntoIterator<Item = (String, &'a str)>) -> Html<String> {
    let mut lines = vec!["<ul>".to_string()];
    lines.extend(links.into_iter().map(|(href, label)| {
        format!(
            r#"<li><a href="{}">{}</a></li>"#,
            escape(&href),
            escape(label)
        )
    }));
    lines.push("</ul>".to_string());
    Html(lines.join("\n"))
}

/// `/`
pub async fn entrypoint(State(state): State<Arc<AppState>>) -> Html<String> {
    let Html(list) = link_list([(format!("{API_PREFIX}/"), "API (v1)")]);
    Html(format!(
        "<h1>{}</h1>\n<p>{}</p>\n{}",
        escape(&state.config.title),
        escape(&state.config.description),
        list
    ))
}

/// `/v1/`
pub async fn version_root(State(state): State<Arc<AppState>>) -> Html<String> {
    link_list(
        state
            .service
            .catalog()
            .collections()
            .iter()
            .map(|c| (format!("{API_PREFIX}/{}", c.name()), c.name())),
    )
}

/// `/v1/{collection}`
pub async fn collection_root(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
) -> Result<Html<String>> {
    let collection = state.service.catalog().collection(&collection)?;
    let base = format!("{API_PREFIX}/{}", collection.name());
    Ok(link_list([
        (format!("{base}/search"), "Search API"),
        (format!("{base}/terms"), "Related Terms API"),
        (format!("{base}/article"), "Article"),
    ]))
}

/// `/v1/{collection}/search`
pub async fn search_root(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
) -> Result<Html<String>> {
    let collection = state.service.catalog().collection(&collection)?;
    let base = format!("{API_PREFIX}/{}/search", collection.name());
    Ok(link_list([
        (format!("{base}/overview"), "Search Overview"),
        (format!("{base}/result"), "Search Result"),
    ]))
}

/// `/v1/{collection}/terms`
pub async fn term_field_root(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
) -> Result<Html<String>> {
    let catalog = state.service.catalog();
    let collection = catalog.collection(&collection)?;
    let base = format!("{API_PREFIX}/{}/terms", collection.name());
    Ok(link_list(
        catalog
            .term_fields()
            .iter()
            .map(|f| (format!("{base}/{}", f.as_str()), f.as_str())),
    ))
}

/// `/v1/{collection}/terms/{field}`
pub async fn term_aggr_root(
    State(state): State<Arc<AppState>>,
    Path((collection, field)): Path<(String, String)>,
) -> Result<Html<String>> {
    let catalog = state.service.catalog();
    let collection = catalog.collection(&collection)?;
    let field = catalog.term_field(&field)?;
    let base = format!("{API_PREFIX}/{}/terms/{}", collection.name(), field.as_str());
    Ok(link_list(
        catalog
            .aggregations()
            .iter()
            .map(|a| (format!("{base}/{}", a.as_str()), a.as_str())),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_list_escapes() {
        let Html(html) = link_list([("/v1/a&b".to_string(), "<b>")]);
        assert_eq!(
            html,
            "<ul>\n<li><a href=\"/v1/a&amp;b\">&lt;b&gt;</a></li>\n</ul>"
        );
    }
}
