// src/api/handlers.rs

//! JSON data endpoints.
//!
//! Every data endpoint has a query-parameter (GET/HEAD) and a JSON body
//! (POST) form. Both deserialize into the same parameter struct and share
//! one implementation.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, header};
use serde::Deserialize;
use serde_json::Value;

use crate::api::{API_PREFIX, AppState};
use crate::error::{AppError, Result};
use crate::models::{Counts, Overview, PublicMatch};
use crate::services::pagination::{RESUME_HEADER, next_link};

/// Plain query.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryParams {
    pub q: String,
}

/// Paged query.
#[derive(Debug, Clone, Deserialize)]
pub struct PagedParams {
    pub q: String,
    #[serde(default)]
    pub resume: Option<String>,
}

fn from_query<T>(params: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    params
        .map(|Query(p)| p)
        .map_err(|e| AppError::invalid_body(e.body_text()))
}

fn from_json<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(b)| b)
        .map_err(|e| AppError::invalid_body(e.body_text()))
}

/// API root for self links: the proxy base when configured, otherwise the
/// request's host.
fn base_url(state: &AppState, headers: &HeaderMap) -> String {
    let root = match &state.config.proxy_base {
        Some(proxy) => proxy.clone(),
        None => {
            let host = headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .unwrap_or("localhost");
            format!("http://{host}")
        }
    };
    crate::utils::url::join_base(&root, API_PREFIX)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::invalid_body(format!("value not representable as a header: {e}")))
}

async fn overview(
    state: &AppState,
    collection: &str,
    headers: &HeaderMap,
    params: QueryParams,
) -> Result<Json<Overview>> {
    let collection = state.service.catalog().collection(collection)?;
    let base = base_url(state, headers);
    let overview = state.service.overview(collection, &params.q, &base).await?;
    Ok(Json(overview))
}

/// `GET /v1/{collection}/search/overview?q=`
pub async fn overview_get(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    params: std::result::Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<Overview>> {
    overview(&state, &collection, &headers, from_query(params)?).await
}

/// `POST /v1/{collection}/search/overview`
pub async fn overview_post(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    body: std::result::Result<Json<QueryParams>, JsonRejection>,
) -> Result<Json<Overview>> {
    overview(&state, &collection, &headers, from_json(body)?).await
}

async fn result(
    state: &AppState,
    collection: &str,
    headers: &HeaderMap,
    params: PagedParams,
) -> Result<(HeaderMap, Json<Vec<PublicMatch>>)> {
    let collection = state.service.catalog().collection(collection)?;
    let base = base_url(state, headers);
    let page = state
        .service
        .page(collection, &params.q, params.resume.as_deref(), &base)
        .await?;

    let mut response_headers = HeaderMap::new();
    if let Some(cursor) = page.state.cursor() {
        let link = next_link(&base, collection.name(), &params.q, cursor);
        response_headers.insert(RESUME_HEADER, header_value(cursor)?);
        response_headers.insert(header::LINK, header_value(&link)?);
    }
    Ok((response_headers, Json(page.matches)))
}

/// `GET /v1/{collection}/search/result?q=&resume=`
pub async fn result_get(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    params: std::result::Result<Query<PagedParams>, QueryRejection>,
) -> Result<(HeaderMap, Json<Vec<PublicMatch>>)> {
    result(&state, &collection, &headers, from_query(params)?).await
}

/// `POST /v1/{collection}/search/result`
pub async fn result_post(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    body: std::result::Result<Json<PagedParams>, JsonRejection>,
) -> Result<(HeaderMap, Json<Vec<PublicMatch>>)> {
    result(&state, &collection, &headers, from_json(body)?).await
}

async fn terms(
    state: &AppState,
    (collection, field, aggr): (String, String, String),
    params: QueryParams,
) -> Result<Json<Counts>> {
    let catalog = state.service.catalog();
    let collection = catalog.collection(&collection)?;
    let field = catalog.term_field(&field)?;
    let kind = catalog.aggregation(&aggr)?;
    let counts = state.service.terms(collection, field, kind, &params.q).await?;
    Ok(Json(counts))
}

/// `GET /v1/{collection}/terms/{field}/{aggr}?q=`
pub async fn terms_get(
    State(state): State<Arc<AppState>>,
    Path(segments): Path<(String, String, String)>,
    params: std::result::Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<Counts>> {
    terms(&state, segments, from_query(params)?).await
}

/// `POST /v1/{collection}/terms/{field}/{aggr}`
pub async fn terms_post(
    State(state): State<Arc<AppState>>,
    Path(segments): Path<(String, String, String)>,
    body: std::result::Result<Json<QueryParams>, JsonRejection>,
) -> Result<Json<Counts>> {
    terms(&state, segments, from_json(body)?).await
}

/// `GET /v1/{collection}/article/{id}`
pub async fn article(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<PublicMatch>> {
    let collection = state.service.catalog().collection(&collection)?;
    let base = base_url(&state, &headers);
    let article = state.service.article(collection, &id, &base).await?;
    Ok(Json(article))
}

/// `POST /v1/{collection}/search/esdsl`, routed in debug mode only.
pub async fn esdsl(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
    let collection = state.service.catalog().collection(&collection)?;
    let body = from_json(body)?;
    Ok(Json(state.service.raw(collection, &body).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::backend::{MemoryBackend, StoredDocument};
    use crate::codec;
    use crate::models::{Catalog, Config};
    use crate::utils::fixtures::sample_articles;
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode};
    use axum::response::Response;
    use serde_json::json;
    use std::collections::HashMap;
    use tower::ServiceExt;

    fn app_with(docs: Vec<StoredDocument>, configure: impl FnOnce(&mut Config)) -> Router {
        let mut config = Config {
            indexes: vec!["articles:news".to_string()],
            ..Config::default()
        };
        configure(&mut config);
        let catalog = Catalog::from_config(&config).unwrap();
        let backend = MemoryBackend::new(HashMap::from([("articles".to_string(), docs)]));
        router(Arc::new(AppState::new(config, catalog, Arc::new(backend))))
    }

    fn app(docs: Vec<StoredDocument>) -> Router {
        app_with(docs, |_| {})
    }

    async fn get(app: &Router, uri: &str) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header(header::HOST, "gateway.test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn post(app: &Router, uri: &str, body: Value) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(uri)
                    .header(header::HOST, "gateway.test")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn text_body(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn header_str<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
        response.headers().get(name).and_then(|v| v.to_str().ok())
    }

    /// Fixture with frequent title terms, one numeric-only rare term and one
    /// rare word.
    fn term_docs() -> Vec<StoredDocument> {
        let mut docs = sample_articles(12);
        docs[0].source["title"] = json!("Sample Article 424242 zeppelin");
        docs
    }

    #[tokio::test]
    async fn test_overview_get_post_equivalence() {
        let app = app(sample_articles(3));
        let via_get = get(&app, "/v1/news/search/overview?q=*").await;
        assert_eq!(via_get.status(), StatusCode::OK);
        let via_post = post(&app, "/v1/news/search/overview", json!({"q": "*"})).await;
        assert_eq!(via_post.status(), StatusCode::OK);

        let get_body = text_body(via_get).await;
        assert_eq!(get_body, text_body(via_post).await);

        let overview: Value = serde_json::from_str(&get_body).unwrap();
        assert_eq!(overview["query"], "*");
        assert_eq!(overview["total"], 3);
        assert_eq!(
            overview["matches"][0]["article_url"]
                .as_str()
                .unwrap()
                .split("/article/")
                .next(),
            Some("http://gateway.test/v1/news")
        );
    }

    #[tokio::test]
    async fn test_overview_total_covers_tld_buckets() {
        let app = app(sample_articles(40));
        let overview = json_body(get(&app, "/v1/news/search/overview?q=sample").await).await;
        let tld_sum: u64 = overview["toptlds"]
            .as_object()
            .unwrap()
            .values()
            .map(|v| v.as_u64().unwrap())
            .sum();
        assert!(overview["total"].as_u64().unwrap() >= tld_sum);
        assert_eq!(overview["total"], 40);
    }

    #[tokio::test]
    async fn test_result_get_post_equivalence() {
        let app = app_with(sample_articles(5), |c| c.maxpage = 2);
        let via_get = get(&app, "/v1/news/search/result?q=sample").await;
        let via_post = post(&app, "/v1/news/search/result", json!({"q": "sample"})).await;
        assert_eq!(via_get.status(), StatusCode::OK);
        assert_eq!(via_post.status(), StatusCode::OK);
        assert_eq!(
            header_str(&via_get, RESUME_HEADER),
            header_str(&via_post, RESUME_HEADER)
        );
        assert_eq!(
            header_str(&via_get, "link"),
            header_str(&via_post, "link")
        );
        let token = header_str(&via_get, RESUME_HEADER).unwrap().to_string();
        assert_eq!(text_body(via_get).await, text_body(via_post).await);

        let via_get = get(&app, &format!("/v1/news/search/result?q=sample&resume={token}")).await;
        let via_post = post(
            &app,
            "/v1/news/search/result",
            json!({"q": "sample", "resume": token}),
        )
        .await;
        assert_eq!(text_body(via_get).await, text_body(via_post).await);
    }

    #[tokio::test]
    async fn test_result_continuation_headers() {
        let app = app_with(sample_articles(3), |c| c.maxpage = 2);
        let response = get(&app, "/v1/news/search/result?q=sample+article").await;
        let token = header_str(&response, RESUME_HEADER).unwrap().to_string();
        assert_eq!(
            header_str(&response, "link").unwrap(),
            format!(
                "<http://gateway.test/v1/news/search/result?q=sample+article&resume={token}>; rel=\"next\""
            )
        );
        let page: Vec<Value> = serde_json::from_value(json_body(response).await).unwrap();
        assert_eq!(page.len(), 2);

        let response = get(
            &app,
            &format!("/v1/news/search/result?q=sample+article&resume={token}"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(header_str(&response, RESUME_HEADER).is_none());
        assert!(header_str(&response, "link").is_none());
        assert_eq!(json_body(response).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_page_scan_terminates_and_pages_are_full() {
        let total = 11;
        let page_size = 4;
        let app = app_with(sample_articles(total), |c| c.maxpage = page_size);

        let mut seen = 0;
        let mut requests = 0;
        let mut resume: Option<String> = None;
        loop {
            requests += 1;
            let uri = match &resume {
                Some(token) => format!("/v1/news/search/result?q=*&resume={token}"),
                None => "/v1/news/search/result?q=*".to_string(),
            };
            let response = get(&app, &uri).await;
            if response.status() == StatusCode::NOT_FOUND {
                break;
            }
            assert_eq!(response.status(), StatusCode::OK);
            resume = header_str(&response, RESUME_HEADER).map(str::to_string);
            let len = json_body(response).await.as_array().unwrap().len();
            seen += len;
            match resume {
                Some(_) => assert_eq!(len, page_size),
                None => {
                    assert!(len < page_size);
                    break;
                }
            }
        }
        assert_eq!(seen, total);
        assert!(requests <= total.div_ceil(page_size) + 1);
    }

    #[tokio::test]
    async fn test_page_scan_on_exact_multiple_ends_with_not_found() {
        let app = app_with(sample_articles(4), |c| c.maxpage = 2);
        let mut resume: Option<String> = None;
        let mut statuses = Vec::new();
        for _ in 0..4 {
            let uri = match &resume {
                Some(token) => format!("/v1/news/search/result?q=*&resume={token}"),
                None => "/v1/news/search/result?q=*".to_string(),
            };
            let response = get(&app, &uri).await;
            statuses.push(response.status());
            resume = header_str(&response, RESUME_HEADER).map(str::to_string);
            if resume.is_none() {
                break;
            }
        }
        assert_eq!(
            statuses,
            vec![StatusCode::OK, StatusCode::OK, StatusCode::NOT_FOUND]
        );
    }

    #[tokio::test]
    async fn test_no_matches_is_404_everywhere() {
        let app = app(sample_articles(3));
        for uri in [
            "/v1/news/search/overview?q=asdfdf",
            "/v1/news/search/result?q=asdfdf",
            "/v1/news/terms/title/top?q=asdfdf",
            "/v1/news/terms/title/significant?q=asdfdf",
            "/v1/news/terms/title/rare?q=asdfdf",
        ] {
            let response = get(&app, uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(json_body(response).await["detail"], "No results found!");
        }
        for uri in [
            "/v1/news/search/overview",
            "/v1/news/search/result",
            "/v1/news/terms/title/top",
        ] {
            let response = post(&app, uri, json!({"q": "asdfdf"})).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_terms_get_post_equivalence() {
        let app = app_with(term_docs(), |c| c.terms.min_doc_count = 2);
        for aggr in ["top", "significant", "rare"] {
            let uri = format!("/v1/news/terms/title/{aggr}");
            let via_get = get(&app, &format!("{uri}?q=*")).await;
            let via_post = post(&app, &uri, json!({"q": "*"})).await;
            assert_eq!(via_get.status(), via_post.status(), "{aggr}");
            assert_eq!(text_body(via_get).await, text_body(via_post).await, "{aggr}");
        }
    }

    #[tokio::test]
    async fn test_top_terms() {
        let app = app_with(term_docs(), |c| c.terms.min_doc_count = 2);
        let response = get(&app, "/v1/news/terms/title/top?q=*").await;
        assert_eq!(response.status(), StatusCode::OK);
        let terms = json_body(response).await;
        assert_eq!(terms["sample"], 12);
        assert_eq!(terms["article"], 12);
        assert!(terms.get("zeppelin").is_none());
    }

    #[tokio::test]
    async fn test_rare_terms_exclude_numeric_terms() {
        let app = app(term_docs());
        let response = get(&app, "/v1/news/terms/title/rare?q=*").await;
        assert_eq!(response.status(), StatusCode::OK);
        let terms = json_body(response).await;
        let terms = terms.as_object().unwrap();
        assert!(terms.contains_key("zeppelin"));
        assert!(!terms.contains_key("424242"));
        assert!(terms.keys().all(|k| !k.chars().all(|c| c.is_ascii_digit())));
    }

    #[tokio::test]
    async fn test_article() {
        let docs = sample_articles(3);
        let id = docs[2].id.clone();
        let app = app(docs);

        let response = get(&app, &format!("/v1/news/article/{}", codec::encode(&id))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let article = json_body(response).await;
        assert_eq!(article["url"], "http://example.com/article2");
        assert_eq!(article["surt_url"], "com,example)/article2");
        assert_eq!(article["snippet"], "This is the content of the sample article 2");
        assert_eq!(
            article["archive_playback_url"],
            "https://web.archive.org/web/20231003120000/http://example.com/article2"
        );

        let missing = codec::encode("doc-id-that-does-not-exist");
        let response = get(&app, &format!("/v1/news/article/{missing}")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(response).await["detail"],
            "An article with ID doc-id-that-does-not-exist not found!"
        );

        let response = get(&app, "/v1/news/article/%21%21%21").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bad_resume_token_is_404() {
        let app = app(sample_articles(3));
        let response = get(&app, "/v1/news/search/result?q=*&resume=%21%21").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_path_segments_are_404() {
        let app = app(sample_articles(3));
        for uri in [
            "/v1/nope/search/overview?q=*",
            "/v1/news/terms/url/top?q=*",
            "/v1/news/terms/title/bottom?q=*",
            "/v1/nope",
        ] {
            let response = get(&app, uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_missing_query_is_422() {
        let app = app(sample_articles(3));
        let response = get(&app, "/v1/news/search/overview").await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let response = post(&app, "/v1/news/search/result", json!({"query": "*"})).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_esdsl_only_in_debug() {
        let body = json!({"query": {"match_all": {}}, "size": 0});

        let app = app(sample_articles(3));
        let response = post(&app, "/v1/news/search/esdsl", body.clone()).await;
        assert_ne!(response.status(), StatusCode::OK);

        let app = app_with(sample_articles(3), |c| c.debug = true);
        let response = post(&app, "/v1/news/search/esdsl", body).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["hits"]["total"]["value"], 3);
    }

    #[tokio::test]
    async fn test_proxy_base_overrides_host() {
        let docs = sample_articles(1);
        let app = app_with(docs, |c| c.proxy_base = Some("https://api.example.org/".into()));
        let overview = json_body(get(&app, "/v1/news/search/overview?q=*").await).await;
        assert!(
            overview["matches"][0]["article_url"]
                .as_str()
                .unwrap()
                .starts_with("https://api.example.org/v1/news/article/")
        );
    }
}
