//! HTTP surface of the gateway.
//!
//! All data routes live under [`API_PREFIX`]. Path segments are resolved
//! against the [`Catalog`] inside the handlers, so unknown collections,
//! fields and aggregations are rejected before any query is built.

mod error;
mod handlers;
mod html;

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::backend::SearchBackend;
use crate::models::{Catalog, Config};
use crate::services::SearchService;
use crate::services::pagination::RESUME_HEADER;

pub use error::ErrorBody;
pub use handlers::{PagedParams, QueryParams};

/// Version prefix of every API route.
pub const API_PREFIX: &str = "/v1";

/// Value of the `x-api-version` header.
pub const API_VERSION: &str = "1.0.0";

const API_VERSION_HEADER: &str = "x-api-version";

/// Shared, immutable state of the HTTP layer.
pub struct AppState {
    pub config: Arc<Config>,
    pub service: SearchService,
}

impl AppState {
    pub fn new(config: Config, catalog: Catalog, backend: Arc<dyn SearchBackend>) -> Self {
        let service = SearchService::new(backend, Arc::new(catalog), &config);
        Self {
            config: Arc::new(config),
            service,
        }
    }
}

/// Build the gateway router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut api = Router::new()
        .route("/", get(html::entrypoint))
        .route(API_PREFIX, get(html::version_root))
        .route(&format!("{API_PREFIX}/"), get(html::version_root))
        .route(&format!("{API_PREFIX}/:collection"), get(html::collection_root))
        .route(&format!("{API_PREFIX}/:collection/search"), get(html::search_root))
        .route(
            &format!("{API_PREFIX}/:collection/search/overview"),
            get(handlers::overview_get).post(handlers::overview_post),
        )
        .route(
            &format!("{API_PREFIX}/:collection/search/result"),
            get(handlers::result_get).post(handlers::result_post),
        )
        .route(&format!("{API_PREFIX}/:collection/terms"), get(html::term_field_root))
        .route(
            &format!("{API_PREFIX}/:collection/terms/:field"),
            get(html::term_aggr_root),
        )
        .route(
            &format!("{API_PREFIX}/:collection/terms/:field/:aggr"),
            get(handlers::terms_get).post(handlers::terms_post),
        )
        .route(
            &format!("{API_PREFIX}/:collection/article/:id"),
            get(handlers::article),
        );

    if state.config.debug {
        log::warn!("Debug mode: raw query passthrough enabled");
        api = api.route(
            &format!("{API_PREFIX}/:collection/search/esdsl"),
            post(handlers::esdsl),
        );
    }

    api.layer(middleware::from_fn(api_version))
        .layer(cors())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([
            header::LINK,
            HeaderName::from_static(RESUME_HEADER),
            HeaderName::from_static(API_VERSION_HEADER),
        ])
}

async fn api_version(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().insert(
        HeaderName::from_static(API_VERSION_HEADER),
        HeaderValue::from_static(API_VERSION),
    );
    response
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    log::info!(
        "{} {} {} {}ms",
        method,
        path,
        response.status().as_u16(),
        start.elapsed().as_millis()
    );
    response
}
