//! Elasticsearch-compatible HTTP backend.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use url::Url;

use crate::backend::SearchBackend;
use crate::error::{AppError, Result};
use crate::models::{Hit, SearchConfig};
use crate::utils::http::create_async_client;

/// Backend speaking the Elasticsearch REST API.
///
/// Hosts are tried in configured order; the next host is only tried when
/// the previous one could not be connected to.
#[derive(Clone)]
pub struct ElasticBackend {
    client: Client,
    hosts: Vec<Url>,
    username: Option<String>,
    password: Option<String>,
}

impl ElasticBackend {
    /// Create a backend from connection settings.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = create_async_client(config)?;
        Self::with_client(client, config)
    }

    /// Create a backend around an existing client.
    pub fn with_client(client: Client, config: &SearchConfig) -> Result<Self> {
        let hosts = config
            .hosts
            .iter()
            .map(|h| Url::parse(h.trim()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if hosts.is_empty() {
            return Err(AppError::config("No search hosts configured"));
        }
        if let Some(bad) = hosts.iter().find(|h| h.cannot_be_a_base()) {
            return Err(AppError::config(format!("Search host '{bad}' is not a base URL")));
        }

        Ok(Self {
            client,
            hosts,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Build `{host}/{segments...}` with each segment percent-encoded.
    fn endpoint(host: &Url, segments: &[&str]) -> Result<Url> {
        let mut url = host.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::config(format!("Search host '{host}' is not a base URL")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.username {
            Some(user) => request.basic_auth(user, self.password.as_deref()),
            None => request,
        }
    }

    /// Send a request to the first reachable host.
    async fn send<F>(&self, segments: &[&str], build: F) -> Result<Response>
    where
        F: Fn(&Client, Url) -> RequestBuilder,
    {
        let mut last_error = None;
        for host in &self.hosts {
            let url = Self::endpoint(host, segments)?;
            log::debug!("Search backend request: {}", url);
            match self.authorize(build(&self.client, url)).send().await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_connect() => {
                    log::warn!("Search host {} unreachable: {}", host, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(match last_error {
            Some(e) => AppError::UpstreamUnavailable(e.to_string()),
            None => AppError::UpstreamUnavailable("no search hosts".to_string()),
        })
    }
}

#[async_trait]
impl SearchBackend for ElasticBackend {
    async fn search_raw(&self, index: &str, body: &Value) -> Result<Value> {
        let response = self
            .send(&[index, "_search"], |client, url| client.post(url).json(body))
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let reason = error_reason(response).await;
        if status == StatusCode::BAD_REQUEST {
            Err(AppError::InvalidQuery(reason))
        } else {
            Err(AppError::upstream(status.as_u16(), reason))
        }
    }

    async fn get_document(&self, index: &str, id: &str) -> Result<Option<Hit>> {
        let response = self
            .send(&[index, "_doc", id], |client, url| client.get(url))
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::upstream(status.as_u16(), error_reason(response).await));
        }

        let raw: Value = response.json().await?;
        if raw.get("found").and_then(Value::as_bool) == Some(false) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(raw)?))
    }
}

/// Extract the engine's error reason from a failed response.
async fn error_reason(response: Response) -> String {
    let status = response.status();
    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => return format!("{status}: {e}"),
    };
    parse_error_reason(&text).unwrap_or_else(|| {
        let snippet: String = text.chars().take(200).collect();
        format!("{status}: {snippet}")
    })
}

fn parse_error_reason(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text).ok()?;
    let error = value.get("error")?;
    if let Some(reason) = error
        .get("root_cause")
        .and_then(|rc| rc.get(0))
        .and_then(|rc| rc.get("reason"))
        .and_then(Value::as_str)
    {
        return Some(reason.to_string());
    }
    error
        .get("reason")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .map(str::to_string)
}
