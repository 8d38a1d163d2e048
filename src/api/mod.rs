//! HTTP client for the news backend.
//!
//! Three read-only endpoints: `/get_articles`, `/filter-options` and `/data`.
//! Everything above this layer talks to the [`NewsApi`] trait so the fetcher
//! and UI can run against a fake backend in tests.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::model::types::{FilterOptions, PageResult, WordRecord};

pub const ARTICLES_ENDPOINT: &str = "/get_articles";
pub const FILTER_OPTIONS_ENDPOINT: &str = "/filter-options";
pub const WORD_DATA_ENDPOINT: &str = "/data";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid API base URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request to {endpoint} failed: {source}")]
    Network {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} answered with HTTP {status}")]
    Status { endpoint: &'static str, status: u16 },
    #[error("could not decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn endpoint(&self) -> Option<&'static str> {
        match self {
            ApiError::InvalidUrl { .. } => None,
            ApiError::Network { endpoint, .. }
            | ApiError::Status { endpoint, .. }
            | ApiError::Decode { endpoint, .. } => Some(endpoint),
        }
    }
}

/// Parameters of one `/get_articles` call. Every field is always sent;
/// empty strings mean "no filter".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticleQuery {
    pub topic: String,
    pub source: String,
    pub keyword: String,
    pub start_date: String,
    pub end_date: String,
    pub page: u32,
}

impl ArticleQuery {
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("topic", self.topic.clone()),
            ("source", self.source.clone()),
            ("keyword", self.keyword.clone()),
            ("start_date", self.start_date.clone()),
            ("end_date", self.end_date.clone()),
            ("page", self.page.to_string()),
        ]
    }
}

/// Parameters of one `/data` call. `"all"` and empty values are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordQuery {
    pub source: String,
    pub topic: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl WordQuery {
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &'static str, value: &str| {
            let value = value.trim();
            if !value.is_empty() && value != crate::filters::ALL {
                pairs.push((key, value.to_string()));
            }
        };
        push("source", &self.source);
        push("topic", &self.topic);
        push("start_date", self.start_date.as_deref().unwrap_or_default());
        push("end_date", self.end_date.as_deref().unwrap_or_default());
        pairs
    }
}

/// Backend operations the client needs.
pub trait NewsApi: Send + Sync + 'static {
    fn get_articles(
        &self,
        query: &ArticleQuery,
    ) -> impl Future<Output = Result<PageResult, ApiError>> + Send;

    fn filter_options(&self) -> impl Future<Output = Result<FilterOptions, ApiError>> + Send;

    fn word_data(
        &self,
        query: &WordQuery,
    ) -> impl Future<Output = Result<Vec<WordRecord>, ApiError>> + Send;
}

/// `reqwest`-backed implementation.
#[derive(Clone, Debug)]
pub struct HttpNewsApi {
    client: Client,
    base: Url,
}

impl HttpNewsApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base = parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("earth-news/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ApiError::Network {
                endpoint: "client",
                source,
            })?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint_url(&self, endpoint: &'static str) -> Result<Url, ApiError> {
        self.base
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl {
                url: format!("{}{endpoint}", self.base),
                reason: e.to_string(),
            })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        pairs: &[(&'static str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint_url(endpoint)?;
        tracing::debug!(%url, params = pairs.len(), "api_request");
        let response = self
            .client
            .get(url)
            .query(pairs)
            .send()
            .await
            .map_err(|source| ApiError::Network { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ApiError::Network { endpoint, source })?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode { endpoint, source })
    }
}

/// Accepts `http(s)://host[:port][/prefix]`. A trailing slash is added so
/// endpoint joins keep the prefix.
fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|e| ApiError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme `{}`", url.scheme()),
        });
    }
    Ok(url)
}

impl NewsApi for HttpNewsApi {
    async fn get_articles(&self, query: &ArticleQuery) -> Result<PageResult, ApiError> {
        self.get_json(ARTICLES_ENDPOINT, &query.pairs()).await
    }

    async fn filter_options(&self) -> Result<FilterOptions, ApiError> {
        self.get_json(FILTER_OPTIONS_ENDPOINT, &[]).await
    }

    async fn word_data(&self, query: &WordQuery) -> Result<Vec<WordRecord>, ApiError> {
        self.get_json(WORD_DATA_ENDPOINT, &query.pairs()).await
    }
}
