//! Quotable API client.
//!
//! Fetches random quotes from `GET {base_url}/quotes/random`.

use crate::config::QuotableConfig;
use crate::models::QuotableQuote;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use service_core::error::AppError;
use service_core::observability::inject_trace_headers;
use thiserror::Error;

/// Error type for quote source operations.
#[derive(Error, Debug)]
pub enum QuoteSourceError {
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl From<QuoteSourceError> for AppError {
    fn from(err: QuoteSourceError) -> Self {
        AppError::BadGateway(err.to_string())
    }
}

/// Parameters of a random-quote request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomQuoteQuery {
    pub limit: u32,
    /// Matches quotes carrying any of these tags.
    pub tags: Vec<String>,
}

impl RandomQuoteQuery {
    pub fn new(limit: u32, tags: Vec<String>) -> Self {
        Self { limit, tags }
    }

    /// Query string pairs. Quotable treats `|` in `tags` as OR.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("limit", self.limit.to_string())];
        if !self.tags.is_empty() {
            params.push(("tags", self.tags.join("|")));
        }
        params
    }
}

/// Trait for anything that can hand out random quotes.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn random_quotes(
        &self,
        query: &RandomQuoteQuery,
        request_id: Option<&str>,
    ) -> Result<Vec<QuotableQuote>, QuoteSourceError>;
}

/// HTTP client for the Quotable API.
#[derive(Clone)]
pub struct QuotableClient {
    client: Client,
    base_url: String,
}

impl QuotableClient {
    pub fn new(config: &QuotableConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn random_url(&self) -> String {
        format!("{}/quotes/random", self.base_url)
    }
}

#[async_trait]
impl QuoteSource for QuotableClient {
    async fn random_quotes(
        &self,
        query: &RandomQuoteQuery,
        request_id: Option<&str>,
    ) -> Result<Vec<QuotableQuote>, QuoteSourceError> {
        let mut headers = HeaderMap::new();
        inject_trace_headers(&mut headers, request_id);

        tracing::debug!(
            limit = query.limit,
            tags = ?query.tags,
            "Requesting random quotes from Quotable"
        );

        let response = self
            .client
            .get(self.random_url())
            .query(&query.to_params())
            .headers(headers)
            .send()
            .await
            .map_err(|e| QuoteSourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QuoteSourceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Vec<QuotableQuote>>()
            .await
            .map_err(|e| QuoteSourceError::Decode(e.to_string()))
    }
}
