#![allow(dead_code)]

use async_trait::async_trait;
use quote_service::config::{QuotableConfig, QuoteConfig, StoreConfig};
use quote_service::models::{QuotableQuote, Quote};
use quote_service::services::{
    QuotableClient, QuoteSource, QuoteSourceError, QuoteStore, RandomQuoteQuery,
};
use quote_service::startup::Application;
use serde_json::json;
use service_core::config::Config as CoreConfig;
use service_core::error::AppError;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const STORE_TIMEOUT: Duration = Duration::from_millis(200);
pub const SLOW_STORE_DELAY: Duration = Duration::from_secs(30);

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub quotable: MockServer,
    shutdown: oneshot::Sender<()>,
    server: JoinHandle<std::io::Result<()>>,
}

impl TestApp {
    pub async fn spawn(store: Arc<dyn QuoteStore>) -> Self {
        let quotable = MockServer::start().await;
        let config = test_config(&quotable.uri());

        let quote_source: Arc<dyn QuoteSource> = Arc::new(
            QuotableClient::new(&config.quotable).expect("Failed to build Quotable client"),
        );

        let app = Application::build_with(config, quote_source, store)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        let (shutdown, stop) = oneshot::channel::<()>();
        let server = tokio::spawn(app.run_until(async move {
            stop.await.ok();
        }));

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            quotable,
            shutdown,
            server,
        }
    }

    /// Signal shutdown and wait for the server to drain.
    pub async fn stop(self) -> std::io::Result<()> {
        self.shutdown.send(()).ok();
        self.server.await.expect("Server task panicked")
    }

    pub fn quote_url(&self) -> String {
        format!("{}/api/quote", self.address)
    }

    /// Serve `body` from the mocked random-quote endpoint.
    pub async fn mock_random_quotes(&self, status: u16, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/quotes/random"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.quotable)
            .await;
    }
}

pub fn test_config(quotable_uri: &str) -> QuoteConfig {
    QuoteConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            log_level: "debug".to_string(),
        },
        store: StoreConfig {
            host: "mongodb://localhost:27017".to_string(),
            database: "quotes_test".to_string(),
            container: "quotes".to_string(),
            timeout: STORE_TIMEOUT,
        },
        quotable: QuotableConfig {
            base_url: quotable_uri.to_string(),
            timeout: Duration::from_secs(5),
            tag: "technology".to_string(),
        },
    }
}

/// A Quotable-shaped payload with a single quote.
pub fn quotable_body() -> serde_json::Value {
    json!([{
        "_id": "W2Ca3sp8hI",
        "content": "Any sufficiently advanced technology is indistinguishable from magic.",
        "author": "Arthur C. Clarke",
        "authorSlug": "arthur-c-clarke",
        "length": 69,
        "tags": ["technology"],
        "dateAdded": "2019-10-21",
        "dateModified": "2023-04-14"
    }])
}

/// Records every upserted quote.
#[derive(Default)]
pub struct InMemoryStore {
    pub quotes: Mutex<Vec<Quote>>,
}

impl InMemoryStore {
    pub fn saved(&self) -> Vec<Quote> {
        self.quotes.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuoteStore for InMemoryStore {
    async fn upsert(&self, quote: &Quote) -> Result<(), AppError> {
        let mut quotes = self.quotes.lock().unwrap();
        quotes.retain(|q| !(q.id == quote.id && q.author_slug == quote.author_slug));
        quotes.push(quote.clone());
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Rejects every write, as with missing credentials or an unreachable host.
pub struct FailingStore;

#[async_trait]
impl QuoteStore for FailingStore {
    async fn upsert(&self, _quote: &Quote) -> Result<(), AppError> {
        Err(AppError::DatabaseError(anyhow::anyhow!(
            "credential acquisition failed"
        )))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Err(AppError::ServiceUnavailable)
    }
}

/// Completes writes after `delay`, recording them like [`InMemoryStore`].
pub struct DelayedStore {
    pub delay: Duration,
    pub inner: InMemoryStore,
}

impl DelayedStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: InMemoryStore::default(),
        }
    }
}

#[async_trait]
impl QuoteStore for DelayedStore {
    async fn upsert(&self, quote: &Quote) -> Result<(), AppError> {
        tokio::time::sleep(self.delay).await;
        self.inner.upsert(quote).await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Hands out the same quote for every request.
pub struct StaticSource(pub QuotableQuote);

#[async_trait]
impl QuoteSource for StaticSource {
    async fn random_quotes(
        &self,
        _query: &RandomQuoteQuery,
        _request_id: Option<&str>,
    ) -> Result<Vec<QuotableQuote>, QuoteSourceError> {
        Ok(vec![self.0.clone()])
    }
}

pub fn clarke_quote() -> QuotableQuote {
    serde_json::from_value(quotable_body()[0].clone()).expect("Invalid quote fixture")
}

/// Never finishes a write within the test timeout.
pub struct SlowStore;

#[async_trait]
impl QuoteStore for SlowStore {
    async fn upsert(&self, _quote: &Quote) -> Result<(), AppError> {
        tokio::time::sleep(SLOW_STORE_DELAY).await;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
