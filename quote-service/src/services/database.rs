use crate::config::StoreConfig;
use crate::models::Quote;
use async_trait::async_trait;
use mongodb::{
    bson::{doc, Document},
    options::ReplaceOptions,
    Client as MongoClient, Collection,
};
use service_core::error::AppError;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Supplies an authenticated database client.
///
/// Credential acquisition lives behind this seam so the store never deals
/// with connection strings or identity providers directly.
#[async_trait]
pub trait ClientProvider: Send + Sync {
    async fn client(&self) -> Result<MongoClient, AppError>;
}

/// Builds a client from a connection URI on first use and caches it.
///
/// A failed build is returned to the caller and attempted again on the next
/// request.
pub struct UriClientProvider {
    uri: String,
    client: OnceCell<MongoClient>,
}

impl UriClientProvider {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            client: OnceCell::new(),
        }
    }
}

#[async_trait]
impl ClientProvider for UriClientProvider {
    async fn client(&self) -> Result<MongoClient, AppError> {
        let client = self
            .client
            .get_or_try_init(|| async {
                tracing::info!("Creating MongoDB client");
                MongoClient::with_uri_str(&self.uri).await.map_err(|e| {
                    tracing::error!("Failed to create MongoDB client: {}", e);
                    AppError::from(e)
                })
            })
            .await?;
        Ok(client.clone())
    }
}

/// Persistence for fetched quotes.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Inserts `quote`, or overwrites the record with the same id and
    /// partition key.
    async fn upsert(&self, quote: &Quote) -> Result<(), AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

/// Filter addressing a quote by id within its author-slug partition.
pub fn partition_filter(quote: &Quote) -> Document {
    doc! { "_id": quote.id.as_str(), "authorSlug": quote.partition_key() }
}

#[derive(Clone)]
pub struct MongoQuoteStore {
    provider: Arc<dyn ClientProvider>,
    database: String,
    container: String,
}

impl MongoQuoteStore {
    pub fn new(provider: Arc<dyn ClientProvider>, database: &str, container: &str) -> Self {
        Self {
            provider,
            database: database.to_string(),
            container: container.to_string(),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(
            Arc::new(UriClientProvider::new(config.host.clone())),
            &config.database,
            &config.container,
        )
    }

    async fn quotes(&self) -> Result<Collection<Quote>, AppError> {
        let client = self.provider.client().await?;
        Ok(client.database(&self.database).collection(&self.container))
    }
}

#[async_trait]
impl QuoteStore for MongoQuoteStore {
    async fn upsert(&self, quote: &Quote) -> Result<(), AppError> {
        let options = ReplaceOptions::builder().upsert(true).build();

        self.quotes()
            .await?
            .replace_one(partition_filter(quote), quote, options)
            .await
            .map_err(|e| {
                tracing::error!("Failed to upsert quote: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        tracing::debug!(
            quote_id = %quote.id,
            partition_key = %quote.partition_key(),
            "Quote upserted"
        );
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.provider
            .client()
            .await?
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}
