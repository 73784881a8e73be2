use crate::config::QuoteConfig;
use crate::handlers;
use crate::services::{MongoQuoteStore, QuotableClient, QuoteSource, QuoteStore, RandomQuoteQuery};
use axum::{
    routing::{any, get},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: QuoteConfig,
    pub quote_source: Arc<dyn QuoteSource>,
    pub store: Arc<dyn QuoteStore>,
    /// Upstream request issued for every quote of the day.
    pub quote_query: Arc<RandomQuoteQuery>,
}

impl AppState {
    pub fn new(
        config: QuoteConfig,
        quote_source: Arc<dyn QuoteSource>,
        store: Arc<dyn QuoteStore>,
    ) -> Self {
        let quote_query = Arc::new(RandomQuoteQuery::new(1, vec![config.quotable.tag.clone()]));

        Self {
            config,
            quote_source,
            store,
            quote_query,
        }
    }
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    state: AppState,
}

impl Application {
    /// Wires the Quotable client and the MongoDB store from `config`.
    pub async fn build(config: QuoteConfig) -> Result<Self, AppError> {
        let quote_source: Arc<dyn QuoteSource> = Arc::new(QuotableClient::new(&config.quotable)?);
        let store: Arc<dyn QuoteStore> = Arc::new(MongoQuoteStore::from_config(&config.store));

        tracing::info!(
            quotable = %config.quotable.base_url,
            database = %config.store.database,
            container = %config.store.container,
            "Initialized quote collaborators"
        );

        Self::build_with(config, quote_source, store).await
    }

    pub async fn build_with(
        config: QuoteConfig,
        quote_source: Arc<dyn QuoteSource>,
        store: Arc<dyn QuoteStore>,
    ) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let state = AppState::new(config, quote_source, store);

        let router = router(state.clone());

        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("About to listen on port {}. Go to http://127.0.0.1:{}/api/quote", port, port);

        Ok(Self {
            port,
            listener,
            router,
            state,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serves until `shutdown` resolves, then stops accepting connections and
    /// lets in-flight requests finish.
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Service shutdown complete");
        Ok(())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/api/quote", any(handlers::quote_of_the_day))
        .fallback(handlers::not_found)
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{QuotableConfig, StoreConfig, STORE_TIMEOUT};
    use service_core::config::Config as CoreConfig;
    use std::time::Duration;

    fn config(tag: &str) -> QuoteConfig {
        QuoteConfig {
            common: CoreConfig {
                port: 0,
                log_level: "info".to_string(),
            },
            store: StoreConfig {
                host: "mongodb://localhost:27017".to_string(),
                database: "quotes".to_string(),
                container: "quotes".to_string(),
                timeout: STORE_TIMEOUT,
            },
            quotable: QuotableConfig {
                base_url: "http://127.0.0.1:9".to_string(),
                timeout: Duration::from_secs(1),
                tag: tag.to_string(),
            },
        }
    }

    fn state(tag: &str) -> AppState {
        let config = config(tag);
        let source = Arc::new(QuotableClient::new(&config.quotable).unwrap());
        let store = Arc::new(MongoQuoteStore::from_config(&config.store));
        AppState::new(config, source, store)
    }

    #[test]
    fn quote_query_is_built_once_from_configured_tag() {
        let state = state("technology");
        assert_eq!(
            *state.quote_query,
            RandomQuoteQuery::new(1, vec!["technology".to_string()])
        );

        let clone = state.clone();
        assert!(Arc::ptr_eq(&state.quote_query, &clone.quote_query));
    }

    #[test]
    fn custom_tag_flows_into_query() {
        let state = state("science");
        assert_eq!(state.quote_query.tags, vec!["science".to_string()]);
        assert_eq!(state.quote_query.limit, 1);
    }
}
