use crate::models::{QuotableQuote, Quote};
use crate::services::metrics::{record_fetch, record_store};
use crate::services::{QuoteSource, QuoteStore, RandomQuoteQuery};
use crate::startup::AppState;
use axum::{extract::State, http::HeaderMap, http::StatusCode, response::IntoResponse, Json};
use service_core::error::AppError;
use service_core::observability::extract_request_id;
use std::time::Duration;

/// `ANY /api/quote`
///
/// Fetches one random quote, stores a dated copy on a best-effort basis and
/// returns the quote exactly as fetched. Nothing from the request besides
/// the correlation ID is read.
pub async fn quote_of_the_day(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let request_id = extract_request_id(&headers);
    let fetched = fetch_quote(
        state.quote_source.as_ref(),
        &state.quote_query,
        request_id.as_deref(),
    )
    .await?;

    tracing::info!(
        quote_id = %fetched.id,
        "Quote of the day: {} by {}",
        fetched.content,
        fetched.author
    );

    let quote = Quote::load(&fetched);
    if let Err(e) = store_quote(state.store.as_ref(), &quote, state.config.store.timeout).await {
        tracing::warn!(
            quote_id = %quote.id,
            partition_key = %quote.partition_key(),
            "Error writing quote to database: {}",
            e
        );
    }

    Ok((StatusCode::OK, Json(fetched)))
}

/// Returns the first quote the source hands back.
///
/// An upstream failure or an empty result is a 502; there is no quote to
/// store or return in either case.
pub async fn fetch_quote(
    source: &dyn QuoteSource,
    query: &RandomQuoteQuery,
    request_id: Option<&str>,
) -> Result<QuotableQuote, AppError> {
    let quotes = source.random_quotes(query, request_id).await.map_err(|e| {
        tracing::warn!("quote fetch failed: {}", e);
        record_fetch("error");
        AppError::from(e)
    })?;

    match quotes.into_iter().next() {
        Some(quote) => {
            record_fetch("ok");
            Ok(quote)
        }
        None => {
            tracing::warn!(tags = ?query.tags, "quote fetch failed: no quotes returned");
            record_fetch("empty");
            Err(AppError::BadGateway(
                "quote source returned no quotes".to_string(),
            ))
        }
    }
}

/// Upserts `quote`, giving up after `timeout`.
pub async fn store_quote(
    store: &dyn QuoteStore,
    quote: &Quote,
    timeout: Duration,
) -> Result<(), AppError> {
    let result = match tokio::time::timeout(timeout, store.upsert(quote)).await {
        Ok(result) => result,
        Err(_) => Err(AppError::DatabaseError(anyhow::anyhow!(
            "upsert timed out after {:?}",
            timeout
        ))),
    };

    record_store(if result.is_ok() { "ok" } else { "error" });
    result
}
