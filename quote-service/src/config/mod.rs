use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

/// Upper bound on acquiring a database client and writing one quote.
pub const STORE_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub store: StoreConfig,
    pub quotable: QuotableConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Connection string of the document database.
    pub host: String,
    pub database: String,
    pub container: String,
    #[serde(skip, default = "default_store_timeout")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuotableConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Tag filter sent with every random-quote request.
    pub tag: String,
}

fn default_store_timeout() -> Duration {
    STORE_TIMEOUT
}

impl QuoteConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Builds the service settings on top of `common`, reading each variable
    /// through `lookup`.
    pub fn from_lookup<F>(mut common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_prod = lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()) == "prod";
        let get = |key: &str, default: Option<&str>| get_env(&lookup, key, default, is_prod);

        // Azure-style custom handler hosts hand the port over in this variable.
        if let Some(port) = lookup("FUNCTIONS_CUSTOMHANDLER_PORT") {
            common.port = parse_number(&port, "FUNCTIONS_CUSTOMHANDLER_PORT")?;
        }

        let store = StoreConfig {
            host: get("COSMOS_HOST", Some("mongodb://localhost:27017"))?,
            database: get("COSMOS_DATABASE", Some("quotes"))?,
            container: get("COSMOS_CONTAINER", Some("quotes"))?,
            timeout: STORE_TIMEOUT,
        };

        let quotable_timeout: u64 =
            parse_number(&get("QUOTABLE_TIMEOUT_SECS", Some("10"))?, "QUOTABLE_TIMEOUT_SECS")?;

        Ok(QuoteConfig {
            common,
            store,
            quotable: QuotableConfig {
                base_url: get("QUOTABLE_BASE_URL", Some("https://api.quotable.io"))?,
                timeout: Duration::from_secs(quotable_timeout),
                tag: get("QUOTE_TAG", Some("technology"))?,
            },
        })
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, AppError> {
    value.trim().parse().map_err(|_| {
        AppError::ConfigError(anyhow::anyhow!(
            "{} must be a non-negative integer, got '{}'",
            key,
            value
        ))
    })
}

fn get_env<F>(lookup: &F, key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => Ok(val),
        None => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
