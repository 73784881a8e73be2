pub mod database;
pub mod metrics;
pub mod quotable;

pub use database::{ClientProvider, MongoQuoteStore, QuoteStore, UriClientProvider};
pub use self::metrics::{get_metrics, init_metrics};
pub use quotable::{QuotableClient, QuoteSource, QuoteSourceError, RandomQuoteQuery};
