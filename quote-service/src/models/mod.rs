pub mod quote;

pub use quote::{creation_date, QuotableQuote, Quote};
