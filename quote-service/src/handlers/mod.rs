pub mod health;
pub mod quote;

pub use health::{health_check, metrics_endpoint, not_found, readiness_check};
pub use quote::quote_of_the_day;
