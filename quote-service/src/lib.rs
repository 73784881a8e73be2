//! Quote Service - fetches a quote of the day, keeps a copy, returns it.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
