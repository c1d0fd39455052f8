//! # b3-client
//!
//! HTTP client for the upstream sources of the B3 equities ETL.
//!
//! ## Features
//!
//! - **SGS**: Banco Central do Brasil time series (the CDI rate index)
//! - **Yahoo Finance**: daily chart bars and company asset profiles
//! - **Rate Limiting**: one shared `governor` limiter across every request
//! - **Retries**: optional exponential backoff on transport and 5xx failures
//!
//! ## Usage
//!
//! ```rust,no_run
//! use b3_client::MarketDataClient;
//! use b3_core::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let start = config.start_date;
//!     let client = MarketDataClient::new(config)?;
//!
//!     let bars = client.yahoo().daily_chart("PETR4.SA", start).await?;
//!     println!("{} bars", bars.timestamp.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All methods return `Result<T, b3_core::Error>`.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod endpoints;
pub mod transport;

pub use b3_core::{Config, Error, Result};
pub use client::MarketDataClient;
pub use endpoints::{sgs::SgsEndpoints, yahoo::YahooEndpoints};
