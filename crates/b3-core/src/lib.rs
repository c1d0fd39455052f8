pub mod config;
pub mod error;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::Config;
pub use error::{Error, Result};

/// Upstream endpoints the extractor talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceType {
  /// Banco Central do Brasil SGS time series (rate index)
  SgsSeries,
  /// Yahoo Finance daily chart (price history)
  YahooChart,
  /// Yahoo Finance quote summary (asset profile)
  YahooQuoteSummary,
}

impl std::fmt::Display for SourceType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SourceType::SgsSeries => write!(f, "SGS_SERIES"),
      SourceType::YahooChart => write!(f, "YAHOO_CHART"),
      SourceType::YahooQuoteSummary => write!(f, "YAHOO_QUOTE_SUMMARY"),
    }
  }
}

/// Base URL for the Banco Central do Brasil SGS API
pub const SGS_BASE_URL: &str = "https://api.bcb.gov.br";

/// Base URL for the Yahoo Finance query API
pub const YAHOO_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// SGS series code for the daily CDI rate
pub const DEFAULT_RATE_SERIES_CODE: u32 = 12;

/// Ticker used for the rate index inside the price table
pub const RATE_INDEX_TICKER: &str = "CDI";

/// Suffix Yahoo uses for tickers listed on B3
pub const EXCHANGE_SUFFIX: &str = ".SA";

/// Country filter applied to the equity listing
pub const DEFAULT_COUNTRY: &str = "brazil";

/// First trading day pulled by default
pub const DEFAULT_START_DATE: &str = "2022-01-03";

/// Requests per minute across all upstream sources
pub const DEFAULT_RATE_LIMIT: u32 = 60;
