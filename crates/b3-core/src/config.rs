//! Configuration management for the upstream data sources

use crate::error::{Error, Result};
use chrono::NaiveDate;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

/// Main configuration struct for the extraction clients
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
  /// Base URL for the SGS rate series API
  pub sgs_base_url: String,

  /// Base URL for the Yahoo Finance query API
  pub yahoo_base_url: String,

  /// SGS series code for the rate index
  pub rate_series_code: u32,

  /// First day of history to request
  pub start_date: NaiveDate,

  /// Request rate limit (requests per minute)
  pub rate_limit: u32,

  /// Request timeout in seconds
  pub timeout_secs: u64,

  /// Maximum retries for failed requests
  pub max_retries: u32,
}

impl Config {
  /// Load configuration from environment variables
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|key| env::var(key).ok())
  }

  /// Build configuration from an arbitrary key lookup
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let sgs_base_url = lookup("B3_SGS_BASE_URL").unwrap_or_else(|| crate::SGS_BASE_URL.to_string());
    Url::parse(&sgs_base_url)
      .map_err(|e| Error::Config(format!("Invalid B3_SGS_BASE_URL: {}", e)))?;

    let yahoo_base_url =
      lookup("B3_YAHOO_BASE_URL").unwrap_or_else(|| crate::YAHOO_BASE_URL.to_string());
    Url::parse(&yahoo_base_url)
      .map_err(|e| Error::Config(format!("Invalid B3_YAHOO_BASE_URL: {}", e)))?;

    let rate_series_code = lookup("B3_RATE_SERIES_CODE")
      .unwrap_or_else(|| crate::DEFAULT_RATE_SERIES_CODE.to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid B3_RATE_SERIES_CODE".to_string()))?;

    let start_date = NaiveDate::parse_from_str(
      &lookup("B3_START_DATE").unwrap_or_else(|| crate::DEFAULT_START_DATE.to_string()),
      "%Y-%m-%d",
    )
    .map_err(|_| Error::Config("Invalid B3_START_DATE, expected YYYY-MM-DD".to_string()))?;

    let rate_limit = lookup("B3_RATE_LIMIT")
      .unwrap_or_else(|| crate::DEFAULT_RATE_LIMIT.to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid B3_RATE_LIMIT".to_string()))?;

    let timeout_secs = lookup("B3_TIMEOUT_SECS")
      .unwrap_or_else(|| "30".to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid B3_TIMEOUT_SECS".to_string()))?;

    let max_retries = lookup("B3_MAX_RETRIES")
      .unwrap_or_else(|| "0".to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid B3_MAX_RETRIES".to_string()))?;

    Ok(Config {
      sgs_base_url,
      yahoo_base_url,
      rate_series_code,
      start_date,
      rate_limit,
      timeout_secs,
      max_retries,
    })
  }

  /// Create a config pointing both sources at one base URL (for testing)
  pub fn with_base_url(base_url: &str) -> Self {
    Config {
      sgs_base_url: base_url.to_string(),
      yahoo_base_url: base_url.to_string(),
      rate_series_code: crate::DEFAULT_RATE_SERIES_CODE,
      start_date: NaiveDate::from_ymd_opt(2022, 1, 3).unwrap_or_default(),
      rate_limit: 6000,
      timeout_secs: 5,
      max_retries: 0,
    }
  }
}

impl Default for Config {
  fn default() -> Self {
    Config {
      sgs_base_url: crate::SGS_BASE_URL.to_string(),
      yahoo_base_url: crate::YAHOO_BASE_URL.to_string(),
      rate_series_code: crate::DEFAULT_RATE_SERIES_CODE,
      start_date: NaiveDate::from_ymd_opt(2022, 1, 3).unwrap_or_default(),
      rate_limit: crate::DEFAULT_RATE_LIMIT,
      timeout_secs: 30,
      max_retries: 0,
    }
  }
}
