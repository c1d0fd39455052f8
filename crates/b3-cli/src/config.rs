use anyhow::{Context, Result};
use b3_core::Config as CoreConfig;
use std::env;
use std::path::PathBuf;

/// Client settings plus the local paths and table names the CLI works with
#[derive(Debug, Clone)]
pub struct Config {
  pub api_config: CoreConfig,
  pub listing_csv: PathBuf,
  pub work_dir: PathBuf,
  pub output_dir: PathBuf,
  pub storage_dir: PathBuf,
  pub warehouse_dir: PathBuf,
  pub dataset: String,
  pub registry_table: String,
  pub prices_table: String,
  pub country: String,
  pub request_delay_ms: u64,
}

impl Config {
  pub fn from_env() -> Result<Self> {
    let api_config = CoreConfig::from_env().context("Failed to load client configuration")?;
    Self::from_lookup(api_config, |key| env::var(key).ok())
  }

  pub fn from_lookup<F>(api_config: CoreConfig, lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let path = |key: &str, default: &str| PathBuf::from(lookup(key).unwrap_or_else(|| default.to_string()));
    let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

    let request_delay_ms = lookup("B3_REQUEST_DELAY_MS")
      .unwrap_or_else(|| "0".to_string())
      .parse()
      .context("B3_REQUEST_DELAY_MS must be a whole number of milliseconds")?;

    Ok(Self {
      api_config,
      listing_csv: path("B3_LISTING_CSV", "./data/stocks.csv"),
      work_dir: path("B3_WORK_DIR", "./data/raw"),
      output_dir: path("B3_OUTPUT_DIR", "./data/clean"),
      storage_dir: path("B3_STORAGE_DIR", "./data/storage"),
      warehouse_dir: path("B3_WAREHOUSE_DIR", "./data/warehouse"),
      dataset: text("B3_DATASET", "market"),
      registry_table: text("B3_REGISTRY_TABLE", "registry"),
      prices_table: text("B3_PRICES_TABLE", "prices"),
      country: text("B3_COUNTRY", b3_core::DEFAULT_COUNTRY),
      request_delay_ms,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  #[test]
  fn test_defaults() {
    let config = Config::from_lookup(CoreConfig::default(), |_| None).unwrap();
    assert_eq!(config.listing_csv, PathBuf::from("./data/stocks.csv"));
    assert_eq!(config.warehouse_dir, PathBuf::from("./data/warehouse"));
    assert_eq!(config.dataset, "market");
    assert_eq!(config.country, "brazil");
    assert_eq!(config.request_delay_ms, 0);
  }

  #[test]
  fn test_overrides() {
    let vars: HashMap<&str, &str> = HashMap::from([
      ("B3_WORK_DIR", "/tmp/raw"),
      ("B3_PRICES_TABLE", "b3_prices"),
      ("B3_REQUEST_DELAY_MS", "250"),
    ]);
    let config =
      Config::from_lookup(CoreConfig::default(), |key| vars.get(key).map(|v| v.to_string())).unwrap();

    assert_eq!(config.work_dir, PathBuf::from("/tmp/raw"));
    assert_eq!(config.prices_table, "b3_prices");
    assert_eq!(config.request_delay_ms, 250);
  }

  #[test]
  fn test_bad_delay_is_rejected() {
    let result = Config::from_lookup(CoreConfig::default(), |key| {
      (key == "B3_REQUEST_DELAY_MS").then(|| "soon".to_string())
    });
    assert!(result.is_err());
  }
}
