//! Raw extraction tables
//!
//! One struct per intermediate CSV file written by the extract stage and
//! read back by the transform stage. Column names match the file headers.

use crate::common::calendar_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A row of the equity listing file the registry is built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRow {
  pub country: String,
  pub name: Option<String>,
  pub full_name: Option<String>,
  pub isin: Option<String>,
  pub currency: Option<String>,
  pub symbol: String,
}

/// Raw registry row (`df_get_stocks.csv`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryRow {
  pub country: Option<String>,
  pub name: Option<String>,
  pub full_name: Option<String>,
  pub isin: Option<String>,
  pub currency: Option<String>,
  pub ticker: String,
}

/// Raw per-ticker descriptive metadata (`df_get_stocks_info.csv`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerInfoRow {
  pub city: Option<String>,
  pub state: Option<String>,
  pub country: Option<String>,
  pub industry: Option<String>,
  pub sector: Option<String>,
  pub ticker: String,
}

/// Raw daily price row (`df_get_stocks_historic.csv`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryRow {
  #[serde(with = "calendar_date")]
  pub date: NaiveDate,
  pub ticker: String,
  pub close: Option<f64>,
  pub volume: Option<f64>,
}

/// Raw rate-index row (`df_get_cdi.csv`)
///
/// `daily_variation` is a fractional daily return (0.0004 is 0.04%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateIndexRow {
  #[serde(with = "calendar_date")]
  pub date: NaiveDate,
  pub ticker: String,
  pub daily_variation: Option<f64>,
}

impl From<ListingRow> for RegistryRow {
  fn from(row: ListingRow) -> Self {
    RegistryRow {
      country: Some(row.country),
      name: row.name,
      full_name: row.full_name,
      isin: row.isin,
      currency: row.currency,
      ticker: row.symbol,
    }
  }
}
