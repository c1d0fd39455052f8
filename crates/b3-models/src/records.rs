//! Clean output records produced by the transform stage

use crate::common::calendar_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row per traded security in the cleaned registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityRecord {
  /// Country the ticker trades in (registry side wins on conflicts)
  pub country: Option<String>,
  /// Company name
  pub name: Option<String>,
  /// Company full name
  pub full_name: Option<String>,
  /// ISIN code
  pub isin: Option<String>,
  /// Trading currency
  pub currency: Option<String>,
  /// Exchange ticker, unique within the table
  pub ticker: String,
  pub city: Option<String>,
  pub state: Option<String>,
  pub industry: Option<String>,
  pub sector: Option<String>,
}

/// One row per (ticker, date) in the unified price/return table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
  /// Trading day, serialized as `YYYY-MM-DD`
  #[serde(with = "calendar_date")]
  pub date: NaiveDate,
  pub ticker: String,
  /// Closing price, absent for the rate index
  pub close: Option<f64>,
  /// Traded volume, absent for the rate index
  pub volume: Option<f64>,
  /// Fractional daily return; absent on an equity's first observation
  pub daily_variation: Option<f64>,
  /// `1 + daily_variation`, or exactly 1 when the variation is absent
  pub daily_factor: f64,
  pub year: i32,
  pub month: u32,
  pub day: u32,
  /// Month-to-date accumulated return, in percent
  pub month_accumulated_variation: f64,
  /// Year-to-date accumulated return, in percent
  pub year_accumulated_variation: f64,
}
