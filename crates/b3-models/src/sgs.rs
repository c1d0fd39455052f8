//! Banco Central do Brasil SGS series models

use crate::common::{parse_calendar_date, SGS_DATE_FORMAT};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single observation of an SGS time series
///
/// The API returns both fields as strings:
/// `{"data": "03/01/2022", "valor": "0.034749"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SgsObservation {
  /// Observation date in `dd/mm/YYYY`
  #[serde(rename = "data")]
  pub date: String,

  /// Observation value, decimal point separated
  #[serde(rename = "valor")]
  pub value: String,
}

impl SgsObservation {
  /// Parsed observation date
  pub fn calendar_date(&self) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(self.date.trim(), SGS_DATE_FORMAT)
      .ok()
      .or_else(|| parse_calendar_date(&self.date))
  }

  /// Parsed observation value
  pub fn numeric_value(&self) -> Option<f64> {
    self.value.trim().parse::<f64>().ok()
  }
}
