//! Yahoo Finance chart and quote-summary response models

use serde::{Deserialize, Serialize};

/// Error object carried inside Yahoo response envelopes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YahooError {
  pub code: String,
  pub description: String,
}

/// `/v8/finance/chart/{ticker}` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartResponse {
  pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartEnvelope {
  pub result: Option<Vec<ChartResult>>,
  pub error: Option<YahooError>,
}

/// Daily bars for one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartResult {
  pub meta: ChartMeta,

  /// Bar open times, unix seconds (UTC). Missing when the range is empty.
  #[serde(default)]
  pub timestamp: Vec<i64>,

  pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartMeta {
  pub symbol: String,

  #[serde(default)]
  pub currency: Option<String>,

  /// Exchange offset from UTC, seconds
  #[serde(default)]
  pub gmtoffset: i64,

  #[serde(rename = "exchangeTimezoneName", default)]
  pub exchange_timezone_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartIndicators {
  #[serde(default)]
  pub quote: Vec<QuoteIndicator>,
}

/// Per-bar series aligned with [`ChartResult::timestamp`]; gaps are `null`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteIndicator {
  #[serde(default)]
  pub close: Vec<Option<f64>>,

  #[serde(default)]
  pub volume: Vec<Option<f64>>,
}

/// `/v10/finance/quoteSummary/{ticker}?modules=assetProfile` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSummaryResponse {
  #[serde(rename = "quoteSummary")]
  pub quote_summary: QuoteSummaryEnvelope,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSummaryEnvelope {
  pub result: Option<Vec<QuoteSummaryResult>>,
  pub error: Option<YahooError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSummaryResult {
  #[serde(rename = "assetProfile")]
  pub asset_profile: Option<AssetProfile>,
}

/// Descriptive company profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetProfile {
  pub city: Option<String>,
  pub state: Option<String>,
  pub country: Option<String>,
  pub industry: Option<String>,
  pub sector: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_deserialize_chart() {
    let json = r#"{
      "chart": {
        "result": [{
          "meta": {"symbol": "PETR4.SA", "currency": "BRL", "gmtoffset": -10800,
                   "exchangeTimezoneName": "America/Sao_Paulo"},
          "timestamp": [1641211200, 1641297600],
          "indicators": {"quote": [{"close": [29.9, null], "volume": [1000, null],
                                    "open": [29.0, 30.1]}]}
        }],
        "error": null
      }
    }"#;
    let response: ChartResponse = serde_json::from_str(json).unwrap();
    let result = &response.chart.result.unwrap()[0];

    assert_eq!(result.meta.gmtoffset, -10800);
    assert_eq!(result.timestamp.len(), 2);
    assert_eq!(result.indicators.quote[0].close, vec![Some(29.9), None]);
    assert_eq!(result.indicators.quote[0].volume, vec![Some(1000.0), None]);
  }

  #[test]
  fn test_deserialize_chart_error() {
    let json = r#"{"chart": {"result": null,
      "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
    let response: ChartResponse = serde_json::from_str(json).unwrap();

    assert!(response.chart.result.is_none());
    assert_eq!(response.chart.error.unwrap().code, "Not Found");
  }

  #[test]
  fn test_deserialize_asset_profile() {
    let json = r#"{"quoteSummary": {"result": [{"assetProfile": {
      "address1": "Avenida Republica do Chile, 65", "city": "Rio De Janeiro", "state": "RJ",
      "country": "Brazil", "industry": "Oil & Gas Integrated", "sector": "Energy"}}],
      "error": null}}"#;
    let response: QuoteSummaryResponse = serde_json::from_str(json).unwrap();
    let profile = response.quote_summary.result.unwrap()[0].asset_profile.clone().unwrap();

    assert_eq!(profile.city.as_deref(), Some("Rio De Janeiro"));
    assert_eq!(profile.sector.as_deref(), Some("Energy"));
  }
}
