//! Yahoo Finance chart and quote-summary endpoints
//!
//! - `GET /v8/finance/chart/{ticker}?period1=..&period2=..&interval=1d`
//! - `GET /v10/finance/quoteSummary/{ticker}?modules=assetProfile`

use super::{endpoint_url, impl_endpoint_base, EndpointBase, SharedRateLimiter};
use crate::transport::Transport;
use b3_core::{Error, Result, SourceType};
use b3_models::yahoo::{AssetProfile, ChartResponse, ChartResult, QuoteSummaryResponse};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Endpoints for Yahoo Finance price history and company profiles
pub struct YahooEndpoints {
  transport: Arc<Transport>,
  rate_limiter: SharedRateLimiter,
  base_url: String,
}

impl_endpoint_base!(YahooEndpoints);

impl YahooEndpoints {
  /// Create a new Yahoo endpoints instance
  pub fn new(transport: Arc<Transport>, rate_limiter: SharedRateLimiter, base_url: String) -> Self {
    Self { transport, rate_limiter, base_url }
  }

  /// Daily bars for `ticker` from `start` (inclusive) until now
  #[instrument(skip(self))]
  pub async fn daily_chart(&self, ticker: &str, start: NaiveDate) -> Result<ChartResult> {
    self.wait_for_rate_limit().await?;

    let period1 = start.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp()).unwrap_or(0);
    let period2 = Utc::now().timestamp();

    let mut url = endpoint_url(&self.base_url, &["v8", "finance", "chart", ticker])?;
    url
      .query_pairs_mut()
      .append_pair("period1", &period1.to_string())
      .append_pair("period2", &period2.to_string())
      .append_pair("interval", "1d")
      .append_pair("events", "history");

    let response: ChartResponse = self.transport().get_json(SourceType::YahooChart, url).await?;

    if let Some(err) = response.chart.error {
      return Err(Error::Api(format!("{}: {}", err.code, err.description)));
    }

    let result = response
      .chart
      .result
      .and_then(|results| results.into_iter().next())
      .ok_or_else(|| Error::NoData(ticker.to_string()))?;

    if result.timestamp.is_empty() {
      return Err(Error::NoData(ticker.to_string()));
    }

    debug!("Received {} daily bars for {}", result.timestamp.len(), ticker);
    Ok(result)
  }

  /// Company profile (city, state, country, industry, sector) for `ticker`
  #[instrument(skip(self))]
  pub async fn asset_profile(&self, ticker: &str) -> Result<AssetProfile> {
    self.wait_for_rate_limit().await?;

    let mut url = endpoint_url(&self.base_url, &["v10", "finance", "quoteSummary", ticker])?;
    url.query_pairs_mut().append_pair("modules", "assetProfile");

    let response: QuoteSummaryResponse =
      self.transport().get_json(SourceType::YahooQuoteSummary, url).await?;

    if let Some(err) = response.quote_summary.error {
      return Err(Error::Api(format!("{}: {}", err.code, err.description)));
    }

    response
      .quote_summary
      .result
      .and_then(|results| results.into_iter().next())
      .and_then(|result| result.asset_profile)
      .ok_or_else(|| Error::MissingField(format!("assetProfile for {}", ticker)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use b3_core::Config;
  use governor::{Quota, RateLimiter};
  use std::num::NonZeroU32;
  use wiremock::matchers::{method, path, query_param};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn endpoints(base_url: &str) -> YahooEndpoints {
    let config = Config::with_base_url(base_url);
    let transport = Arc::new(Transport::new(&config).unwrap());
    let limiter = Arc::new(RateLimiter::direct(Quota::per_minute(NonZeroU32::new(600).unwrap())));
    YahooEndpoints::new(transport, limiter, base_url.to_string())
  }

  #[tokio::test]
  async fn test_daily_chart() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/v8/finance/chart/PETR4.SA"))
      .and(query_param("interval", "1d"))
      .and(query_param("period1", "1641168000"))
      .respond_with(ResponseTemplate::new(200).set_body_string(
        r#"{"chart": {"result": [{"meta": {"symbol": "PETR4.SA", "gmtoffset": -10800},
            "timestamp": [1641211200], "indicators": {"quote": [{"close": [29.9], "volume": [100]}]}}],
            "error": null}}"#,
      ))
      .mount(&server)
      .await;

    let chart = endpoints(&server.uri())
      .daily_chart("PETR4.SA", NaiveDate::from_ymd_opt(2022, 1, 3).unwrap())
      .await
      .unwrap();

    assert_eq!(chart.meta.symbol, "PETR4.SA");
    assert_eq!(chart.indicators.quote[0].close, vec![Some(29.9)]);
  }

  #[tokio::test]
  async fn test_daily_chart_without_bars_is_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_string(
        r#"{"chart": {"result": [{"meta": {"symbol": "OLD3.SA"}, "indicators": {"quote": [{}]}}],
            "error": null}}"#,
      ))
      .mount(&server)
      .await;

    let result = endpoints(&server.uri())
      .daily_chart("OLD3.SA", NaiveDate::from_ymd_opt(2022, 1, 3).unwrap())
      .await;

    assert!(matches!(result, Err(Error::NoData(t)) if t == "OLD3.SA"));
  }

  #[tokio::test]
  async fn test_asset_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/v10/finance/quoteSummary/VALE3.SA"))
      .and(query_param("modules", "assetProfile"))
      .respond_with(ResponseTemplate::new(200).set_body_string(
        r#"{"quoteSummary": {"result": [{"assetProfile": {"city": "Rio De Janeiro", "state": "RJ",
            "country": "Brazil", "industry": "Other Industrial Metals & Mining",
            "sector": "Basic Materials"}}], "error": null}}"#,
      ))
      .mount(&server)
      .await;

    let profile = endpoints(&server.uri()).asset_profile("VALE3.SA").await.unwrap();
    assert_eq!(profile.state.as_deref(), Some("RJ"));
    assert_eq!(profile.sector.as_deref(), Some("Basic Materials"));
  }

  #[tokio::test]
  async fn test_asset_profile_missing_module() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_string(r#"{"quoteSummary": {"result": [{}], "error": null}}"#),
      )
      .mount(&server)
      .await;

    let result = endpoints(&server.uri()).asset_profile("XPTO3.SA").await;
    assert!(matches!(result, Err(Error::MissingField(_))));
  }
}
