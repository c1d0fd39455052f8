//! Ticker info loader: company profile per ticker from the quote-summary API

use crate::{DataLoader, LoaderContext, LoaderResult, ProcessState, StageManifest};
use async_trait::async_trait;
use b3_models::{yahoo::AssetProfile, TickerInfoRow};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct TickerInfoLoaderInput {
  pub tickers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TickerInfoLoaderOutput {
  pub rows: Vec<TickerInfoRow>,
  pub manifest: StageManifest,
}

#[derive(Debug, Default)]
pub struct TickerInfoLoader;

impl TickerInfoLoader {
  pub fn new() -> Self {
    Self
  }

  pub fn to_row(ticker: &str, profile: AssetProfile) -> TickerInfoRow {
    TickerInfoRow {
      city: profile.city,
      state: profile.state,
      country: profile.country,
      industry: profile.industry,
      sector: profile.sector,
      ticker: ticker.to_string(),
    }
  }
}

#[async_trait]
impl DataLoader for TickerInfoLoader {
  type Input = TickerInfoLoaderInput;
  type Output = TickerInfoLoaderOutput;

  async fn load(&self, context: &LoaderContext, input: Self::Input) -> LoaderResult<Self::Output> {
    info!("Loading company profiles for {} tickers", input.tickers.len());
    context.track_start(self.name()).await?;

    let progress = context.progress_bar(input.tickers.len(), "Loading company profiles");
    let yahoo = context.client.yahoo();
    let mut rows = Vec::with_capacity(input.tickers.len());
    let mut manifest = StageManifest::default();

    for (idx, ticker) in input.tickers.iter().enumerate() {
      context.pause_between(idx).await;
      if let Some(pb) = &progress {
        pb.set_message(format!("Loading {}", ticker));
      }

      match yahoo.asset_profile(ticker).await {
        Ok(profile) => {
          debug!("Loaded profile for {}", ticker);
          rows.push(Self::to_row(ticker, profile));
          manifest.record_loaded(ticker.clone(), 1);
        }
        Err(e) => {
          warn!("Skipping profile for {}: {}", ticker, e);
          manifest.record_skipped(ticker.clone(), e.to_string());
        }
      }

      if let Some(pb) = &progress {
        pb.inc(1);
      }
    }

    if let Some(pb) = progress {
      pb.finish_with_message("Company profiles loading complete");
    }

    let skipped = input.tickers.len() - rows.len();
    let state = if skipped > 0 { ProcessState::CompletedWithErrors } else { ProcessState::Success };
    context.track_complete(state, rows.len()).await?;

    info!("Company profiles: {} loaded, {} skipped", rows.len(), skipped);
    Ok(TickerInfoLoaderOutput { rows, manifest })
  }

  fn name(&self) -> &'static str {
    "ticker_info_loader"
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::LoaderConfig;
  use b3_client::MarketDataClient;
  use b3_core::Config;
  use std::sync::Arc;
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn context(base_url: &str) -> LoaderContext {
    let client = MarketDataClient::new(Config::with_base_url(base_url)).unwrap();
    LoaderContext::new(Arc::new(client), LoaderConfig { show_progress: false, ..LoaderConfig::default() })
  }

  #[tokio::test]
  async fn test_failed_ticker_is_skipped_and_batch_continues() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/v10/finance/quoteSummary/VALE3.SA"))
      .respond_with(ResponseTemplate::new(200).set_body_string(
        r#"{"quoteSummary": {"result": [{"assetProfile": {"city": "Rio De Janeiro", "state": "RJ",
            "country": "Brazil", "sector": "Basic Materials"}}], "error": null}}"#,
      ))
      .mount(&server)
      .await;
    Mock::given(method("GET"))
      .and(path("/v10/finance/quoteSummary/OLD3.SA"))
      .respond_with(ResponseTemplate::new(404).set_body_string(
        r#"{"quoteSummary": {"result": null, "error": {"code": "Not Found", "description": "Quote not found for ticker symbol: OLD3.SA"}}}"#,
      ))
      .mount(&server)
      .await;

    let input = TickerInfoLoaderInput { tickers: vec!["OLD3.SA".to_string(), "VALE3.SA".to_string()] };
    let output = TickerInfoLoader::new().load(&context(&server.uri()), input).await.unwrap();

    assert_eq!(output.rows.len(), 1);
    assert_eq!(output.rows[0].ticker, "VALE3.SA");
    assert_eq!(output.rows[0].industry, None);
    assert_eq!(output.rows[0].state.as_deref(), Some("RJ"));

    let skipped: Vec<_> = output.manifest.skipped().collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].item, "OLD3.SA");
    match &skipped[0].outcome {
      crate::ItemOutcome::Skipped { reason } => assert!(reason.contains("Quote not found")),
      other => panic!("unexpected outcome {:?}", other),
    }
  }
}
