//! Price history loader: daily bars per ticker from the chart API

use crate::{DataLoader, LoaderContext, LoaderResult, ProcessState, StageManifest};
use async_trait::async_trait;
use b3_models::{yahoo::ChartResult, PriceHistoryRow};
use chrono::{DateTime, NaiveDate};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct PriceHistoryLoaderInput {
  pub tickers: Vec<String>,
  pub start_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct PriceHistoryLoaderOutput {
  pub rows: Vec<PriceHistoryRow>,
  pub manifest: StageManifest,
}

#[derive(Debug, Default)]
pub struct PriceHistoryLoader;

impl PriceHistoryLoader {
  pub fn new() -> Self {
    Self
  }

  /// Flatten a chart into rows. Bar timestamps are shifted by the exchange
  /// offset before taking the calendar date; bars with neither a close nor
  /// a volume are dropped.
  pub fn to_rows(ticker: &str, chart: &ChartResult) -> Vec<PriceHistoryRow> {
    let quote = chart.indicators.quote.first();
    let offset = chart.meta.gmtoffset;

    chart
      .timestamp
      .iter()
      .enumerate()
      .filter_map(|(i, ts)| {
        let date = DateTime::from_timestamp(ts + offset, 0)?.date_naive();
        let close = quote.and_then(|q| q.close.get(i).copied().flatten());
        let volume = quote.and_then(|q| q.volume.get(i).copied().flatten());
        if close.is_none() && volume.is_none() {
          return None;
        }
        Some(PriceHistoryRow { date, ticker: ticker.to_string(), close, volume })
      })
      .collect()
  }
}

#[async_trait]
impl DataLoader for PriceHistoryLoader {
  type Input = PriceHistoryLoaderInput;
  type Output = PriceHistoryLoaderOutput;

  async fn load(&self, context: &LoaderContext, input: Self::Input) -> LoaderResult<Self::Output> {
    info!("Loading daily prices for {} tickers since {}", input.tickers.len(), input.start_date);
    context.track_start(self.name()).await?;

    let progress = context.progress_bar(input.tickers.len(), "Loading daily prices");
    let yahoo = context.client.yahoo();
    let mut rows = Vec::new();
    let mut manifest = StageManifest::default();

    for (idx, ticker) in input.tickers.iter().enumerate() {
      context.pause_between(idx).await;
      if let Some(pb) = &progress {
        pb.set_message(format!("Loading {}", ticker));
      }

      match yahoo.daily_chart(ticker, input.start_date).await {
        Ok(chart) => {
          let bars = Self::to_rows(ticker, &chart);
          debug!("Loaded {} daily bars for {}", bars.len(), ticker);
          manifest.record_loaded(ticker.clone(), bars.len());
          rows.extend(bars);
        }
        Err(e) => {
          warn!("Skipping price history for {}: {}", ticker, e);
          manifest.record_skipped(ticker.clone(), e.to_string());
        }
      }

      if let Some(pb) = &progress {
        pb.inc(1);
      }
    }

    if let Some(pb) = progress {
      pb.finish_with_message("Daily prices loading complete");
    }

    let skipped = manifest.skipped().count();
    let state = if skipped > 0 { ProcessState::CompletedWithErrors } else { ProcessState::Success };
    context.track_complete(state, rows.len()).await?;

    info!(
      "Daily prices: {} tickers loaded, {} skipped, {} rows",
      manifest.loaded_count(),
      skipped,
      rows.len()
    );
    Ok(PriceHistoryLoaderOutput { rows, manifest })
  }

  fn name(&self) -> &'static str {
    "price_history_loader"
  }
}
