pub mod extract;
pub mod load;
pub mod run;
pub mod transform;

use crate::config::Config;
use anyhow::{Context, Result};
use b3_client::MarketDataClient;
use b3_loaders::{
  LoaderConfig, LoaderContext, LocalObjectStore, Pipeline, PipelineConfig, ProcessState, ProcessTracker,
  VariationScale,
};
use clap::Args;
use std::sync::Arc;
use tracing::{info, warn};

/// Which registry tickers to extract
#[derive(Args, Debug, Clone, Default)]
pub struct Selection {
  /// Only these tickers (comma separated, `.SA` suffix optional)
  #[arg(short, long, value_delimiter = ',')]
  pub tickers: Option<Vec<String>>,

  /// Stop after this many registry rows
  #[arg(short, long)]
  pub limit: Option<usize>,
}

pub(crate) fn pipeline_config(config: &Config, selection: Selection, upload_raw: bool) -> PipelineConfig {
  PipelineConfig {
    listing_path: config.listing_csv.clone(),
    work_dir: config.work_dir.clone(),
    output_dir: config.output_dir.clone(),
    dataset: config.dataset.clone(),
    registry_table: config.registry_table.clone(),
    prices_table: config.prices_table.clone(),
    country: config.country.clone(),
    exchange_suffix: b3_core::EXCHANGE_SUFFIX.to_string(),
    rate_series_code: config.api_config.rate_series_code,
    rate_scale: VariationScale::Percent,
    start_date: config.api_config.start_date,
    tickers: selection.tickers,
    limit: selection.limit,
    upload_raw,
  }
}

pub(crate) fn build_pipeline(config: &Config, pipeline_config: PipelineConfig, show_progress: bool) -> Result<Pipeline> {
  let client = MarketDataClient::new(config.api_config.clone()).context("Failed to create market data client")?;

  let loader_config = LoaderConfig {
    show_progress,
    track_process: true,
    request_delay_ms: config.request_delay_ms,
  };
  let context = LoaderContext::new(Arc::new(client), loader_config).with_process_tracker(ProcessTracker::new());

  info!(
    storage = %config.storage_dir.display(),
    warehouse = %config.warehouse_dir.display(),
    "Using local object store and warehouse"
  );

  Ok(Pipeline::new(
    context,
    pipeline_config,
    Arc::new(LocalObjectStore::new(&config.storage_dir)),
    Arc::new(LocalObjectStore::new(&config.warehouse_dir)),
  ))
}

/// Log one line per tracked loader or stage
pub(crate) async fn log_stages(pipeline: &Pipeline) {
  for stage in pipeline.stages().await {
    let elapsed_ms = stage.end_time.map(|end| (end - stage.start_time).num_milliseconds());
    match stage.state {
      ProcessState::Failed => warn!(
        stage = %stage.process_name,
        error = stage.error_message.as_deref().unwrap_or(""),
        "Stage failed"
      ),
      state => info!(
        stage = %stage.process_name,
        ?state,
        records = stage.records_processed.unwrap_or(0),
        elapsed_ms = elapsed_ms.unwrap_or(0),
        "Stage finished"
      ),
    }
  }
}
