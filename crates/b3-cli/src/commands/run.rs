use super::{build_pipeline, log_stages, pipeline_config, Selection};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

#[derive(Args, Debug)]
pub struct RunArgs {
  #[command(flatten)]
  pub selection: Selection,

  /// Hide progress bars
  #[arg(long)]
  pub no_progress: bool,
}

pub async fn execute(args: RunArgs, config: Config) -> Result<()> {
  let pipeline_config = pipeline_config(&config, args.selection, true);
  let pipeline = build_pipeline(&config, pipeline_config, !args.no_progress)?;

  let result = pipeline.run().await;
  log_stages(&pipeline).await;
  let report = result.context("Pipeline run failed")?;

  info!(
    "Run complete: {} tickers extracted ({} skipped), {} registry rows, {} price rows",
    report.extract.manifest.price_history.loaded_count(),
    report.extract.manifest.skipped_count(),
    report.load.registry.rows.unwrap_or(0),
    report.load.prices.rows.unwrap_or(0)
  );

  Ok(())
}
