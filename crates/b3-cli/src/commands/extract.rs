use super::{build_pipeline, log_stages, pipeline_config, Selection};
use crate::config::Config;
use anyhow::{Context, Result};
use b3_loaders::MANIFEST_FILE;
use clap::Args;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct ExtractArgs {
  #[command(flatten)]
  pub selection: Selection,

  /// Keep the raw files local instead of uploading them
  #[arg(long)]
  pub skip_upload: bool,

  /// Hide progress bars
  #[arg(long)]
  pub no_progress: bool,
}

pub async fn execute(args: ExtractArgs, config: Config) -> Result<()> {
  let pipeline_config = pipeline_config(&config, args.selection, !args.skip_upload);
  let pipeline = build_pipeline(&config, pipeline_config, !args.no_progress)?;

  let result = pipeline.extract().await;
  log_stages(&pipeline).await;
  let report = result.context("Extraction failed")?;

  info!(
    "Raw tables written to {} ({} uploaded)",
    config.work_dir.display(),
    report.uploads.len()
  );
  for record in report.manifest.price_history.skipped().chain(report.manifest.ticker_info.skipped()) {
    warn!("Skipped {}: {:?}", record.item, record.outcome);
  }
  info!("Extraction manifest: {}", config.work_dir.join(MANIFEST_FILE).display());

  Ok(())
}
