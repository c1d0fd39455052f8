use super::{build_pipeline, log_stages, pipeline_config, Selection};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct LoadArgs {
  /// Directory holding the clean tables
  #[arg(long, env = "B3_OUTPUT_DIR")]
  pub out_dir: Option<PathBuf>,
}

pub async fn execute(args: LoadArgs, mut config: Config) -> Result<()> {
  if let Some(out_dir) = args.out_dir {
    config.output_dir = out_dir;
  }

  let pipeline_config = pipeline_config(&config, Selection::default(), false);
  let pipeline = build_pipeline(&config, pipeline_config, false)?;

  let result = pipeline.load().await;
  log_stages(&pipeline).await;
  let report = result.context("Load failed")?;

  for receipt in [&report.registry, &report.prices] {
    info!("Loaded {} rows into {}", receipt.rows.unwrap_or(0), receipt.location.display());
  }

  Ok(())
}
