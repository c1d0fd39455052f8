use crate::config::Config;
use anyhow::{Context, Result};
use b3_loaders::{RawTableFiles, Transformer};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct TransformArgs {
  /// Directory holding the raw tables
  #[arg(long, env = "B3_WORK_DIR")]
  pub work_dir: Option<PathBuf>,

  /// Directory the clean tables are written to
  #[arg(long, env = "B3_OUTPUT_DIR")]
  pub out_dir: Option<PathBuf>,
}

pub async fn execute(args: TransformArgs, config: Config) -> Result<()> {
  let work_dir = args.work_dir.unwrap_or(config.work_dir);
  let out_dir = args.out_dir.unwrap_or(config.output_dir);

  let transformer = Transformer::new();
  let output = transformer
    .transform_files(&RawTableFiles::in_dir(&work_dir))
    .with_context(|| format!("Failed to transform raw tables in {}", work_dir.display()))?;

  let (registry_path, prices_path) = transformer
    .write_outputs(&output, &out_dir, &config.registry_table, &config.prices_table)
    .with_context(|| format!("Failed to write clean tables to {}", out_dir.display()))?;

  info!("Registry: {} rows -> {}", output.report.registry_rows, registry_path.display());
  info!("Prices: {} rows -> {}", output.report.price_rows, prices_path.display());
  if output.report.has_duplicates() {
    info!(
      "Dropped duplicates: {} registry, {} metadata, {} price keys",
      output.report.registry_duplicates.len(),
      output.report.metadata_duplicates.len(),
      output.report.price_duplicates.len()
    );
  }

  Ok(())
}
