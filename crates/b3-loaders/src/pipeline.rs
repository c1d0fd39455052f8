//! Extract → transform → load orchestration

use crate::manifest::{ExtractionManifest, MANIFEST_FILE};
use crate::rate_index_loader::{RateIndexLoader, RateIndexLoaderInput, VariationScale};
use crate::registry_loader::{RegistryLoader, RegistryLoaderInput};
use crate::price_history_loader::{PriceHistoryLoader, PriceHistoryLoaderInput};
use crate::sink::{ObjectStore, SinkReceipt, TableSink};
use crate::ticker_info_loader::{TickerInfoLoader, TickerInfoLoaderInput};
use crate::transform::{RawTableFiles, RawTables, TransformOutput, Transformer};
use crate::{DataLoader, LoaderContext, LoaderError, LoaderResult, ProcessInfo, ProcessState};
use b3_models::TableSchema;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Paths, table names and selection for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
  pub listing_path: PathBuf,
  /// Raw tables and the extraction manifest go here
  pub work_dir: PathBuf,
  /// Clean tables go here before loading
  pub output_dir: PathBuf,
  pub dataset: String,
  pub registry_table: String,
  pub prices_table: String,
  pub country: String,
  pub exchange_suffix: String,
  pub rate_series_code: u32,
  pub rate_scale: VariationScale,
  pub start_date: NaiveDate,
  pub tickers: Option<Vec<String>>,
  pub limit: Option<usize>,
  /// Upload the raw tables to the object store after extraction
  pub upload_raw: bool,
}

impl PipelineConfig {
  pub fn raw_files(&self) -> RawTableFiles {
    RawTableFiles::in_dir(&self.work_dir)
  }

  pub fn registry_output(&self) -> PathBuf {
    self.output_dir.join(format!("{}.csv", self.registry_table))
  }

  pub fn prices_output(&self) -> PathBuf {
    self.output_dir.join(format!("{}.csv", self.prices_table))
  }

  /// Warehouse table id, `{dataset}.{table}`
  pub fn table_id(&self, table: &str) -> String {
    format!("{}.{}", self.dataset, table)
  }
}

#[derive(Debug, Clone)]
pub struct ExtractReport {
  pub files: RawTableFiles,
  pub manifest: ExtractionManifest,
  pub uploads: Vec<SinkReceipt>,
}

#[derive(Debug, Clone)]
pub struct LoadReport {
  pub registry: SinkReceipt,
  pub prices: SinkReceipt,
}

#[derive(Debug, Clone)]
pub struct RunReport {
  pub extract: ExtractReport,
  pub transform: TransformOutput,
  pub load: LoadReport,
  /// Loader and stage history in execution order
  pub stages: Vec<ProcessInfo>,
}

pub struct Pipeline {
  context: LoaderContext,
  config: PipelineConfig,
  storage: Arc<dyn ObjectStore>,
  warehouse: Arc<dyn TableSink>,
  transformer: Transformer,
}

impl Pipeline {
  pub fn new(
    context: LoaderContext,
    config: PipelineConfig,
    storage: Arc<dyn ObjectStore>,
    warehouse: Arc<dyn TableSink>,
  ) -> Self {
    Self { context, config, storage, warehouse, transformer: Transformer::new() }
  }

  pub fn config(&self) -> &PipelineConfig {
    &self.config
  }

  /// Processes tracked so far, including any that failed
  pub async fn stages(&self) -> Vec<ProcessInfo> {
    self.context.tracked_processes().await
  }

  async fn fail_stage<T>(&self, result: LoaderResult<T>) -> LoaderResult<T> {
    if let Err(err) = &result {
      self.context.track_fail(&err.to_string()).await?;
    }
    result
  }

  /// Pull the four raw tables, write them with the manifest to the work
  /// directory and optionally upload them
  pub async fn extract(&self) -> LoaderResult<ExtractReport> {
    let config = &self.config;
    let mut manifest = ExtractionManifest::new();

    let rate_index = RateIndexLoader::new()
      .load(
        &self.context,
        RateIndexLoaderInput {
          series_code: config.rate_series_code,
          start_date: config.start_date,
          scale: config.rate_scale,
        },
      )
      .await;
    let rate_index = self.fail_stage(rate_index).await?;
    manifest.rate_index = rate_index.manifest;

    let registry = RegistryLoader::new()
      .load(
        &self.context,
        RegistryLoaderInput {
          listing_path: config.listing_path.clone(),
          country: config.country.clone(),
          exchange_suffix: config.exchange_suffix.clone(),
          tickers: config.tickers.clone(),
          limit: config.limit,
        },
      )
      .await;
    let registry = self.fail_stage(registry).await?;
    let tickers = registry.tickers();
    manifest.registry = registry.manifest;

    let ticker_info = TickerInfoLoader::new()
      .load(&self.context, TickerInfoLoaderInput { tickers: tickers.clone() })
      .await;
    let ticker_info = self.fail_stage(ticker_info).await?;
    manifest.ticker_info = ticker_info.manifest;

    let price_history = PriceHistoryLoader::new()
      .load(&self.context, PriceHistoryLoaderInput { tickers, start_date: config.start_date })
      .await;
    let price_history = self.fail_stage(price_history).await?;
    manifest.price_history = price_history.manifest;

    let raw = RawTables {
      rate_index: rate_index.rows,
      registry: registry.rows,
      ticker_info: ticker_info.rows,
      price_history: price_history.rows,
    };

    let files = config.raw_files();
    raw.write(&crate::CsvProcessor::new(), &files)?;

    manifest.finish();
    manifest.write_json(&config.work_dir.join(MANIFEST_FILE))?;
    if manifest.skipped_count() > 0 {
      warn!("{} items skipped during extraction, see {}", manifest.skipped_count(), MANIFEST_FILE);
    }

    let uploads = if config.upload_raw { self.upload_raw(&files).await? } else { Vec::new() };

    info!(
      rate_rows = raw.rate_index.len(),
      registry_rows = raw.registry.len(),
      info_rows = raw.ticker_info.len(),
      price_rows = raw.price_history.len(),
      "Extraction complete"
    );

    Ok(ExtractReport { files, manifest, uploads })
  }

  async fn upload_raw(&self, files: &RawTableFiles) -> LoaderResult<Vec<SinkReceipt>> {
    let mut receipts = Vec::with_capacity(4);
    for path in files.all() {
      let key = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| LoaderError::SinkError(format!("No file name in {}", path.display())))?;
      let bytes = tokio::fs::read(path).await?;
      receipts.push(self.storage.put_object(&key, &bytes).await?);
    }
    info!("Uploaded {} raw files", receipts.len());
    Ok(receipts)
  }

  /// Read raw tables from the work directory, write both clean tables to
  /// the output directory
  pub async fn transform(&self) -> LoaderResult<TransformOutput> {
    self.context.track_start("transform").await?;
    let result = self.transformer.transform_files(&self.config.raw_files()).and_then(|output| {
      self.transformer.write_outputs(
        &output,
        &self.config.output_dir,
        &self.config.registry_table,
        &self.config.prices_table,
      )?;
      Ok(output)
    });
    let output = self.fail_stage(result).await?;

    let state = if output.report.has_duplicates() {
      warn!(
        registry = output.report.registry_duplicates.len(),
        metadata = output.report.metadata_duplicates.len(),
        prices = output.report.price_duplicates.len(),
        "Duplicate keys were dropped during transform"
      );
      ProcessState::CompletedWithErrors
    } else {
      ProcessState::Success
    };
    self.context.track_complete(state, output.report.price_rows).await?;
    Ok(output)
  }

  /// Replace both warehouse tables with the clean CSVs in the output directory
  pub async fn load(&self) -> LoaderResult<LoadReport> {
    self.context.track_start("load").await?;
    let report = self.fail_stage(self.replace_tables().await).await?;
    let rows = report.registry.rows.unwrap_or(0) + report.prices.rows.unwrap_or(0);
    self.context.track_complete(ProcessState::Success, rows).await?;
    Ok(report)
  }

  async fn replace_tables(&self) -> LoaderResult<LoadReport> {
    let config = &self.config;

    let registry_csv = tokio::fs::read(config.registry_output()).await?;
    let registry = self
      .warehouse
      .replace_table(&config.table_id(&config.registry_table), &TableSchema::security_registry(), &registry_csv)
      .await?;

    let prices_csv = tokio::fs::read(config.prices_output()).await?;
    let prices = self
      .warehouse
      .replace_table(&config.table_id(&config.prices_table), &TableSchema::price_series(), &prices_csv)
      .await?;

    Ok(LoadReport { registry, prices })
  }

  pub async fn run(&self) -> LoaderResult<RunReport> {
    let extract = self.extract().await?;
    let transform = self.transform().await?;
    let load = self.load().await?;
    Ok(RunReport { extract, transform, load, stages: self.stages().await })
  }
}
