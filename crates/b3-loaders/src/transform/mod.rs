//! Transform stage: four raw tables in, cleaned registry and price table out

pub mod dedup;
pub mod prices;
pub mod registry;

pub use dedup::{dedup_first, DuplicateReport};
pub use prices::{build_price_table, derive_returns, merge_series, MergedRow, PriceKey, PriceTable, SeriesKind};
pub use registry::{clean_registry, CleanedRegistry};

use crate::{CsvProcessor, LoaderResult};
use b3_models::{
  PriceHistoryRow, PriceObservation, RateIndexRow, RegistryRow, SecurityRecord, TableSchema, TickerInfoRow,
};
use std::path::{Path, PathBuf};
use tracing::info;

pub const RATE_INDEX_FILE: &str = "df_get_cdi.csv";
pub const REGISTRY_FILE: &str = "df_get_stocks.csv";
pub const TICKER_INFO_FILE: &str = "df_get_stocks_info.csv";
pub const PRICE_HISTORY_FILE: &str = "df_get_stocks_historic.csv";

pub const RATE_INDEX_HEADER: &[&str] = &["date", "ticker", "daily_variation"];
pub const REGISTRY_HEADER: &[&str] = &["country", "name", "full_name", "isin", "currency", "ticker"];
pub const TICKER_INFO_HEADER: &[&str] = &["city", "state", "country", "industry", "sector", "ticker"];
pub const PRICE_HISTORY_HEADER: &[&str] = &["date", "ticker", "close", "volume"];

/// Locations of the four raw tables
#[derive(Debug, Clone, PartialEq)]
pub struct RawTableFiles {
  pub rate_index: PathBuf,
  pub registry: PathBuf,
  pub ticker_info: PathBuf,
  pub price_history: PathBuf,
}

impl RawTableFiles {
  /// The standard file names inside `dir`
  pub fn in_dir(dir: &Path) -> Self {
    Self {
      rate_index: dir.join(RATE_INDEX_FILE),
      registry: dir.join(REGISTRY_FILE),
      ticker_info: dir.join(TICKER_INFO_FILE),
      price_history: dir.join(PRICE_HISTORY_FILE),
    }
  }

  pub fn all(&self) -> [&Path; 4] {
    [&self.rate_index, &self.registry, &self.ticker_info, &self.price_history]
  }
}

/// The four raw tables held in memory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTables {
  pub rate_index: Vec<RateIndexRow>,
  pub registry: Vec<RegistryRow>,
  pub ticker_info: Vec<TickerInfoRow>,
  pub price_history: Vec<PriceHistoryRow>,
}

impl RawTables {
  pub fn read(csv: &CsvProcessor, files: &RawTableFiles) -> LoaderResult<Self> {
    Ok(Self {
      rate_index: csv.read_table(&files.rate_index)?,
      registry: csv.read_table(&files.registry)?,
      ticker_info: csv.read_table(&files.ticker_info)?,
      price_history: csv.read_table(&files.price_history)?,
    })
  }

  pub fn write(&self, csv: &CsvProcessor, files: &RawTableFiles) -> LoaderResult<()> {
    csv.write_table(&files.rate_index, &self.rate_index, RATE_INDEX_HEADER)?;
    csv.write_table(&files.registry, &self.registry, REGISTRY_HEADER)?;
    csv.write_table(&files.ticker_info, &self.ticker_info, TICKER_INFO_HEADER)?;
    csv.write_table(&files.price_history, &self.price_history, PRICE_HISTORY_HEADER)?;
    Ok(())
  }
}

/// Diagnostics gathered while transforming; never fatal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformReport {
  pub registry_duplicates: Vec<String>,
  pub metadata_duplicates: Vec<String>,
  pub price_duplicates: Vec<PriceKey>,
  pub registry_rows: usize,
  pub price_rows: usize,
}

impl TransformReport {
  pub fn has_duplicates(&self) -> bool {
    !(self.registry_duplicates.is_empty()
      && self.metadata_duplicates.is_empty()
      && self.price_duplicates.is_empty())
  }
}

#[derive(Debug, Clone)]
pub struct TransformOutput {
  pub registry: Vec<SecurityRecord>,
  pub prices: Vec<PriceObservation>,
  pub report: TransformReport,
}

impl TransformOutput {
  pub fn registry_csv(&self, csv: &CsvProcessor) -> LoaderResult<Vec<u8>> {
    csv.to_csv_bytes_with_header(&self.registry, &TableSchema::security_registry().field_names())
  }

  pub fn prices_csv(&self, csv: &CsvProcessor) -> LoaderResult<Vec<u8>> {
    csv.to_csv_bytes_with_header(&self.prices, &TableSchema::price_series().field_names())
  }
}

#[derive(Debug, Default, Clone)]
pub struct Transformer {
  csv: CsvProcessor,
}

impl Transformer {
  pub fn new() -> Self {
    Self { csv: CsvProcessor::new() }
  }

  /// Pure transform over in-memory tables
  pub fn transform(&self, raw: RawTables) -> TransformOutput {
    let registry = clean_registry(raw.registry, raw.ticker_info);
    let prices = build_price_table(raw.price_history, raw.rate_index);

    let report = TransformReport {
      registry_duplicates: registry.duplicates.keys,
      metadata_duplicates: registry.metadata_duplicates.keys,
      price_duplicates: prices.duplicates.keys,
      registry_rows: registry.records.len(),
      price_rows: prices.observations.len(),
    };

    info!(
      registry_rows = report.registry_rows,
      price_rows = report.price_rows,
      "Transform complete"
    );

    TransformOutput { registry: registry.records, prices: prices.observations, report }
  }

  /// Read the raw tables from disk and transform them
  pub fn transform_files(&self, files: &RawTableFiles) -> LoaderResult<TransformOutput> {
    let raw = RawTables::read(&self.csv, files)?;
    Ok(self.transform(raw))
  }

  /// Write both clean tables as `{registry_name}.csv` and `{prices_name}.csv`
  pub fn write_outputs(
    &self,
    output: &TransformOutput,
    out_dir: &Path,
    registry_name: &str,
    prices_name: &str,
  ) -> LoaderResult<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(out_dir)?;
    let registry_path = out_dir.join(format!("{}.csv", registry_name));
    let prices_path = out_dir.join(format!("{}.csv", prices_name));

    std::fs::write(&registry_path, output.registry_csv(&self.csv)?)?;
    std::fs::write(&prices_path, output.prices_csv(&self.csv)?)?;

    Ok((registry_path, prices_path))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;

  fn sample_tables() -> RawTables {
    let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
    RawTables {
      rate_index: vec![RateIndexRow {
        date: d(2),
        ticker: "CDI".to_string(),
        daily_variation: Some(0.000437),
      }],
      registry: vec![RegistryRow {
        country: Some("brazil".to_string()),
        name: Some("Petrobras".to_string()),
        full_name: None,
        isin: Some("BRPETRACNPR6".to_string()),
        currency: Some("BRL".to_string()),
        ticker: "PETR4.SA".to_string(),
      }],
      ticker_info: vec![],
      price_history: vec![
        PriceHistoryRow { date: d(2), ticker: "PETR4.SA".to_string(), close: Some(37.0), volume: None },
        PriceHistoryRow { date: d(3), ticker: "PETR4.SA".to_string(), close: Some(37.37), volume: None },
      ],
    }
  }

  #[test]
  fn test_raw_table_files_names() {
    let files = RawTableFiles::in_dir(Path::new("/tmp/raw"));
    assert_eq!(files.rate_index, PathBuf::from("/tmp/raw/df_get_cdi.csv"));
    assert_eq!(files.price_history, PathBuf::from("/tmp/raw/df_get_stocks_historic.csv"));
  }

  #[test]
  fn test_transform_in_memory() {
    let output = Transformer::new().transform(sample_tables());
    assert_eq!(output.report.registry_rows, 1);
    assert_eq!(output.report.price_rows, 3);
    assert!(!output.report.has_duplicates());
    assert_eq!(output.prices[0].ticker, "CDI");
  }

  #[test]
  fn test_transform_files_and_write_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let files = RawTableFiles::in_dir(dir.path());
    let csv = CsvProcessor::new();
    sample_tables().write(&csv, &files).unwrap();

    let transformer = Transformer::new();
    let output = transformer.transform_files(&files).unwrap();
    let (registry_path, prices_path) =
      transformer.write_outputs(&output, &dir.path().join("clean"), "registry", "prices").unwrap();

    let registry = std::fs::read_to_string(registry_path).unwrap();
    assert!(registry.starts_with("country,name,full_name,isin,currency,ticker,city,state,industry,sector\n"));
    assert!(registry.contains("brazil,Petrobras,,BRPETRACNPR6,BRL,PETR4.SA,,,,"));

    let prices = std::fs::read_to_string(prices_path).unwrap();
    let mut lines = prices.lines();
    assert_eq!(lines.next(), Some(TableSchema::price_series().field_names().join(",").as_str()));
    let cdi_line = lines.next().unwrap();
    assert!(cdi_line.starts_with("2024-01-02,CDI,,,0.000437,1.000437,2024,1,2,"));
  }
}
