//! CSV reading and writing for the raw and clean tables
//!
//! Every table the pipeline touches is a headed CSV file whose columns match
//! the serde field names of a row type in `b3_models`. Empty fields read back
//! as `None`.

use crate::LoaderResult;
use b3_models::ListingRow;
use csv::{ReaderBuilder, Trim, Writer};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvProcessor;

impl CsvProcessor {
  pub fn new() -> Self {
    Self
  }

  /// Read every row of a headed CSV file
  pub fn read_table<T, P>(&self, path: P) -> LoaderResult<Vec<T>>
  where
    T: DeserializeOwned,
    P: AsRef<Path>,
  {
    let file = File::open(path.as_ref())?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
      rows.push(result?);
    }

    debug!("Read {} rows from {}", rows.len(), path.as_ref().display());
    Ok(rows)
  }

  /// Serialize rows to CSV bytes, header first
  ///
  /// An empty slice still produces no header; callers that need a header on
  /// empty tables write it through [`CsvProcessor::to_csv_bytes_with_header`].
  pub fn to_csv_bytes<T: Serialize>(&self, rows: &[T]) -> LoaderResult<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    for row in rows {
      writer.serialize(row)?;
    }
    Ok(writer.into_inner()?)
  }

  /// Like `to_csv_bytes` but writes `header` explicitly when `rows` is empty
  pub fn to_csv_bytes_with_header<T: Serialize>(
    &self,
    rows: &[T],
    header: &[&str],
  ) -> LoaderResult<Vec<u8>> {
    if !rows.is_empty() {
      return self.to_csv_bytes(rows);
    }
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    Ok(writer.into_inner()?)
  }

  /// Write rows to `path`, replacing any existing file
  pub fn write_table<T, P>(&self, path: P, rows: &[T], header: &[&str]) -> LoaderResult<()>
  where
    T: Serialize,
    P: AsRef<Path>,
  {
    if let Some(parent) = path.as_ref().parent() {
      std::fs::create_dir_all(parent)?;
    }
    let bytes = self.to_csv_bytes_with_header(rows, header)?;
    std::fs::write(path.as_ref(), bytes)?;
    debug!("Wrote {} rows to {}", rows.len(), path.as_ref().display());
    Ok(())
  }

  /// Parse the equity listing file, keeping rows whose country matches
  /// `country` (case-insensitive). Rows without a symbol are dropped.
  pub fn parse_listing<P: AsRef<Path>>(&self, path: P, country: &str) -> LoaderResult<Vec<ListingRow>> {
    let file = File::open(path.as_ref())?;
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(file);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
      let row: ListingRow = result?;
      if row.country.eq_ignore_ascii_case(country) && !row.symbol.is_empty() {
        rows.push(row);
      }
    }

    Ok(rows)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use b3_models::{PriceHistoryRow, RegistryRow};
  use chrono::NaiveDate;
  use std::io::Write;

  #[test]
  fn test_parse_listing_filters_country() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "country,name,full_name,isin,currency,symbol").unwrap();
    writeln!(file, "brazil,Petrobras,Petroleo Brasileiro SA,BRPETRACNPR6,BRL,PETR4").unwrap();
    writeln!(file, "united states,Apple,Apple Inc,US0378331005,USD,AAPL").unwrap();
    writeln!(file, " Brazil , Vale , Vale SA ,BRVALEACNOR0,BRL, VALE3 ").unwrap();
    writeln!(file, "brazil,Ghost,,,,").unwrap();

    let rows = CsvProcessor::new().parse_listing(file.path(), "brazil").unwrap();

    let symbols: Vec<_> = rows.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["PETR4", "VALE3"]);
    assert_eq!(rows[1].name.as_deref(), Some("Vale"));
    assert_eq!(rows[0].currency.as_deref(), Some("BRL"));
  }

  #[test]
  fn test_write_then_read_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("df_get_stocks_historic.csv");
    let rows = vec![
      PriceHistoryRow {
        date: NaiveDate::from_ymd_opt(2022, 1, 3).unwrap(),
        ticker: "PETR4.SA".to_string(),
        close: Some(29.9),
        volume: None,
      },
      PriceHistoryRow {
        date: NaiveDate::from_ymd_opt(2022, 1, 4).unwrap(),
        ticker: "PETR4.SA".to_string(),
        close: None,
        volume: Some(1000.0),
      },
    ];

    let processor = CsvProcessor::new();
    processor.write_table(&path, &rows, &["date", "ticker", "close", "volume"]).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("date,ticker,close,volume\n2022-01-03,PETR4.SA,29.9,\n"));

    let back: Vec<PriceHistoryRow> = processor.read_table(&path).unwrap();
    assert_eq!(back, rows);
  }

  #[test]
  fn test_empty_table_keeps_header() {
    let bytes = CsvProcessor::new()
      .to_csv_bytes_with_header::<RegistryRow>(&[], &["country", "name", "full_name", "isin", "currency", "ticker"])
      .unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), "country,name,full_name,isin,currency,ticker\n");
  }

  #[test]
  fn test_read_missing_file_is_io_error() {
    let result: LoaderResult<Vec<RegistryRow>> = CsvProcessor::new().read_table("/nonexistent/x.csv");
    assert!(matches!(result, Err(crate::LoaderError::IoError(_))));
  }
}
