//! Registry cleaning: dedup on ticker, then left-join the per-ticker metadata

use super::dedup::{dedup_first, DuplicateReport};
use b3_models::{RegistryRow, SecurityRecord, TickerInfoRow};
use std::collections::HashMap;
use tracing::debug;

/// Cleaned registry plus what was dropped along the way
#[derive(Debug, Clone)]
pub struct CleanedRegistry {
  pub records: Vec<SecurityRecord>,
  pub duplicates: DuplicateReport<String>,
  pub metadata_duplicates: DuplicateReport<String>,
}

/// Build one record per unique ticker, in first-occurrence order.
///
/// Registry rows without metadata keep null descriptive fields. `country`
/// always comes from the registry; the metadata value is discarded.
pub fn clean_registry(registry: Vec<RegistryRow>, info: Vec<TickerInfoRow>) -> CleanedRegistry {
  let (registry, duplicates) = dedup_first("registry", registry, |row| row.ticker.clone());
  duplicates.log();

  let (info, metadata_duplicates) = dedup_first("ticker_info", info, |row| row.ticker.clone());
  metadata_duplicates.log();

  let mut info_by_ticker: HashMap<String, TickerInfoRow> =
    info.into_iter().map(|row| (row.ticker.clone(), row)).collect();

  let records: Vec<SecurityRecord> = registry
    .into_iter()
    .map(|row| {
      let info = info_by_ticker.remove(&row.ticker).unwrap_or_default();
      SecurityRecord {
        country: row.country,
        name: row.name,
        full_name: row.full_name,
        isin: row.isin,
        currency: row.currency,
        ticker: row.ticker,
        city: info.city,
        state: info.state,
        industry: info.industry,
        sector: info.sector,
      }
    })
    .collect();

  if !info_by_ticker.is_empty() {
    debug!("{} metadata rows matched no registry ticker", info_by_ticker.len());
  }

  CleanedRegistry { records, duplicates, metadata_duplicates }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn registry_row(ticker: &str, isin: &str) -> RegistryRow {
    RegistryRow {
      country: Some("brazil".to_string()),
      name: Some(format!("{} name", ticker)),
      full_name: None,
      isin: Some(isin.to_string()),
      currency: Some("BRL".to_string()),
      ticker: ticker.to_string(),
    }
  }

  fn info_row(ticker: &str, sector: &str) -> TickerInfoRow {
    TickerInfoRow {
      city: Some("Sao Paulo".to_string()),
      state: Some("SP".to_string()),
      country: Some("Brazil".to_string()),
      industry: None,
      sector: Some(sector.to_string()),
      ticker: ticker.to_string(),
    }
  }

  #[test]
  fn test_duplicate_ticker_keeps_first_isin() {
    let cleaned = clean_registry(
      vec![registry_row("ABC", "BRABC0000001"), registry_row("ABC", "BRABC0000002")],
      vec![],
    );

    assert_eq!(cleaned.records.len(), 1);
    assert_eq!(cleaned.records[0].isin.as_deref(), Some("BRABC0000001"));
    assert_eq!(cleaned.duplicates.keys, vec!["ABC".to_string()]);
  }

  #[test]
  fn test_left_join_keeps_rows_without_metadata() {
    let cleaned = clean_registry(
      vec![registry_row("PETR4.SA", "BRPETRACNPR6"), registry_row("VALE3.SA", "BRVALEACNOR0")],
      vec![info_row("VALE3.SA", "Basic Materials"), info_row("ITUB4.SA", "Financial Services")],
    );

    let tickers: Vec<_> = cleaned.records.iter().map(|r| r.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["PETR4.SA", "VALE3.SA"]);
    assert_eq!(cleaned.records[0].sector, None);
    assert_eq!(cleaned.records[0].city, None);
    assert_eq!(cleaned.records[1].sector.as_deref(), Some("Basic Materials"));
    assert_eq!(cleaned.records[1].state.as_deref(), Some("SP"));
  }

  #[test]
  fn test_registry_country_wins() {
    let cleaned = clean_registry(vec![registry_row("VALE3.SA", "X")], vec![info_row("VALE3.SA", "S")]);
    assert_eq!(cleaned.records[0].country.as_deref(), Some("brazil"));

    let mut blank = registry_row("VALE3.SA", "X");
    blank.country = None;
    let cleaned = clean_registry(vec![blank], vec![info_row("VALE3.SA", "S")]);
    assert_eq!(cleaned.records[0].country, None);
    assert_eq!(cleaned.records[0].sector.as_deref(), Some("S"));
  }

  #[test]
  fn test_repeated_metadata_does_not_multiply_rows() {
    let cleaned = clean_registry(
      vec![registry_row("VALE3.SA", "X")],
      vec![info_row("VALE3.SA", "First"), info_row("VALE3.SA", "Second")],
    );

    assert_eq!(cleaned.records.len(), 1);
    assert_eq!(cleaned.records[0].sector.as_deref(), Some("First"));
    assert_eq!(cleaned.metadata_duplicates.keys, vec!["VALE3.SA".to_string()]);
    assert!(cleaned.duplicates.is_empty());
  }
}
