//! Registry loader: builds raw registry rows from the local equity listing

use crate::{CsvProcessor, DataLoader, LoaderContext, LoaderError, LoaderResult, ProcessState, StageManifest};
use async_trait::async_trait;
use b3_models::RegistryRow;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct RegistryLoaderInput {
  pub listing_path: PathBuf,
  /// Listing rows outside this country are dropped
  pub country: String,
  /// Appended to each listing symbol to form the ticker (`.SA`)
  pub exchange_suffix: String,
  /// Restrict to these tickers (with or without the suffix)
  pub tickers: Option<Vec<String>>,
  /// Keep at most this many rows after filtering
  pub limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct RegistryLoaderOutput {
  pub rows: Vec<RegistryRow>,
  pub manifest: StageManifest,
}

impl RegistryLoaderOutput {
  /// Tickers in registry order, without repeats
  pub fn tickers(&self) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    self.rows.iter().filter(|r| seen.insert(r.ticker.as_str())).map(|r| r.ticker.clone()).collect()
  }
}

#[derive(Debug, Default)]
pub struct RegistryLoader {
  csv: CsvProcessor,
}

impl RegistryLoader {
  pub fn new() -> Self {
    Self { csv: CsvProcessor::new() }
  }

  /// `PETR4` and `PETR4.SA` both become `PETR4.SA`
  pub fn with_suffix(symbol: &str, suffix: &str) -> String {
    let symbol = symbol.trim().to_uppercase();
    if symbol.ends_with(&suffix.to_uppercase()) {
      symbol
    } else {
      format!("{}{}", symbol, suffix)
    }
  }
}

#[async_trait]
impl DataLoader for RegistryLoader {
  type Input = RegistryLoaderInput;
  type Output = RegistryLoaderOutput;

  async fn validate_input(&self, input: &Self::Input) -> LoaderResult<()> {
    if input.country.trim().is_empty() {
      return Err(LoaderError::InvalidData("Listing country filter is empty".to_string()));
    }
    if input.tickers.as_ref().is_some_and(|tickers| tickers.iter().any(|t| t.trim().is_empty())) {
      return Err(LoaderError::InvalidData("Ticker selection contains a blank ticker".to_string()));
    }
    if !input.listing_path.exists() {
      return Err(LoaderError::ConfigurationError(format!(
        "Listing file not found: {}",
        input.listing_path.display()
      )));
    }
    Ok(())
  }

  async fn load(&self, context: &LoaderContext, input: Self::Input) -> LoaderResult<Self::Output> {
    self.validate_input(&input).await?;
    context.track_start(self.name()).await?;

    let listing = self.csv.parse_listing(&input.listing_path, &input.country)?;
    info!("Found {} {} listings in {}", listing.len(), input.country, input.listing_path.display());

    let wanted: Option<Vec<String>> = input
      .tickers
      .as_ref()
      .map(|tickers| tickers.iter().map(|t| Self::with_suffix(t, &input.exchange_suffix)).collect());

    let mut rows: Vec<RegistryRow> = listing
      .into_iter()
      .map(|listing_row| {
        let mut row = RegistryRow::from(listing_row);
        row.ticker = Self::with_suffix(&row.ticker, &input.exchange_suffix);
        row
      })
      .filter(|row| wanted.as_ref().map_or(true, |w| w.contains(&row.ticker)))
      .collect();

    let mut manifest = StageManifest::default();
    if let Some(wanted) = &wanted {
      for ticker in wanted.iter().filter(|t| !rows.iter().any(|r| &r.ticker == *t)) {
        warn!("Requested ticker {} is not in the listing", ticker);
        manifest.record_skipped(ticker.clone(), "not in listing");
      }
    }

    if let Some(limit) = input.limit {
      rows.truncate(limit);
    }
    manifest.record_loaded("listing", rows.len());

    context.track_complete(ProcessState::Success, rows.len()).await?;
    Ok(RegistryLoaderOutput { rows, manifest })
  }

  fn name(&self) -> &'static str {
    "registry_loader"
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::LoaderConfig;
  use b3_client::MarketDataClient;
  use b3_core::Config;
  use std::io::Write;
  use std::sync::Arc;

  fn context() -> LoaderContext {
    let client = MarketDataClient::new(Config::default()).unwrap();
    LoaderContext::new(Arc::new(client), LoaderConfig { show_progress: false, ..LoaderConfig::default() })
  }

  fn listing_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "country,name,full_name,isin,currency,symbol").unwrap();
    writeln!(file, "brazil,Petrobras,Petroleo Brasileiro SA,BRPETRACNPR6,BRL,PETR4").unwrap();
    writeln!(file, "brazil,Vale,Vale SA,BRVALEACNOR0,BRL,VALE3").unwrap();
    writeln!(file, "chile,Falabella,Falabella SA,CL0000000100,CLP,FALABELLA").unwrap();
    writeln!(file, "brazil,Itau,Itau Unibanco,BRITUBACNPR1,BRL,ITUB4").unwrap();
    file
  }

  fn input(path: PathBuf) -> RegistryLoaderInput {
    RegistryLoaderInput {
      listing_path: path,
      country: "brazil".to_string(),
      exchange_suffix: ".SA".to_string(),
      tickers: None,
      limit: None,
    }
  }

  #[test]
  fn test_with_suffix() {
    assert_eq!(RegistryLoader::with_suffix("petr4", ".SA"), "PETR4.SA");
    assert_eq!(RegistryLoader::with_suffix("PETR4.SA", ".SA"), "PETR4.SA");
  }

  #[tokio::test]
  async fn test_load_filters_country_and_suffixes() {
    let file = listing_file();
    let output = RegistryLoader::new().load(&context(), input(file.path().to_path_buf())).await.unwrap();

    assert_eq!(output.tickers(), vec!["PETR4.SA", "VALE3.SA", "ITUB4.SA"]);
    assert_eq!(output.rows[0].country.as_deref(), Some("brazil"));
    assert_eq!(output.rows[0].isin.as_deref(), Some("BRPETRACNPR6"));
  }

  #[tokio::test]
  async fn test_load_with_ticker_filter_and_limit() {
    let file = listing_file();
    let mut req = input(file.path().to_path_buf());
    req.tickers = Some(vec!["VALE3".to_string(), "ITUB4.SA".to_string(), "XPTO3".to_string()]);
    req.limit = Some(1);

    let output = RegistryLoader::new().load(&context(), req).await.unwrap();

    assert_eq!(output.tickers(), vec!["VALE3.SA"]);
    let skipped: Vec<_> = output.manifest.skipped().map(|r| r.item.as_str()).collect();
    assert_eq!(skipped, vec!["XPTO3.SA"]);
  }

  #[tokio::test]
  async fn test_blank_country_or_ticker_is_invalid_data() {
    let file = listing_file();

    let mut req = input(file.path().to_path_buf());
    req.country = "  ".to_string();
    let result = RegistryLoader::new().load(&context(), req).await;
    assert!(matches!(result, Err(LoaderError::InvalidData(_))));

    let mut req = input(file.path().to_path_buf());
    req.tickers = Some(vec!["PETR4".to_string(), String::new()]);
    let result = RegistryLoader::new().load(&context(), req).await;
    assert!(matches!(result, Err(LoaderError::InvalidData(_))));
  }

  #[tokio::test]
  async fn test_missing_listing_is_configuration_error() {
    let result = RegistryLoader::new().load(&context(), input(PathBuf::from("/nonexistent/listing.csv"))).await;
    assert!(matches!(result, Err(LoaderError::ConfigurationError(_))));
  }
}
