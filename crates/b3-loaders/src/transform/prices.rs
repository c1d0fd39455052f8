//! Price series merge and return engine
//!
//! Equity history and rate-index rows are unioned, deduplicated on
//! (ticker, date) and sorted by ticker then date. Each row then gets a daily
//! variation, a daily factor and month/year accumulated returns.

use super::dedup::{dedup_first, DuplicateReport};
use b3_core::RATE_INDEX_TICKER;
use b3_models::{PriceHistoryRow, PriceObservation, RateIndexRow};
use chrono::{Datelike, NaiveDate};
use std::fmt;
use tracing::warn;

/// How a ticker's daily variation is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
  /// Derived from consecutive closes
  Equity,
  /// Supplied by the source and never recomputed
  RateIndex,
}

impl SeriesKind {
  pub fn of(ticker: &str) -> Self {
    if ticker == RATE_INDEX_TICKER {
      SeriesKind::RateIndex
    } else {
      SeriesKind::Equity
    }
  }
}

/// Dedup key of the price table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceKey {
  pub ticker: String,
  pub date: NaiveDate,
}

impl fmt::Display for PriceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}@{}", self.ticker, self.date)
  }
}

/// A row of the unioned table before returns are derived
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
  pub date: NaiveDate,
  pub ticker: String,
  pub close: Option<f64>,
  pub volume: Option<f64>,
  pub daily_variation: Option<f64>,
}

impl MergedRow {
  fn key(&self) -> PriceKey {
    PriceKey { ticker: self.ticker.clone(), date: self.date }
  }
}

impl From<PriceHistoryRow> for MergedRow {
  fn from(row: PriceHistoryRow) -> Self {
    MergedRow {
      date: row.date,
      ticker: row.ticker,
      close: row.close,
      volume: row.volume,
      daily_variation: None,
    }
  }
}

impl From<RateIndexRow> for MergedRow {
  fn from(row: RateIndexRow) -> Self {
    MergedRow {
      date: row.date,
      ticker: row.ticker,
      close: None,
      volume: None,
      daily_variation: row.daily_variation,
    }
  }
}

/// Union history (first) with rate-index rows, dedup on (ticker, date),
/// then stable-sort by ticker and date.
pub fn merge_series(
  history: Vec<PriceHistoryRow>,
  rate_index: Vec<RateIndexRow>,
) -> (Vec<MergedRow>, DuplicateReport<PriceKey>) {
  let unioned: Vec<MergedRow> = history
    .into_iter()
    .map(MergedRow::from)
    .chain(rate_index.into_iter().map(MergedRow::from))
    .collect();

  let (mut rows, duplicates) = dedup_first("prices", unioned, MergedRow::key);
  duplicates.log();

  rows.sort_by(|a, b| a.ticker.cmp(&b.ticker).then(a.date.cmp(&b.date)));
  (rows, duplicates)
}

/// Running product of factors that restarts whenever its group key changes
#[derive(Debug)]
struct Accumulator<K: PartialEq> {
  key: Option<K>,
  product: f64,
}

impl<K: PartialEq> Accumulator<K> {
  fn new() -> Self {
    Self { key: None, product: 1.0 }
  }

  /// Fold `factor` in and return the accumulated return in percent
  fn push(&mut self, key: K, factor: f64) -> f64 {
    if self.key.as_ref() != Some(&key) {
      self.key = Some(key);
      self.product = 1.0;
    }
    self.product *= factor;
    (self.product - 1.0) * 100.0
  }
}

/// Day-over-day return from the previous (forward-filled) close
fn equity_variation(ticker: &str, date: NaiveDate, prev: Option<f64>, close: Option<f64>) -> Option<f64> {
  let (prev, close) = (prev?, close?);
  if prev <= 0.0 {
    warn!(ticker, %date, prev, "Non-positive previous close, variation left undefined");
    return None;
  }
  let variation = close / prev - 1.0;
  if !variation.is_finite() {
    warn!(ticker, %date, "Non-finite variation, left undefined");
    return None;
  }
  Some(variation)
}

/// Annotate rows sorted by (ticker, date) with variations and accumulations
pub fn derive_returns(rows: Vec<MergedRow>) -> Vec<PriceObservation> {
  let mut out = Vec::with_capacity(rows.len());

  let mut current_ticker: Option<String> = None;
  let mut last_close: Option<f64> = None;
  let mut month_acc = Accumulator::new();
  let mut year_acc = Accumulator::new();

  for row in rows {
    if current_ticker.as_deref() != Some(row.ticker.as_str()) {
      current_ticker = Some(row.ticker.clone());
      last_close = None;
    }

    let daily_variation = match SeriesKind::of(&row.ticker) {
      SeriesKind::RateIndex => row.daily_variation,
      SeriesKind::Equity => {
        let close = row.close.or(last_close);
        let variation = equity_variation(&row.ticker, row.date, last_close, close);
        last_close = close;
        variation
      }
    };

    let daily_factor = daily_variation.map_or(1.0, |v| 1.0 + v);
    let (year, month, day) = (row.date.year(), row.date.month(), row.date.day());

    let month_accumulated_variation = month_acc.push((row.ticker.clone(), year, month), daily_factor);
    let year_accumulated_variation = year_acc.push((row.ticker.clone(), year), daily_factor);

    out.push(PriceObservation {
      date: row.date,
      ticker: row.ticker,
      close: row.close,
      volume: row.volume,
      daily_variation,
      daily_factor,
      year,
      month,
      day,
      month_accumulated_variation,
      year_accumulated_variation,
    });
  }

  out
}

/// Merged, ordered, return-annotated price table
#[derive(Debug, Clone)]
pub struct PriceTable {
  pub observations: Vec<PriceObservation>,
  pub duplicates: DuplicateReport<PriceKey>,
}

pub fn build_price_table(history: Vec<PriceHistoryRow>, rate_index: Vec<RateIndexRow>) -> PriceTable {
  let (rows, duplicates) = merge_series(history, rate_index);
  PriceTable { observations: derive_returns(rows), duplicates }
}

#[cfg(test)]
mod tests {
  use super::*;
  use b3_core::test_utils::{assert_approx_eq, assert_percentage_eq, assert_some_approx_eq};

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn bar(ticker: &str, d: NaiveDate, close: Option<f64>) -> PriceHistoryRow {
    PriceHistoryRow { date: d, ticker: ticker.to_string(), close, volume: Some(100.0) }
  }

  fn cdi(d: NaiveDate, variation: f64) -> RateIndexRow {
    RateIndexRow { date: d, ticker: RATE_INDEX_TICKER.to_string(), daily_variation: Some(variation) }
  }

  #[test]
  fn test_equity_returns() {
    let table = build_price_table(
      vec![
        bar("XYZ", date(2024, 3, 4), Some(10.0)),
        bar("XYZ", date(2024, 3, 5), Some(11.0)),
        bar("XYZ", date(2024, 3, 6), Some(9.9)),
      ],
      vec![],
    );
    let obs = &table.observations;

    assert_eq!(obs[0].daily_variation, None);
    assert_some_approx_eq(obs[1].daily_variation, 0.10);
    assert_some_approx_eq(obs[2].daily_variation, -0.10);

    assert_eq!(obs[0].daily_factor, 1.0);
    assert_approx_eq(obs[1].daily_factor, 1.10, 1e-10);
    assert_approx_eq(obs[2].daily_factor, 0.90, 1e-10);

    assert_approx_eq(obs[0].month_accumulated_variation, 0.0, 1e-10);
    assert_percentage_eq(obs[1].month_accumulated_variation, 10.0);
    assert_percentage_eq(obs[2].month_accumulated_variation, -1.0);
    assert_eq!((obs[2].year, obs[2].month, obs[2].day), (2024, 3, 6));
  }

  #[test]
  fn test_sorted_by_ticker_then_date() {
    let (rows, _) = merge_series(
      vec![
        bar("VALE3.SA", date(2024, 1, 3), Some(1.0)),
        bar("PETR4.SA", date(2024, 1, 3), Some(1.0)),
        bar("PETR4.SA", date(2024, 1, 2), Some(1.0)),
      ],
      vec![cdi(date(2024, 1, 2), 0.0004)],
    );

    let order: Vec<_> = rows.iter().map(|r| (r.ticker.as_str(), r.date.day())).collect();
    assert_eq!(order, vec![("CDI", 2), ("PETR4.SA", 2), ("PETR4.SA", 3), ("VALE3.SA", 3)]);
  }

  #[test]
  fn test_duplicate_keys_first_wins() {
    let table = build_price_table(
      vec![
        bar("PETR4.SA", date(2024, 1, 2), Some(30.0)),
        bar("PETR4.SA", date(2024, 1, 2), Some(99.0)),
      ],
      vec![cdi(date(2024, 1, 2), 0.0004), cdi(date(2024, 1, 2), 0.9)],
    );

    assert_eq!(table.observations.len(), 2);
    assert_eq!(table.observations[1].close, Some(30.0));
    assert_some_approx_eq(table.observations[0].daily_variation, 0.0004);

    let keys: Vec<String> = table.duplicates.keys.iter().map(|k| k.to_string()).collect();
    assert_eq!(keys, vec!["PETR4.SA@2024-01-02", "CDI@2024-01-02"]);
    assert_eq!(table.duplicates.dropped_rows, 2);
  }

  #[test]
  fn test_rate_index_variation_is_kept() {
    let table = build_price_table(
      vec![],
      vec![cdi(date(2024, 1, 2), 0.0004), cdi(date(2024, 1, 3), 0.0005)],
    );
    let obs = &table.observations;

    assert_eq!(obs[0].close, None);
    assert_eq!(obs[0].volume, None);
    assert_some_approx_eq(obs[0].daily_variation, 0.0004);
    assert_approx_eq(obs[0].daily_factor, 1.0004, 1e-12);
    assert_approx_eq(obs[1].month_accumulated_variation, (1.0004 * 1.0005 - 1.0) * 100.0, 1e-10);
  }

  #[test]
  fn test_missing_close_is_forward_filled_for_variation() {
    let table = build_price_table(
      vec![
        bar("XYZ", date(2024, 3, 4), Some(10.0)),
        bar("XYZ", date(2024, 3, 5), None),
        bar("XYZ", date(2024, 3, 6), Some(12.0)),
      ],
      vec![],
    );
    let obs = &table.observations;

    assert_eq!(obs[1].close, None);
    assert_eq!(obs[1].daily_variation, Some(0.0));
    assert_eq!(obs[1].daily_factor, 1.0);
    assert_some_approx_eq(obs[2].daily_variation, 0.2);
    assert_percentage_eq(obs[2].month_accumulated_variation, 20.0);
  }

  #[test]
  fn test_leading_missing_closes_stay_undefined() {
    let table = build_price_table(
      vec![
        bar("XYZ", date(2024, 3, 4), None),
        bar("XYZ", date(2024, 3, 5), Some(10.0)),
        bar("XYZ", date(2024, 3, 6), None),
      ],
      vec![],
    );
    let obs = &table.observations;

    assert_eq!(obs[0].daily_variation, None);
    assert_eq!(obs[1].daily_variation, None);
    assert_eq!(obs[2].daily_variation, Some(0.0));
  }

  #[test]
  fn test_accumulations_reset_on_month_and_year() {
    let table = build_price_table(
      vec![
        bar("XYZ", date(2023, 12, 28), Some(10.0)),
        bar("XYZ", date(2023, 12, 29), Some(11.0)),
        bar("XYZ", date(2024, 1, 2), Some(12.1)),
        bar("XYZ", date(2024, 2, 1), Some(13.31)),
      ],
      vec![],
    );
    let obs = &table.observations;

    assert_percentage_eq(obs[1].year_accumulated_variation, 10.0);
    // first trading day of the year: YTD equals that day's variation
    assert_percentage_eq(obs[2].year_accumulated_variation, 10.0);
    assert_percentage_eq(obs[2].month_accumulated_variation, 10.0);
    assert_percentage_eq(obs[3].month_accumulated_variation, 10.0);
    assert_percentage_eq(obs[3].year_accumulated_variation, 21.0);
  }

  #[test]
  fn test_accumulations_reset_per_ticker() {
    let table = build_price_table(
      vec![
        bar("AAA", date(2024, 1, 2), Some(10.0)),
        bar("AAA", date(2024, 1, 3), Some(20.0)),
        bar("BBB", date(2024, 1, 2), Some(5.0)),
      ],
      vec![],
    );
    let bbb = &table.observations[2];

    assert_eq!(bbb.ticker, "BBB");
    assert_eq!(bbb.daily_variation, None);
    assert_eq!(bbb.month_accumulated_variation, 0.0);
    assert_eq!(bbb.year_accumulated_variation, 0.0);
  }

  #[test]
  fn test_zero_previous_close_leaves_variation_undefined() {
    let table = build_price_table(
      vec![bar("XYZ", date(2024, 3, 4), Some(0.0)), bar("XYZ", date(2024, 3, 5), Some(1.0))],
      vec![],
    );
    assert_eq!(table.observations[1].daily_variation, None);
    assert_eq!(table.observations[1].daily_factor, 1.0);
  }

  #[test]
  fn test_series_kind() {
    assert_eq!(SeriesKind::of("CDI"), SeriesKind::RateIndex);
    assert_eq!(SeriesKind::of("PETR4.SA"), SeriesKind::Equity);
  }
}
