//! Rate index loader: pulls the CDI series from SGS into raw rate-index rows

use crate::{DataLoader, LoaderContext, LoaderResult, ProcessState, StageManifest};
use async_trait::async_trait;
use b3_core::RATE_INDEX_TICKER;
use b3_models::{sgs::SgsObservation, RateIndexRow};
use chrono::{Datelike, NaiveDate};
use tracing::{info, warn};

/// Unit the source publishes the daily variation in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VariationScale {
  /// Percent per day (SGS series 12 publishes 0.043739 for 0.043739%)
  #[default]
  Percent,
  /// Already a fraction
  Fraction,
}

impl VariationScale {
  pub fn to_fraction(self, value: f64) -> f64 {
    match self {
      VariationScale::Percent => value / 100.0,
      VariationScale::Fraction => value,
    }
  }
}

#[derive(Debug, Clone)]
pub struct RateIndexLoaderInput {
  pub series_code: u32,
  /// Rows before this date's year are dropped
  pub start_date: NaiveDate,
  pub scale: VariationScale,
}

#[derive(Debug, Clone)]
pub struct RateIndexLoaderOutput {
  pub rows: Vec<RateIndexRow>,
  pub manifest: StageManifest,
}

#[derive(Debug, Default)]
pub struct RateIndexLoader;

impl RateIndexLoader {
  pub fn new() -> Self {
    Self
  }

  /// Convert SGS observations, dropping rows before `start_year` and rows
  /// whose date does not parse. An unparsable value keeps the row with a
  /// null variation.
  pub fn to_rows(
    observations: &[SgsObservation],
    start_year: i32,
    scale: VariationScale,
  ) -> Vec<RateIndexRow> {
    observations
      .iter()
      .filter_map(|obs| {
        let Some(date) = obs.calendar_date() else {
          warn!("Skipping SGS observation with unparsable date {:?}", obs.date);
          return None;
        };
        if date.year() < start_year {
          return None;
        }
        let daily_variation = obs.numeric_value().map(|v| scale.to_fraction(v));
        if daily_variation.is_none() {
          warn!(%date, "SGS value {:?} is not numeric", obs.value);
        }
        Some(RateIndexRow { date, ticker: RATE_INDEX_TICKER.to_string(), daily_variation })
      })
      .collect()
  }
}

#[async_trait]
impl DataLoader for RateIndexLoader {
  type Input = RateIndexLoaderInput;
  type Output = RateIndexLoaderOutput;

  async fn load(&self, context: &LoaderContext, input: Self::Input) -> LoaderResult<Self::Output> {
    context.track_start(self.name()).await?;

    let start_year = input.start_date.year();
    let first_day = NaiveDate::from_ymd_opt(start_year, 1, 1).unwrap_or(input.start_date);
    let mut manifest = StageManifest::default();

    let rows = match context.client.sgs().series(input.series_code, first_day).await {
      Ok(observations) => {
        let rows = Self::to_rows(&observations, start_year, input.scale);
        info!("Loaded {} {} rows from SGS series {}", rows.len(), RATE_INDEX_TICKER, input.series_code);
        manifest.record_loaded(RATE_INDEX_TICKER, rows.len());
        rows
      }
      Err(e) => {
        warn!("Rate index series {} skipped: {}", input.series_code, e);
        manifest.record_skipped(RATE_INDEX_TICKER, e.to_string());
        Vec::new()
      }
    };

    let state = if rows.is_empty() { ProcessState::CompletedWithErrors } else { ProcessState::Success };
    context.track_complete(state, rows.len()).await?;

    Ok(RateIndexLoaderOutput { rows, manifest })
  }

  fn name(&self) -> &'static str {
    "rate_index_loader"
  }
}
