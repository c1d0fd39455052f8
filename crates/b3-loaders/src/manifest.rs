//! Per-item outcomes of the extract stage and the JSON manifest they roll up into

use crate::LoaderResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the manifest written next to the raw tables
pub const MANIFEST_FILE: &str = "extraction_manifest.json";

/// What happened to a single ticker (or series) during extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
  Loaded { rows: usize },
  Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
  pub item: String,
  #[serde(flatten)]
  pub outcome: ItemOutcome,
}

/// Outcomes for one raw table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageManifest {
  pub items: Vec<ItemRecord>,
}

impl StageManifest {
  pub fn record_loaded(&mut self, item: impl Into<String>, rows: usize) {
    self.items.push(ItemRecord { item: item.into(), outcome: ItemOutcome::Loaded { rows } });
  }

  pub fn record_skipped(&mut self, item: impl Into<String>, reason: impl Into<String>) {
    self
      .items
      .push(ItemRecord { item: item.into(), outcome: ItemOutcome::Skipped { reason: reason.into() } });
  }

  pub fn loaded_count(&self) -> usize {
    self.items.iter().filter(|r| matches!(r.outcome, ItemOutcome::Loaded { .. })).count()
  }

  pub fn skipped(&self) -> impl Iterator<Item = &ItemRecord> {
    self.items.iter().filter(|r| matches!(r.outcome, ItemOutcome::Skipped { .. }))
  }

  pub fn total_rows(&self) -> usize {
    self
      .items
      .iter()
      .map(|r| match r.outcome {
        ItemOutcome::Loaded { rows } => rows,
        ItemOutcome::Skipped { .. } => 0,
      })
      .sum()
  }
}

/// Summary of one extract run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionManifest {
  pub started_at: DateTime<Utc>,
  pub finished_at: Option<DateTime<Utc>>,
  pub rate_index: StageManifest,
  pub registry: StageManifest,
  pub ticker_info: StageManifest,
  pub price_history: StageManifest,
}

impl ExtractionManifest {
  pub fn new() -> Self {
    Self {
      started_at: Utc::now(),
      finished_at: None,
      rate_index: StageManifest::default(),
      registry: StageManifest::default(),
      ticker_info: StageManifest::default(),
      price_history: StageManifest::default(),
    }
  }

  pub fn finish(&mut self) {
    self.finished_at = Some(Utc::now());
  }

  pub fn skipped_count(&self) -> usize {
    [&self.rate_index, &self.registry, &self.ticker_info, &self.price_history]
      .iter()
      .map(|stage| stage.skipped().count())
      .sum()
  }

  pub fn write_json(&self, path: &Path) -> LoaderResult<()> {
    let json = serde_json::to_string_pretty(self)?;
    std::fs::write(path, json)?;
    Ok(())
  }

  pub fn read_json(path: &Path) -> LoaderResult<Self> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
  }
}

impl Default for ExtractionManifest {
  fn default() -> Self {
    Self::new()
  }
}
