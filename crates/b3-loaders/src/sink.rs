//! Sinks for raw files and output tables
//!
//! `LocalObjectStore` is a directory standing in for both the object store
//! (raw CSV uploads) and the warehouse (one CSV per table). Every write goes
//! to a temp file first and is renamed into place, so a table is either the
//! old version or the new one.

use crate::{LoaderError, LoaderResult};
use async_trait::async_trait;
use b3_models::TableSchema;
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where a write landed
#[derive(Debug, Clone, PartialEq)]
pub struct SinkReceipt {
  pub location: PathBuf,
  pub bytes: usize,
  /// Data rows, when the payload was a validated table
  pub rows: Option<usize>,
}

/// Blob-style storage keyed by path-like names
#[async_trait]
pub trait ObjectStore: Send + Sync {
  async fn put_object(&self, key: &str, bytes: &[u8]) -> LoaderResult<SinkReceipt>;
}

/// Table storage with full-replace semantics
#[async_trait]
pub trait TableSink: Send + Sync {
  /// Validate `csv` against `schema` and replace table `name` with it
  async fn replace_table(&self, name: &str, schema: &TableSchema, csv: &[u8]) -> LoaderResult<SinkReceipt>;
}

/// Check a CSV payload against a schema; returns the number of data rows.
///
/// The header must list the schema fields in order and every `REQUIRED`
/// field must be non-empty.
pub fn validate_csv(table: &str, schema: &TableSchema, csv: &[u8]) -> LoaderResult<usize> {
  let violation = |reason: String| LoaderError::SchemaViolation { table: table.to_string(), reason };

  let mut reader = ReaderBuilder::new().has_headers(true).from_reader(csv);
  let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
  let expected = schema.field_names();

  if header != expected {
    return Err(violation(format!("header [{}] does not match schema [{}]", header.join(","), expected.join(","))));
  }

  let mut rows = 0;
  for (line, record) in reader.records().enumerate() {
    let record = record?;
    for (idx, field) in schema.required_fields() {
      if record.get(idx).map_or(true, |v| v.trim().is_empty()) {
        return Err(violation(format!("row {} has empty required field '{}'", line + 1, field.name)));
      }
    }
    rows += 1;
  }

  Ok(rows)
}

/// Directory-backed object store and table sink
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
  root: PathBuf,
}

impl LocalObjectStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// File a key maps to; empty and `..` segments are dropped
  pub fn path_for(&self, key: &str) -> PathBuf {
    key
      .split('/')
      .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
      .fold(self.root.clone(), |path, segment| path.join(segment))
  }

  async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> LoaderResult<()> {
    let parent = path
      .parent()
      .ok_or_else(|| LoaderError::SinkError(format!("No parent directory for {}", path.display())))?;
    tokio::fs::create_dir_all(parent).await?;

    let file_name = path
      .file_name()
      .ok_or_else(|| LoaderError::SinkError(format!("No file name in {}", path.display())))?;
    let tmp = parent.join(format!(".{}.tmp", file_name.to_string_lossy()));

    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
  }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
  async fn put_object(&self, key: &str, bytes: &[u8]) -> LoaderResult<SinkReceipt> {
    let location = self.path_for(key);
    if location == self.root {
      return Err(LoaderError::SinkError(format!("Invalid object key '{}'", key)));
    }
    self.write_atomic(&location, bytes).await?;
    debug!("Stored {} bytes at {}", bytes.len(), location.display());
    Ok(SinkReceipt { location, bytes: bytes.len(), rows: None })
  }
}

#[async_trait]
impl TableSink for LocalObjectStore {
  /// `market.prices` lands at `{root}/market/prices.csv`
  async fn replace_table(&self, name: &str, schema: &TableSchema, csv: &[u8]) -> LoaderResult<SinkReceipt> {
    let rows = validate_csv(name, schema, csv)?;
    let mut receipt = self.put_object(&format!("{}.csv", name.replace('.', "/")), csv).await?;
    receipt.rows = Some(rows);
    info!("Replaced table {} with {} rows", name, rows);
    Ok(receipt)
  }
}
