//! Table schemas for the two output tables
//!
//! Sinks check CSV payloads against these before replacing a table: the
//! header must list the fields in schema order and `Required` fields must be
//! non-empty on every row.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
  String,
  Integer,
  Float,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldMode {
  Required,
  Nullable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaField {
  pub name: &'static str,
  pub field_type: FieldType,
  pub mode: FieldMode,
  pub description: &'static str,
}

impl SchemaField {
  const fn new(
    name: &'static str,
    field_type: FieldType,
    mode: FieldMode,
    description: &'static str,
  ) -> Self {
    Self { name, field_type, mode, description }
  }

  pub fn is_required(&self) -> bool {
    self.mode == FieldMode::Required
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSchema {
  pub fields: Vec<SchemaField>,
}

impl TableSchema {
  pub fn field_names(&self) -> Vec<&'static str> {
    self.fields.iter().map(|f| f.name).collect()
  }

  pub fn required_fields(&self) -> impl Iterator<Item = (usize, &SchemaField)> {
    self.fields.iter().enumerate().filter(|(_, f)| f.is_required())
  }

  /// Security registry: `ticker` required, everything else nullable
  pub fn security_registry() -> Self {
    use FieldMode::*;
    Self {
      fields: vec![
        SchemaField::new("country", FieldType::String, Nullable, "Country the ticker trades in"),
        SchemaField::new("name", FieldType::String, Nullable, "Company name"),
        SchemaField::new("full_name", FieldType::String, Nullable, "Company full name"),
        SchemaField::new("isin", FieldType::String, Nullable, "ISIN code"),
        SchemaField::new("currency", FieldType::String, Nullable, "Trading currency"),
        SchemaField::new("ticker", FieldType::String, Required, "Exchange ticker"),
        SchemaField::new("city", FieldType::String, Nullable, "City of the company headquarters"),
        SchemaField::new("state", FieldType::String, Nullable, "State of the company headquarters"),
        SchemaField::new("industry", FieldType::String, Nullable, "Industry the company operates in"),
        SchemaField::new("sector", FieldType::String, Nullable, "Sector the company operates in"),
      ],
    }
  }

  /// Price series: `date` and `ticker` required; rate-index rows carry no
  /// close or volume so those stay nullable.
  pub fn price_series() -> Self {
    use FieldMode::*;
    Self {
      fields: vec![
        SchemaField::new("date", FieldType::String, Required, "Trading day (YYYY-MM-DD)"),
        SchemaField::new("ticker", FieldType::String, Required, "Exchange ticker or rate index"),
        SchemaField::new("close", FieldType::Float, Nullable, "Closing price"),
        SchemaField::new("volume", FieldType::Float, Nullable, "Traded volume"),
        SchemaField::new("daily_variation", FieldType::Float, Nullable, "Daily fractional return"),
        SchemaField::new("daily_factor", FieldType::Float, Nullable, "1 + daily variation"),
        SchemaField::new("year", FieldType::Integer, Nullable, "Year of the trading day"),
        SchemaField::new("month", FieldType::Integer, Nullable, "Month of the trading day"),
        SchemaField::new("day", FieldType::Integer, Nullable, "Day of month of the trading day"),
        SchemaField::new(
          "month_accumulated_variation",
          FieldType::Float,
          Nullable,
          "Month-to-date accumulated return (%)",
        ),
        SchemaField::new(
          "year_accumulated_variation",
          FieldType::Float,
          Nullable,
          "Year-to-date accumulated return (%)",
        ),
      ],
    }
  }
}
