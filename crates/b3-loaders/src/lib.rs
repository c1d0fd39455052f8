//! # b3-loaders
//!
//! Extract, transform and load stages for the B3 equities ETL.
//!
//! This crate provides:
//! - Loaders for the rate-index series, the equity registry, company
//!   profiles and daily price history
//! - The extraction manifest recording what was loaded or skipped per ticker
//! - The transformer: registry cleaning and the price/return engine
//! - Sinks that validate and replace output tables
//! - `Pipeline`, which wires the three stages together

pub mod csv_processor;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod pipeline;
pub mod price_history_loader;
pub mod process_tracker;
pub mod rate_index_loader;
pub mod registry_loader;
pub mod sink;
pub mod ticker_info_loader;
pub mod transform;

// Re-export commonly used types
pub use csv_processor::CsvProcessor;
pub use error::{LoaderError, LoaderResult};
pub use loader::{DataLoader, LoaderConfig, LoaderContext};
pub use manifest::{ExtractionManifest, ItemOutcome, ItemRecord, StageManifest, MANIFEST_FILE};
pub use pipeline::{ExtractReport, LoadReport, Pipeline, PipelineConfig, RunReport};
pub use process_tracker::{ProcessInfo, ProcessState, ProcessTracker};
pub use sink::{validate_csv, LocalObjectStore, ObjectStore, SinkReceipt, TableSink};
pub use transform::{RawTableFiles, RawTables, TransformOutput, TransformReport, Transformer};

// Re-export loaders
pub use price_history_loader::{PriceHistoryLoader, PriceHistoryLoaderInput, PriceHistoryLoaderOutput};
pub use rate_index_loader::{RateIndexLoader, RateIndexLoaderInput, RateIndexLoaderOutput, VariationScale};
pub use registry_loader::{RegistryLoader, RegistryLoaderInput, RegistryLoaderOutput};
pub use ticker_info_loader::{TickerInfoLoader, TickerInfoLoaderInput, TickerInfoLoaderOutput};

// Prelude for convenient imports
pub mod prelude {
  pub use crate::{
    DataLoader, LoaderConfig, LoaderContext, LoaderError, LoaderResult, Pipeline, PipelineConfig,
    ProcessState, ProcessTracker,
  };
}
