//! # b3-models
//!
//! Data models for the B3 equities ETL.
//!
//! This crate provides strongly-typed Rust structures for:
//!
//! - **Raw tables**: the four intermediate CSV files written by the extract stage
//! - **Clean records**: the security registry and the price/return series
//! - **Upstream responses**: SGS rate series and Yahoo chart / quote summary JSON
//! - **Schemas**: field lists and required-ness for the two output tables
//!
//! ## Usage
//!
//! ```ignore
//! use b3_models::sgs::SgsObservation;
//!
//! let series: Vec<SgsObservation> = serde_json::from_str(&response_json)?;
//! ```

#![warn(clippy::all)]

pub mod common;
pub mod raw;
pub mod records;
pub mod schema;
pub mod sgs;
pub mod yahoo;

pub use common::*;
pub use raw::*;
pub use records::*;
pub use schema::*;
