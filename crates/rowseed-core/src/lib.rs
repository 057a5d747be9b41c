//! Core contracts for rowseed.
//!
//! This crate defines the table metadata consumed by the row generator,
//! the column type classification, and schema validation helpers.

pub mod constraints;
pub mod error;
pub mod schema;
pub mod types;
pub mod validation;

pub use constraints::ForeignKey;
pub use error::{Error, Result};
pub use schema::{Column, DatabaseSchema, Table};
pub use types::{ColumnType, DataType, IntegerKind};
pub use validation::{validate_schema, validate_table};

/// Current contract version for `schema.json` documents.
pub const SCHEMA_VERSION: &str = "0.1";
