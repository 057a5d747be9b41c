use thiserror::Error;

/// Core error type shared across rowseed crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The schema violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// A requested table is not described by the schema.
    #[error("table not found: {0}")]
    TableNotFound(String),
}

/// Convenience alias for results returned by rowseed crates.
pub type Result<T> = std::result::Result<T, Error>;
