use thiserror::Error;

/// Errors emitted while building or executing insert statements.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("schema error: {0}")]
    Schema(#[from] rowseed_core::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no database connection configured")]
    Offline,
    #[error("unsupported connection string: {0}")]
    UnsupportedEngine(String),
    #[error("referenced table {table} returned no rows")]
    EmptyParent { table: String },
    #[error("referenced table {table} has {available} rows past offset {offset}, {needed} needed")]
    ParentExhausted {
        table: String,
        offset: u64,
        available: usize,
        needed: usize,
    },
    #[error("referenced row from {table} has {found} columns, expected {expected}")]
    ParentShape {
        table: String,
        found: usize,
        expected: usize,
    },
    #[error("{operation} failed for foreign key {constraint}: {source}")]
    Sampling {
        operation: &'static str,
        constraint: String,
        #[source]
        source: Box<GenerationError>,
    },
}

/// Failure of a batched run, carrying the rows committed before the error.
#[derive(Debug, Error)]
#[error("insert stopped after {rows_committed} rows: {source}")]
pub struct RunError {
    pub rows_committed: u64,
    #[source]
    pub source: GenerationError,
}

impl RunError {
    pub fn new(rows_committed: u64, source: GenerationError) -> Self {
        Self {
            rows_committed,
            source,
        }
    }
}
