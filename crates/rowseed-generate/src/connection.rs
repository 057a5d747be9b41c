use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::{MySqlPool, PgPool, Row};

use crate::dialect::Dialect;
use crate::errors::GenerationError;

/// One fetched row, every column rendered as text by the server.
pub type TextRow = Vec<Option<String>>;

/// Statement execution and parent lookups used by the insert engine.
#[async_trait]
pub trait Connection: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Execute a statement and return the number of affected rows.
    async fn execute(&self, statement: &str) -> Result<u64, GenerationError>;

    /// Run a query whose columns are all projected as text.
    async fn fetch_text_rows(&self, query: &str) -> Result<Vec<TextRow>, GenerationError>;
}

/// Open a pooled connection, choosing the driver from the URL scheme.
pub async fn connect(
    url: &str,
    max_connections: u32,
) -> Result<Box<dyn Connection>, GenerationError> {
    match Dialect::from_connection_string(url) {
        Some(Dialect::MySql) => {
            let pool = MySqlPoolOptions::new()
                .max_connections(max_connections)
                .acquire_timeout(Duration::from_secs(10))
                .connect(url)
                .await?;
            Ok(Box::new(MySqlDatabase::new(pool)))
        }
        Some(Dialect::Postgres) => {
            let pool = PgPoolOptions::new()
                .max_connections(max_connections)
                .acquire_timeout(Duration::from_secs(10))
                .connect(url)
                .await?;
            Ok(Box::new(PostgresDatabase::new(pool)))
        }
        None => {
            let scheme = url.split("://").next().unwrap_or_default();
            Err(GenerationError::UnsupportedEngine(scheme.to_string()))
        }
    }
}

/// MySQL executor backed by a sqlx pool.
#[derive(Debug, Clone)]
pub struct MySqlDatabase {
    pool: MySqlPool,
}

impl MySqlDatabase {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Connection for MySqlDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    async fn execute(&self, statement: &str) -> Result<u64, GenerationError> {
        let result = sqlx::raw_sql(statement).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn fetch_text_rows(&self, query: &str) -> Result<Vec<TextRow>, GenerationError> {
        let rows = sqlx::raw_sql(query).fetch_all(&self.pool).await?;
        let decoded = rows
            .iter()
            .map(|row| {
                (0..row.len())
                    .map(|index| row.try_get::<Option<String>, _>(index))
                    .collect::<Result<TextRow, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(decoded)
    }
}

/// PostgreSQL executor backed by a sqlx pool.
#[derive(Debug, Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl PostgresDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Connection for PostgresDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn execute(&self, statement: &str) -> Result<u64, GenerationError> {
        let result = sqlx::raw_sql(statement).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn fetch_text_rows(&self, query: &str) -> Result<Vec<TextRow>, GenerationError> {
        let rows = sqlx::raw_sql(query).fetch_all(&self.pool).await?;
        let decoded = rows
            .iter()
            .map(|row| {
                (0..row.len())
                    .map(|index| row.try_get::<Option<String>, _>(index))
                    .collect::<Result<TextRow, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(decoded)
    }
}

/// Stand-in for dry runs without a database; every call fails.
#[derive(Debug, Clone, Copy)]
pub struct Offline {
    dialect: Dialect,
}

impl Offline {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

#[async_trait]
impl Connection for Offline {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn execute(&self, _statement: &str) -> Result<u64, GenerationError> {
        Err(GenerationError::Offline)
    }

    async fn fetch_text_rows(&self, _query: &str) -> Result<Vec<TextRow>, GenerationError> {
        Err(GenerationError::Offline)
    }
}
