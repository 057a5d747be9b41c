use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constraints::ForeignKey;
use crate::error::{Error, Result};
use crate::types::ColumnType;

/// Schema snapshot handed to the generator, usually loaded from `schema.json`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DatabaseSchema {
    /// Contract version for this schema format.
    pub schema_version: String,
    /// Database engine identifier (`mysql` or `postgres`).
    pub engine: String,
    /// Database name when available.
    pub database: Option<String>,
    pub tables: Vec<Table>,
}

impl DatabaseSchema {
    /// Look up a table by `schema.table` or by bare table name.
    pub fn table(&self, qualified: &str) -> Result<&Table> {
        let found = match qualified.split_once('.') {
            Some((schema, name)) => self
                .tables
                .iter()
                .find(|table| table.schema == schema && table.name == name),
            None => self.tables.iter().find(|table| table.name == qualified),
        };
        found.ok_or_else(|| Error::TableNotFound(qualified.to_string()))
    }
}

/// A table with its insertable columns and foreign keys.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    pub schema: String,
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Columns filled by the type-based generators, in declared order.
    ///
    /// Foreign key columns and columns the database fills itself
    /// (auto-increment, generated) are excluded.
    pub fn columns_to_generate(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|column| column.is_insertable())
            .filter(|column| !self.is_foreign_key_column(&column.name))
            .collect()
    }

    /// Foreign key columns, grouped by constraint in constraint order.
    pub fn columns_to_sample(&self) -> Vec<&Column> {
        self.foreign_keys
            .iter()
            .flat_map(|fk| fk.columns.iter())
            .filter_map(|name| self.column(name))
            .collect()
    }

    fn is_foreign_key_column(&self, name: &str) -> bool {
        self.foreign_keys
            .iter()
            .any(|fk| fk.columns.iter().any(|column| column == name))
    }
}

/// Column metadata for a table.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub is_nullable: bool,
    #[serde(default)]
    pub is_auto_increment: bool,
    #[serde(default)]
    pub is_generated: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType, is_nullable: bool) -> Self {
        Self {
            name: name.into(),
            column_type,
            is_nullable,
            is_auto_increment: false,
            is_generated: false,
        }
    }

    /// Whether an INSERT should provide a value for this column.
    pub fn is_insertable(&self) -> bool {
        !self.is_auto_increment && !self.is_generated
    }
}
