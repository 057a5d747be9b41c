use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::dialect::Dialect;

/// A single cell destined for an INSERT statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Bool(bool),
    /// Exact decimal text such as `-123.45`.
    Decimal(String),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    /// A parent-table value fetched as text.
    Sampled(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// SQL literal for this value.
    pub fn render(&self, dialect: Dialect) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Int(value) => value.to_string(),
            Value::Bool(value) => dialect.bool_literal(*value).to_string(),
            Value::Decimal(value) => value.clone(),
            Value::Text(value) | Value::Sampled(value) => dialect.quote_text(value),
            Value::Bytes(value) => dialect.bytes_literal(value),
            Value::Date(value) => dialect.quote_text(&value.format("%Y-%m-%d").to_string()),
            Value::DateTime(value) => {
                dialect.quote_text(&value.format("%Y-%m-%d %H:%M:%S").to_string())
            }
            Value::Time(value) => dialect.quote_text(&value.format("%H:%M:%S").to_string()),
        }
    }
}

/// Render a row as a parenthesised tuple.
///
/// Cells that were never filled render as `DEFAULT`.
pub fn render_row(cells: &[Option<Value>], dialect: Dialect) -> String {
    let rendered: Vec<String> = cells
        .iter()
        .map(|cell| match cell {
            Some(value) => value.render(dialect),
            None => "DEFAULT".to_string(),
        })
        .collect();
    format!("({})", rendered.join(","))
}
