use chrono::Datelike;
use rand::Rng;
use tracing::{error, warn};

use rowseed_core::{Column, DataType};

use crate::value::Value;

pub mod primitives;

use primitives::{
    random_binary, random_date, random_datetime, random_decimal, random_enum, random_int_range,
    random_string, random_time, random_year,
};

/// Chance that a nullable column receives `NULL` instead of a generated value.
pub const NULL_PROBABILITY: f64 = 0.1;

/// Run-wide inputs shared by every generator call.
#[derive(Debug, Clone)]
pub struct GeneratorContext {
    /// Year used by the `year` generator as the upper bound.
    pub current_year: i32,
    pub null_probability: f64,
}

impl GeneratorContext {
    pub fn new(current_year: i32, null_probability: f64) -> Self {
        Self {
            current_year,
            null_probability: null_probability.clamp(0.0, 1.0),
        }
    }
}

impl Default for GeneratorContext {
    fn default() -> Self {
        Self::new(chrono::Utc::now().year(), NULL_PROBABILITY)
    }
}

/// Produce one value for `column`.
///
/// Returns `None` when the column type has no generator; the cell is then
/// left for the database to fill with its default.
pub fn generate_value(
    column: &Column,
    ctx: &GeneratorContext,
    rng: &mut impl Rng,
) -> Option<Value> {
    let bounds = &column.column_type;
    let kind = bounds.kind();

    if let DataType::Unsupported(data_type) = &kind {
        error!(
            column = %column.name,
            data_type = %data_type,
            "unsupported data type when generating fields"
        );
        return None;
    }

    if column.is_nullable && rng.random_bool(ctx.null_probability) {
        return Some(Value::Null);
    }

    let value = match kind {
        DataType::TinyInt => Value::Int(random_int_range(0, 1, rng)),
        DataType::Boolean => Value::Bool(random_int_range(0, 1, rng) == 1),
        DataType::Integer(width) => Value::Int(random_int_range(0, width.max_value(), rng)),
        DataType::Decimal => Value::Decimal(random_decimal(
            bounds.numeric_precision,
            bounds.numeric_scale,
            rng,
        )),
        DataType::String | DataType::Text => {
            Value::Text(random_string(bounds.character_max_length, rng))
        }
        DataType::Binary => Value::Bytes(random_binary(bounds.character_max_length, rng)),
        DataType::Date => Value::Date(random_date(rng)),
        DataType::DateTime => Value::DateTime(random_datetime(rng)),
        DataType::Time => Value::Time(random_time(rng)),
        DataType::Year => Value::Int(random_year(ctx.current_year, rng)),
        DataType::Enum => match random_enum(&bounds.enum_values, rng) {
            Some(label) => Value::Text(label),
            None => {
                warn!(column = %column.name, "enum column declares no values");
                return None;
            }
        },
        DataType::Unsupported(_) => return None,
    };

    Some(value)
}

/// Fill one row prefix, one cell per column.
pub fn generate_row(
    columns: &[&Column],
    ctx: &GeneratorContext,
    cells: &mut [Option<Value>],
    rng: &mut impl Rng,
) {
    for (cell, column) in cells.iter_mut().zip(columns) {
        *cell = generate_value(column, ctx, rng);
    }
}

/// Stable per-table seed derived from the run seed (FNV-1a over the key).
pub fn table_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Seed for the row at `row_index` within a run, independent of chunking.
pub fn row_seed(table_seed: u64, row_index: u64) -> u64 {
    let hash = table_seed ^ row_index.wrapping_mul(0x9e3779b97f4a7c15);
    hash.wrapping_mul(0x100000001b3)
}
