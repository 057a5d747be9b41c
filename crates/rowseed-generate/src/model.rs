use chrono::Datelike;

use crate::generators::{GeneratorContext, NULL_PROBABILITY};

/// Per-run options for an insert.
#[derive(Debug, Clone)]
pub struct InsertOptions {
    /// Run seed; together with the table and row index it fixes every value.
    pub seed: u64,
    pub null_probability: f64,
    /// Render `INSERT IGNORE` / `ON CONFLICT DO NOTHING`.
    pub ignore_duplicates: bool,
    /// Upper bound for `year` columns; the current UTC year when unset.
    pub current_year: Option<i32>,
}

impl Default for InsertOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            null_probability: NULL_PROBABILITY,
            ignore_duplicates: false,
            current_year: None,
        }
    }
}

impl InsertOptions {
    pub(crate) fn generator_context(&self) -> GeneratorContext {
        let year = self
            .current_year
            .unwrap_or_else(|| chrono::Utc::now().year());
        GeneratorContext::new(year, self.null_probability)
    }
}
