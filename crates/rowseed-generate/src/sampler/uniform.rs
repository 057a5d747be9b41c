use async_trait::async_trait;

use rowseed_core::ForeignKey;

use super::{Sampler, fill_row, parent_table};
use crate::connection::Connection;
use crate::errors::GenerationError;
use crate::relationship::RelationshipKind;
use crate::value::Value;

/// Child row `i` of the run takes parent row `i`, ordered by the referenced
/// columns. One query per chunk.
pub struct UniformSampler<'a> {
    connection: &'a dyn Connection,
}

impl<'a> UniformSampler<'a> {
    pub fn new(connection: &'a dyn Connection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl Sampler for UniformSampler<'_> {
    fn kind(&self) -> RelationshipKind {
        RelationshipKind::OneToOne
    }

    fn name(&self) -> &'static str {
        "uniform 1-1 sampling"
    }

    async fn sample(
        &self,
        foreign_key: &ForeignKey,
        first_row: u64,
        rows: &mut [&mut [Option<Value>]],
    ) -> Result<(), GenerationError> {
        if rows.is_empty() {
            return Ok(());
        }

        let query = self.connection.dialect().ordered_query(
            &foreign_key.referenced_schema,
            &foreign_key.referenced_table,
            &foreign_key.referenced_columns,
            rows.len(),
            first_row,
        );
        let parents = self.connection.fetch_text_rows(&query).await?;

        if parents.len() < rows.len() {
            return Err(GenerationError::ParentExhausted {
                table: parent_table(foreign_key),
                offset: first_row,
                available: parents.len(),
                needed: rows.len(),
            });
        }

        for (row, parent) in rows.iter_mut().zip(&parents) {
            fill_row(row, parent, foreign_key)?;
        }

        Ok(())
    }
}
