use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use rowseed_core::ForeignKey;

use super::{Sampler, fill_row, parent_table};
use crate::connection::Connection;
use crate::errors::GenerationError;
use crate::generators::{row_seed, table_seed};
use crate::relationship::RelationshipKind;
use crate::value::Value;

/// Independent random parent per child row, drawn from a server-side sample.
pub struct RandomSampler<'a> {
    connection: &'a dyn Connection,
    seed: u64,
}

impl<'a> RandomSampler<'a> {
    pub fn new(connection: &'a dyn Connection, seed: u64) -> Self {
        Self { connection, seed }
    }
}

#[async_trait]
impl Sampler for RandomSampler<'_> {
    fn kind(&self) -> RelationshipKind {
        RelationshipKind::RandomOneToMany
    }

    fn name(&self) -> &'static str {
        "random 1-N sampling"
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

        let dialect = self.connection.dialect();
        let query = dialect.random_sample_query(
            &foreign_key.referenced_schema,
            &foreign_key.referenced_table,
            &foreign_key.referenced_columns,
            rows.len(),
        );
        let mut parents = self.connection.fetch_text_rows(&query).await?;

        if parents.is_empty() {
            debug!(
                table = %parent_table(foreign_key),
                "random sample returned no rows, falling back to random ordering"
            );
            let query = dialect.random_order_query(
                &foreign_key.referenced_schema,
                &foreign_key.referenced_table,
                &foreign_key.referenced_columns,
                rows.len(),
            );
            parents = self.connection.fetch_text_rows(&query).await?;
        }

        if parents.is_empty() {
            return Err(GenerationError::EmptyParent {
                table: parent_table(foreign_key),
            });
        }

        let seed = row_seed(table_seed(self.seed, &foreign_key.describe()), first_row);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for row in rows.iter_mut() {
            let parent = &parents[rng.random_range(0..parents.len())];
            fill_row(row, parent, foreign_key)?;
        }

        Ok(())
    }
}
