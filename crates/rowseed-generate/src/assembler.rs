use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use rowseed_core::{Column, Table};

use crate::connection::Connection;
use crate::errors::GenerationError;
use crate::generators::{GeneratorContext, generate_row, row_seed, table_seed};
use crate::model::InsertOptions;
use crate::relationship::RelationshipPolicy;
use crate::sampler::sampler_for;
use crate::value::{Value, render_row};

/// Rows generated between two scheduler yields.
const YIELD_EVERY: usize = 64;

type Cells<'r> = &'r mut [Option<Value>];

/// Builds the INSERT statement for one chunk of a table.
///
/// Every row is laid out as the generated columns followed by the foreign key
/// columns in constraint order, matching the column list of the header.
pub struct RowAssembler<'a> {
    table: &'a Table,
    connection: &'a dyn Connection,
    policy: &'a RelationshipPolicy,
    generate: Vec<&'a Column>,
    sample_width: usize,
    ctx: GeneratorContext,
    seed: u64,
    table_seed: u64,
    header: String,
    trailer: &'static str,
}

impl<'a> RowAssembler<'a> {
    pub fn new(
        table: &'a Table,
        connection: &'a dyn Connection,
        policy: &'a RelationshipPolicy,
        options: &InsertOptions,
    ) -> Self {
        let dialect = connection.dialect();
        let generate = table.columns_to_generate();
        let sample = table.columns_to_sample();

        let names = generate
            .iter()
            .chain(sample.iter())
            .map(|column| column.name.as_str());
        let escaped = dialect.escaped_names(names);
        debug!(
            schema = %table.schema,
            table = %table.name,
            columns = %escaped,
            generated = generate.len(),
            sampled = sample.len(),
            "insert column list"
        );

        let header = dialect.insert_header(
            &table.schema,
            &table.name,
            &escaped,
            options.ignore_duplicates,
        );

        Self {
            table,
            connection,
            policy,
            sample_width: sample.len(),
            generate,
            ctx: options.generator_context(),
            seed: options.seed,
            table_seed: table_seed(options.seed, &table.qualified_name()),
            header,
            trailer: dialect.insert_trailer(options.ignore_duplicates),
        }
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    /// Render the statement for `count` rows starting at run-wide row
    /// `first_row`. Returns `None` when there is nothing to insert.
    pub async fn build_chunk(
        &self,
        first_row: u64,
        count: usize,
    ) -> Result<Option<String>, GenerationError> {
        if count == 0 {
            return Ok(None);
        }

        let width = self.generate.len() + self.sample_width;
        let mut rows: Vec<Vec<Option<Value>>> = vec![vec![None; width]; count];

        let mut generated = Vec::with_capacity(count);
        let mut sampled = Vec::with_capacity(count);
        for row in rows.iter_mut() {
            let (prefix, suffix) = row.split_at_mut(self.generate.len());
            generated.push(prefix);
            sampled.push(suffix);
        }

        let ((), sampling) = tokio::join!(
            self.generate_rows(first_row, generated),
            self.sample_rows(first_row, sampled),
        );
        sampling?;

        let dialect = self.connection.dialect();
        let capacity = self.header.len() + count * (width * 8 + 3);
        let mut statement = String::with_capacity(capacity);
        statement.push_str(&self.header);
        for (index, row) in rows.iter().enumerate() {
            if index > 0 {
                statement.push(',');
            }
            statement.push_str(&render_row(row, dialect));
        }
        statement.push_str(self.trailer);

        Ok(Some(statement))
    }

    async fn generate_rows(&self, first_row: u64, rows: Vec<Cells<'_>>) {
        if self.generate.is_empty() {
            return;
        }

        for (offset, cells) in rows.into_iter().enumerate() {
            let row_index = first_row + offset as u64;
            let mut rng = ChaCha8Rng::seed_from_u64(row_seed(self.table_seed, row_index));
            generate_row(&self.generate, &self.ctx, cells, &mut rng);

            if (offset + 1) % YIELD_EVERY == 0 {
                tokio::task::yield_now().await;
            }
        }
    }

    async fn sample_rows(
        &self,
        first_row: u64,
        mut rows: Vec<Cells<'_>>,
    ) -> Result<(), GenerationError> {
        if self.sample_width == 0 {
            return Ok(());
        }

        let mut start = 0;
        for foreign_key in &self.table.foreign_keys {
            let end = start + foreign_key.columns.len();
            let mut view: Vec<Cells<'_>> =
                rows.iter_mut().map(|row| &mut row[start..end]).collect();

            let kind = self
                .policy
                .resolve(&self.table.name, &foreign_key.referenced_table);
            let sampler = sampler_for(kind, self.connection, self.seed);
            debug!(
                table = %self.table.qualified_name(),
                constraint = %foreign_key.describe(),
                relationship = %kind,
                rows = view.len(),
                "sampling foreign key"
            );

            sampler
                .sample(foreign_key, first_row, &mut view)
                .await
                .map_err(|source| GenerationError::Sampling {
                    operation: sampler.name(),
                    constraint: foreign_key.describe(),
                    source: Box::new(source),
                })?;

            start = end;
        }

        Ok(())
    }
}
