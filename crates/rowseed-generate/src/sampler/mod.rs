//! Foreign key sampling strategies.
//!
//! A sampler fills the cells of one foreign key across every row of a chunk
//! with values read from the referenced table.

use async_trait::async_trait;

use rowseed_core::ForeignKey;

use crate::connection::{Connection, TextRow};
use crate::errors::GenerationError;
use crate::relationship::RelationshipKind;
use crate::value::Value;

mod random;
mod uniform;

pub use random::RandomSampler;
pub use uniform::UniformSampler;

#[async_trait]
pub trait Sampler: Send + Sync {
    fn kind(&self) -> RelationshipKind;

    /// Operation name reported when sampling fails.
    fn name(&self) -> &'static str;

    /// Fill `rows`, one slice per target row holding one cell per foreign
    /// key column. `first_row` is the run-wide index of `rows[0]`.
    async fn sample(
        &self,
        foreign_key: &ForeignKey,
        first_row: u64,
        rows: &mut [&mut [Option<Value>]],
    ) -> Result<(), GenerationError>;
}

/// Build the sampler for a resolved relationship kind.
pub fn sampler_for<'a>(
    kind: RelationshipKind,
    connection: &'a dyn Connection,
    seed: u64,
) -> Box<dyn Sampler + 'a> {
    match kind {
        RelationshipKind::OneToOne => Box::new(UniformSampler::new(connection)),
        RelationshipKind::RandomOneToMany => Box::new(RandomSampler::new(connection, seed)),
    }
}

/// Copy one parent row into a target row slice.
fn fill_row(
    target: &mut [Option<Value>],
    parent: &TextRow,
    foreign_key: &ForeignKey,
) -> Result<(), GenerationError> {
    if parent.len() != target.len() {
        return Err(GenerationError::ParentShape {
            table: parent_table(foreign_key),
            found: parent.len(),
            expected: target.len(),
        });
    }

    for (cell, value) in target.iter_mut().zip(parent) {
        *cell = Some(match value {
            Some(text) => Value::Sampled(text.clone()),
            None => Value::Null,
        });
    }
    Ok(())
}

fn parent_table(foreign_key: &ForeignKey) -> String {
    format!(
        "{}.{}",
        foreign_key.referenced_schema, foreign_key.referenced_table
    )
}
