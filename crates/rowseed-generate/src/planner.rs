use crate::errors::GenerationError;

/// Decomposition of a row count into bulk statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    pub bulk_size: u64,
    /// Statements carrying exactly `bulk_size` rows.
    pub full_chunks: u64,
    /// Rows in the trailing statement; zero means there is none.
    pub remainder: u64,
}

impl ChunkPlan {
    /// Chunk sizes in execution order.
    pub fn chunks(self) -> impl Iterator<Item = u64> {
        let bulk_size = self.bulk_size;
        let remainder = (self.remainder > 0).then_some(self.remainder);
        (0..self.full_chunks).map(move |_| bulk_size).chain(remainder)
    }

    pub fn statement_count(&self) -> u64 {
        self.full_chunks + u64::from(self.remainder > 0)
    }

    pub fn total_rows(&self) -> u64 {
        self.full_chunks * self.bulk_size + self.remainder
    }
}

/// Split `total` rows into statements of `bulk_size` rows plus a remainder.
pub fn plan_chunks(total: u64, bulk_size: u64) -> Result<ChunkPlan, GenerationError> {
    if bulk_size == 0 {
        return Err(GenerationError::InvalidArgument(
            "bulk size must be at least 1".to_string(),
        ));
    }

    let full_chunks = total / bulk_size;
    Ok(ChunkPlan {
        bulk_size,
        full_chunks,
        remainder: total - full_chunks * bulk_size,
    })
}
