//! Random row generation and batched insertion.
//!
//! An [`Insert`] splits a row count into bulk INSERT statements. For each
//! chunk the [`RowAssembler`] fills generated columns and foreign key columns
//! concurrently, the latter by sampling the referenced tables through a
//! [`Connection`].

pub mod assembler;
pub mod connection;
pub mod dialect;
pub mod errors;
pub mod generators;
pub mod insert;
pub mod model;
pub mod planner;
pub mod relationship;
pub mod sampler;
pub mod value;

pub use assembler::RowAssembler;
pub use connection::{Connection, MySqlDatabase, Offline, PostgresDatabase, TextRow, connect};
pub use dialect::Dialect;
pub use errors::{GenerationError, RunError};
pub use generators::NULL_PROBABILITY;
pub use insert::Insert;
pub use model::InsertOptions;
pub use planner::{ChunkPlan, plan_chunks};
pub use relationship::{Links, RelationshipKind, RelationshipPolicy, parse_links};
pub use value::Value;
