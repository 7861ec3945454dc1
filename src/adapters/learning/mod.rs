//! Learning persistence adapters.
//!
//! - `InMemoryLearningStore` - single-mutex store for development and tests
//! - `PostgresLearningStore` - JSONB documents with row-level locking

mod in_memory;
mod postgres;

pub use in_memory::InMemoryLearningStore;
pub use postgres::PostgresLearningStore;
