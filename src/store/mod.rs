//! Storage seam for embedded chunks.
//!
//! [`ChunkStore`] abstracts the persistent store so the embedding stage can
//! run against fakes in tests; [`postgres::PgChunkStore`] is the production
//! backend (Postgres with pgvector).

pub mod postgres;

use async_trait::async_trait;

use crate::model::Chunk;
use crate::types::PipelineError;

pub use postgres::PgChunkStore;

/// What an upsert does when the `chunk_id` row already exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Overwrite every column with the incoming values (last write wins).
    #[default]
    Replace,
    /// Keep the existing row untouched.
    Ignore,
}

/// Write access to the chunk table, keyed by `chunk_id`.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Upserts one chunk row together with its embedding. Each call is a
    /// single immediately-committed write: a failure affects only this chunk.
    async fn upsert_chunk(&self, chunk: &Chunk, embedding: &[f32]) -> Result<(), PipelineError>;
}
