//! Embedding + upsert stage over previously assembled chunk artifacts.
//!
//! This pass is independent of segmentation: it reads chunks, embeds each
//! `embed_input`, and upserts row-by-row. One chunk's failure — embedding
//! call, bad vector, database error — is logged and skipped; the batch never
//! aborts. A fixed pacing delay after each successful embedding call is the
//! only backpressure toward the service's rate ceiling.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::model::Chunk;
use crate::reasoning::EmbeddingProvider;
use crate::store::ChunkStore;
use crate::types::PipelineError;

/// Counters reported at the end of an embedding + persist run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersistReport {
    pub persisted: usize,
    pub skipped: usize,
}

pub struct PersistStage {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn ChunkStore>,
    expected_dim: usize,
    pacing: Duration,
}

impl PersistStage {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn ChunkStore>,
        expected_dim: usize,
        pacing: Duration,
    ) -> Self {
        Self {
            embedder,
            store,
            expected_dim,
            pacing,
        }
    }

    /// Embeds and upserts every chunk, in input order.
    ///
    /// Total: no error escapes. Rerunning over the same (or an overlapping)
    /// chunk set converges to one row per `chunk_id` because the store upsert
    /// is keyed by the stable id.
    pub async fn persist_all(&self, chunks: &[Chunk]) -> PersistReport {
        let mut report = PersistReport::default();

        for (position, chunk) in chunks.iter().enumerate() {
            info!(
                position = position + 1,
                total = chunks.len(),
                section_title = %chunk.section_title,
                "embedding chunk"
            );

            match self.embed_and_upsert(chunk).await {
                Ok(()) => report.persisted += 1,
                Err(err) => {
                    warn!(
                        chunk_id = %chunk.chunk_id,
                        source_file = %chunk.source_file,
                        chunk_index = chunk.chunk_index,
                        error = %err,
                        "chunk skipped; continuing with the rest of the batch"
                    );
                    report.skipped += 1;
                }
            }
        }

        report
    }

    async fn embed_and_upsert(&self, chunk: &Chunk) -> Result<(), PipelineError> {
        let embedding = self.embedder.embed(&chunk.embed_input).await?;
        if embedding.len() != self.expected_dim {
            return Err(PipelineError::ServiceUnparseable(format!(
                "embedding has {} dimensions, store expects {}",
                embedding.len(),
                self.expected_dim
            )));
        }

        // Pacing applies only after a successful embedding call.
        if !self.pacing.is_zero() {
            sleep(self.pacing).await;
        }

        self.store.upsert_chunk(chunk, &embedding).await
    }
}
