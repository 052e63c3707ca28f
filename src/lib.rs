//! ```text
//! Input folder (*.md / *.txt) ──► pipeline::DocumentPipeline
//!                                      │
//!                  ┌───────────────────┤
//!                  ▼                   ▼
//!        segmenter::Segmenter   reviewer::SectionReviewer
//!        (one LLM call / doc)   (one LLM call / section,
//!                                pass-through on failure)
//!                  │                   │
//!                  └────────┬──────────┘
//!                           ▼
//!              model::Chunk records ──► <stem>_chunks.json + all_chunks.json
//!
//! all_chunks.json ──► persist::PersistStage ──► store::postgres::PgChunkStore
//!                     (embed + upsert,          (pgvector, keyed by chunk_id)
//!                      per-chunk isolation)
//! ```
//!
pub mod config;
pub mod model;
pub mod persist;
pub mod pipeline;
pub mod reasoning;
pub mod reviewer;
pub mod segmenter;
pub mod store;
pub mod types;

pub use model::{Chunk, DocType, ReviewResult, Section};
pub use persist::{PersistReport, PersistStage};
pub use pipeline::{BatchReport, DocumentPipeline};
pub use reasoning::{EmbeddingProvider, GenerativeModel, gemini::GeminiClient};
pub use store::{ChunkStore, ConflictPolicy};
pub use types::PipelineError;
