//! Trait seams for the external reasoning and embedding services.
//!
//! The pipeline treats both capabilities as black boxes: any implementation
//! of [`GenerativeModel`] / [`EmbeddingProvider`] can be swapped in without
//! the segmenter, reviewer, or persist stage changing. [`gemini`] provides
//! the production REST implementation; tests inject scripted fakes.

pub mod gemini;

use async_trait::async_trait;

use crate::types::PipelineError;

/// Text-in, text-out access to the reasoning service.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Sends one prompt and returns the raw response text. The caller is
    /// responsible for stripping fences and parsing structure.
    async fn generate(&self, prompt: &str) -> Result<String, PipelineError>;
}

/// Text-in, vector-out access to the embedding service.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds one text into a fixed-length vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PipelineError>;
}

/// Strips a wrapping markdown code fence from a service reply.
///
/// Models routinely wrap the requested raw JSON in ```` ```json … ``` ````
/// despite instructions not to. Only an outer fence is removed; fences inside
/// the payload are left alone.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "JSON", or nothing) up to the first newline.
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.trim().strip_suffix("```").map_or_else(
        || body.trim(),
        |without_close| without_close.trim(),
    )
}
