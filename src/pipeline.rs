//! Pipeline orchestrator: Segmenter → Reviewer → chunk records → artifacts.
//!
//! Control flow is strictly linear per document. A segmentation failure is
//! contained here — the document contributes zero chunks and the batch moves
//! on — while review failures never surface at all (the reviewer degrades
//! internally). The JSON artifacts written by [`DocumentPipeline::run_batch`]
//! are the sole hand-off to the embedding stage; no database is touched.

use std::path::Path;
use std::sync::Arc;

use tokio::fs;
use tracing::{error, info, warn};

use crate::model::{Chunk, DocType};
use crate::reasoning::GenerativeModel;
use crate::reviewer::SectionReviewer;
use crate::segmenter::Segmenter;
use crate::types::PipelineError;

/// Combined artifact name; per-document artifacts use `<stem>_chunks.json`.
pub const COMBINED_ARTIFACT: &str = "all_chunks.json";

/// Counters reported at the end of a segmentation + review run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub documents_processed: usize,
    pub documents_failed: usize,
    pub chunks_written: usize,
    pub chunks_enriched: usize,
}

impl BatchReport {
    /// Chunks that were kept as-is (self-contained verdicts and review
    /// fallbacks alike).
    pub fn chunks_passed_through(&self) -> usize {
        self.chunks_written - self.chunks_enriched
    }
}

pub struct DocumentPipeline {
    segmenter: Segmenter,
    reviewer: SectionReviewer,
}

impl DocumentPipeline {
    /// Builds a pipeline where both stages share one reasoning service.
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            segmenter: Segmenter::new(Arc::clone(&model)),
            reviewer: SectionReviewer::new(model),
        }
    }

    /// Segments and reviews one document, returning its assembled chunks.
    ///
    /// Sections with blank content are dropped before review; `chunk_index`
    /// is dense over the kept sequence. Each kept section is reviewed with
    /// the previous raw section's content as local context.
    pub async fn process_document(
        &self,
        text: &str,
        filename: &str,
        doc_type: DocType,
    ) -> Result<Vec<Chunk>, PipelineError> {
        let sections = self.segmenter.segment(text, filename).await?;
        if sections.is_empty() {
            warn!(filename, "segmentation returned no sections");
            return Ok(Vec::new());
        }

        let mut chunks = Vec::with_capacity(sections.len());
        for (raw_index, section) in sections.iter().enumerate() {
            if section.content.trim().is_empty() {
                continue;
            }

            let previous_content = raw_index
                .checked_sub(1)
                .map(|prev| sections[prev].content.as_str());

            let review = self
                .reviewer
                .review(&section.title, &section.content, previous_content)
                .await;

            chunks.push(Chunk::assemble(
                filename,
                doc_type,
                &section.title,
                chunks.len(),
                review,
            ));
        }

        Ok(chunks)
    }

    /// Runs the chunking pass over every `*.md` / `*.txt` file in
    /// `input_dir`, writing one artifact per document plus the combined
    /// artifact into `output_dir`.
    pub async fn run_batch(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<BatchReport, PipelineError> {
        fs::create_dir_all(output_dir).await?;

        let documents = list_documents(input_dir).await?;
        if documents.is_empty() {
            warn!(input_dir = %input_dir.display(), "no .md or .txt files found");
        }

        let mut report = BatchReport::default();
        let mut all_chunks: Vec<Chunk> = Vec::new();

        for path in documents {
            let filename = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .to_string();
            info!(file = %filename, "processing document");

            let text = match fs::read_to_string(&path).await {
                Ok(text) => text,
                Err(err) => {
                    error!(file = %filename, error = %err, "failed to read document");
                    report.documents_failed += 1;
                    continue;
                }
            };

            let doc_type = DocType::classify(&filename);
            let chunks = match self.process_document(&text, &filename, doc_type).await {
                Ok(chunks) => chunks,
                Err(err) => {
                    error!(file = %filename, error = %err, "document failed; continuing batch");
                    report.documents_failed += 1;
                    continue;
                }
            };

            report.documents_processed += 1;
            report.chunks_written += chunks.len();
            report.chunks_enriched += chunks
                .iter()
                .filter(|chunk| !chunk.self_contained)
                .count();

            let stem = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("document");
            let artifact = output_dir.join(format!("{stem}_chunks.json"));
            write_artifact(&artifact, &chunks).await?;
            info!(file = %filename, chunks = chunks.len(), artifact = %artifact.display(), "document complete");

            all_chunks.extend(chunks);
        }

        write_artifact(&output_dir.join(COMBINED_ARTIFACT), &all_chunks).await?;

        Ok(report)
    }
}

/// Loads a chunk artifact previously written by [`DocumentPipeline::run_batch`].
pub async fn read_artifact(path: &Path) -> Result<Vec<Chunk>, PipelineError> {
    let data = fs::read_to_string(path).await?;
    serde_json::from_str(&data).map_err(|err| {
        PipelineError::InvalidDocument(format!(
            "{} is not a chunk artifact: {err}",
            path.display()
        ))
    })
}

async fn write_artifact(path: &Path, chunks: &[Chunk]) -> Result<(), PipelineError> {
    let serialized = serde_json::to_string_pretty(chunks)
        .map_err(|err| PipelineError::InvalidDocument(format!("artifact serialization: {err}")))?;
    fs::write(path, serialized).await?;
    Ok(())
}

async fn list_documents(input_dir: &Path) -> Result<Vec<std::path::PathBuf>, PipelineError> {
    let mut entries = fs::read_dir(input_dir).await?;
    let mut documents = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_document = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("txt"));
        if is_document {
            documents.push(path);
        }
    }
    // Deterministic iteration order regardless of directory enumeration.
    documents.sort();
    Ok(documents)
}
