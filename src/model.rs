//! Data model for the chunk-production pipeline.
//!
//! A [`Section`] is the ephemeral segmentation unit, a [`ReviewResult`] is the
//! ephemeral review verdict, and a [`Chunk`] is the durable retrieval unit
//! that flows through the JSON artifacts into the vector store. Embeddings
//! are never part of `Chunk`; the persist stage pairs each chunk with its
//! vector only for the duration of the upsert.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One topical section of a source document, as returned by the segmenter.
///
/// Sections partition the document: concatenating their `content` in order
/// must reproduce the source text. See [`sections_cover_source`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
}

/// Verdict of the self-containment review for a single section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub self_contained: bool,
    pub missing_context: Option<String>,
    pub summary: String,
    pub enriched_text: String,
}

impl ReviewResult {
    /// The degraded verdict used whenever the review service fails: the
    /// section passes through unmodified with its title as the summary.
    pub fn pass_through(title: &str, content: &str) -> Self {
        Self {
            self_contained: true,
            missing_context: None,
            summary: title.to_string(),
            enriched_text: content.to_string(),
        }
    }

    /// Enforces the review invariants on service output.
    ///
    /// A self-contained verdict must carry no `missing_context` and must keep
    /// the original content untouched. A not-self-contained verdict must name
    /// what is missing and must preserve the original content inside
    /// `enriched_text`; a reply that paraphrased the body away is repaired by
    /// re-appending the original after the service's text. An empty summary
    /// or enriched text is replaced with the title / original content, so
    /// downstream stages never see a hollow record.
    pub fn normalized(mut self, title: &str, content: &str) -> Self {
        if self.summary.trim().is_empty() {
            self.summary = title.to_string();
        }
        if self.self_contained {
            self.missing_context = None;
            self.enriched_text = content.to_string();
        } else {
            if self
                .missing_context
                .as_deref()
                .is_none_or(|context| context.trim().is_empty())
            {
                self.missing_context = Some("not described by the review service".to_string());
            }
            if self.enriched_text.trim().is_empty() {
                self.enriched_text = content.to_string();
            } else if !self.enriched_text.contains(content) {
                // The service text becomes the context prefix; the original
                // body must survive verbatim.
                self.enriched_text = format!("{}\n\n{}", self.enriched_text.trim_end(), content);
            }
        }
        self
    }
}

/// Coarse document category, assigned by static filename lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    Faq,
    ErrorGuide,
    UserGuide,
    Regulation,
    Manual,
}

impl DocType {
    /// Classifies a filename into a document category. Unknown names fall
    /// back to [`DocType::Manual`].
    pub fn classify(filename: &str) -> Self {
        let name = filename.to_lowercase();
        if name.contains("faq") {
            DocType::Faq
        } else if name.contains("error") {
            DocType::ErrorGuide
        } else if name.contains("cartilla") {
            DocType::UserGuide
        } else if name.contains("comunicacion") {
            DocType::Regulation
        } else {
            DocType::Manual
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Faq => "faq",
            DocType::ErrorGuide => "error_guide",
            DocType::UserGuide => "user_guide",
            DocType::Regulation => "regulation",
            DocType::Manual => "manual",
        }
    }
}

/// The durable retrieval unit: one reviewed section plus its metadata.
///
/// `chunk_id` is generated once at assembly and never recomputed, so
/// re-persisting the same chunk replaces rather than duplicates its row.
/// `(source_file, chunk_index)` is unique and contiguous per document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: Uuid,
    pub source_file: String,
    pub doc_type: DocType,
    pub section_title: String,
    pub chunk_index: usize,
    pub self_contained: bool,
    pub missing_context: Option<String>,
    pub summary: String,
    pub text: String,
    pub embed_input: String,
}

impl Chunk {
    /// Assembles a chunk from a reviewed section, minting a fresh id.
    ///
    /// `embed_input` is derived here as `summary + "\n\n" + text` and must be
    /// recomputed whenever either part changes.
    pub fn assemble(
        source_file: &str,
        doc_type: DocType,
        section_title: &str,
        chunk_index: usize,
        review: ReviewResult,
    ) -> Self {
        let embed_input = format!("{}\n\n{}", review.summary, review.enriched_text);
        Self {
            chunk_id: Uuid::new_v4(),
            source_file: source_file.to_string(),
            doc_type,
            section_title: section_title.to_string(),
            chunk_index,
            self_contained: review.self_contained,
            missing_context: review.missing_context,
            summary: review.summary,
            text: review.enriched_text,
            embed_input,
        }
    }
}

/// Returns `true` when the sections, concatenated in order, reproduce the
/// source text. Comparison ignores whitespace runs so formatting-only
/// differences introduced by the service do not count as dropped text.
pub fn sections_cover_source(sections: &[Section], source: &str) -> bool {
    let joined: String = sections
        .iter()
        .map(|section| section.content.as_str())
        .collect();
    squash_whitespace(&joined) == squash_whitespace(source)
}

fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
