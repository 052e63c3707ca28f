//! Document segmentation via the reasoning service.
//!
//! One request per document: the full text goes out with partitioning
//! instructions, an ordered JSON array of `{title, content}` sections comes
//! back. Malformed output is a hard failure for the document — a silent retry
//! could produce a different partition, so the caller decides what to do.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::model::{Section, sections_cover_source};
use crate::reasoning::{GenerativeModel, strip_code_fences};
use crate::types::PipelineError;

pub struct Segmenter {
    model: Arc<dyn GenerativeModel>,
}

impl Segmenter {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Splits `document_text` into ordered topical sections.
    ///
    /// The filename is passed to the service as context only; it is never
    /// parsed. Returns `ServiceUnparseable` when the reply is not a valid
    /// section array and `InvalidDocument` for empty input.
    pub async fn segment(
        &self,
        document_text: &str,
        filename: &str,
    ) -> Result<Vec<Section>, PipelineError> {
        if document_text.trim().is_empty() {
            return Err(PipelineError::InvalidDocument(format!(
                "{filename}: document text is empty"
            )));
        }

        let prompt = segmentation_prompt(document_text, filename);
        let raw = self.model.generate(&prompt).await?;
        let stripped = strip_code_fences(&raw);

        let sections: Vec<Section> = serde_json::from_str(stripped).map_err(|err| {
            PipelineError::ServiceUnparseable(format!(
                "{filename}: segmentation reply is not a section array: {err}"
            ))
        })?;

        debug!(filename, sections = sections.len(), "segmentation complete");

        if !sections_cover_source(&sections, document_text) {
            warn!(
                filename,
                "segmentation output does not reproduce the source text verbatim"
            );
        }

        Ok(sections)
    }
}

fn segmentation_prompt(document_text: &str, filename: &str) -> String {
    format!(
        r#"You are processing a document to prepare it for a RAG (Retrieval Augmented Generation) system.
Your task is to split the following document into logical, self-contained sections.

Rules:
- Each section should represent one clear topic, concept, or procedure
- Sections should be meaningful on their own — not too small (at least 2-3 sentences) and not too large
- Preserve all the original text, do not summarize or omit anything
- Use the document's own structure as a guide (headings, numbered items, bold titles, topic changes)
- For tables, keep them together with their title/context in the same section

Document filename: {filename}

Document text:
"""
{document_text}
"""

Respond ONLY with a valid JSON array. Each element must have:
- "title": a short descriptive title for the section (your own words, not necessarily from the text)
- "content": the full original text of that section, copied verbatim

Example format:
[
  {{"title": "General Requirements", "content": "...full text..."}},
  {{"title": "Data Fields", "content": "...full text..."}}
]

Return only raw JSON, no markdown fences, no explanation."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct CannedModel(String);

    #[async_trait]
    impl GenerativeModel for CannedModel {
        async fn generate(&self, _prompt: &str) -> Result<String, PipelineError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn parses_fenced_section_array() {
        let reply = "```json\n[{\"title\":\"A\",\"content\":\"AAA.\"}]\n```".to_string();
        let segmenter = Segmenter::new(Arc::new(CannedModel(reply)));
        let sections = segmenter.segment("AAA.", "doc.md").await.unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "A");
        assert_eq!(sections[0].content, "AAA.");
    }

    #[tokio::test]
    async fn malformed_reply_is_unparseable() {
        let segmenter = Segmenter::new(Arc::new(CannedModel("not json at all".to_string())));
        let err = segmenter.segment("text", "doc.md").await.unwrap_err();
        assert!(matches!(err, PipelineError::ServiceUnparseable(_)));
    }

    #[tokio::test]
    async fn empty_document_is_rejected() {
        let segmenter = Segmenter::new(Arc::new(CannedModel("[]".to_string())));
        let err = segmenter.segment("   \n", "doc.md").await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDocument(_)));
    }

    #[test]
    fn prompt_embeds_document_and_filename() {
        let prompt = segmentation_prompt("body text", "guide.md");
        assert!(prompt.contains("guide.md"));
        assert!(prompt.contains("body text"));
        assert!(prompt.contains("JSON array"));
    }
}
