//! Self-containment review with a pass-through fallback.
//!
//! Each section gets one reasoning-service request asking whether it stands
//! on its own, and a repaired version when it does not. The review is total:
//! any parse or transport failure degrades to the unmodified section with the
//! title as its summary, so a flaky service can cost enrichment quality but
//! never data.

use std::sync::Arc;

use tracing::warn;

use crate::model::ReviewResult;
use crate::reasoning::{GenerativeModel, strip_code_fences};
use crate::types::PipelineError;

/// Upper bound on how much of the previous section is sent as context.
/// Local context only — the reviewer never sees the whole document.
const PREVIOUS_CONTEXT_LIMIT: usize = 1500;

pub struct SectionReviewer {
    model: Arc<dyn GenerativeModel>,
}

impl SectionReviewer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Reviews one section. Never fails: on any service or parse error the
    /// section passes through unmodified and the failure is logged with
    /// enough detail to reprocess later.
    pub async fn review(
        &self,
        title: &str,
        content: &str,
        previous_content: Option<&str>,
    ) -> ReviewResult {
        match self.try_review(title, content, previous_content).await {
            Ok(result) => result.normalized(title, content),
            Err(err) => {
                warn!(
                    section_title = title,
                    error = %err,
                    "review failed; passing section through unmodified"
                );
                ReviewResult::pass_through(title, content)
            }
        }
    }

    async fn try_review(
        &self,
        title: &str,
        content: &str,
        previous_content: Option<&str>,
    ) -> Result<ReviewResult, PipelineError> {
        let prompt = review_prompt(title, content, previous_content);
        let raw = self.model.generate(&prompt).await?;
        let stripped = strip_code_fences(&raw);
        serde_json::from_str(stripped).map_err(|err| {
            PipelineError::ServiceUnparseable(format!(
                "review reply is not a valid verdict object: {err}"
            ))
        })
    }
}

fn review_prompt(title: &str, content: &str, previous_content: Option<&str>) -> String {
    let context_block = match previous_content {
        Some(previous) => format!(
            "\n<previous_section>\n{}\n</previous_section>\n",
            truncate_chars(previous, PREVIOUS_CONTEXT_LIMIT)
        ),
        None => String::new(),
    };

    format!(
        r#"You are reviewing a chunk of technical documentation for a RAG system.
Assess whether this chunk is self-contained and meaningful on its own.
{context_block}
<current_chunk_title>{title}</current_chunk_title>
<current_chunk_body>
{content}
</current_chunk_body>

Answer ONLY with a valid JSON object with these exact fields:
- "self_contained": true or false
- "missing_context": short string explaining what is missing, or null if self_contained
- "summary": one sentence describing what question this chunk answers
- "enriched_text": if NOT self_contained, rewrite by prepending a brief context sentence. If self_contained, return the original body unchanged.

Return only raw JSON, no markdown fences, no explanation."#
    )
}

/// Char-boundary-safe prefix truncation.
fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_offset, _)) => &text[..byte_offset],
        None => text,
    }
}
