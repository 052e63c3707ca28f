//! Gemini REST client implementing both service traits.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{EmbeddingProvider, GenerativeModel};
use crate::config::GeminiSettings;
use crate::types::PipelineError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for the Gemini `generateContent` and `embedContent` endpoints.
///
/// The base URL is configurable so tests can point at a mock server.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: String,
    generation_model: String,
    embedding_model: String,
    embedding_dim: usize,
}

impl GeminiClient {
    pub fn new(settings: &GeminiSettings) -> Result<Self, PipelineError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| {
                PipelineError::ServiceUnavailable(format!("failed to build HTTP client: {err}"))
            })?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            generation_model: settings.generation_model.clone(),
            embedding_model: settings.embedding_model.clone(),
            embedding_dim: settings.embedding_dim,
        })
    }

    fn endpoint(&self, model: &str, verb: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, model, verb)
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R, PipelineError>
    where
        B: Serialize,
        R: for<'de> Deserialize<'de>,
    {
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(PipelineError::ServiceUnavailable(format!(
                "service returned {status}: {body}"
            )));
        }

        response
            .json::<R>()
            .await
            .map_err(|err| PipelineError::ServiceUnparseable(err.to_string()))
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, PipelineError> {
        let url = self.endpoint(&self.generation_model, "generateContent");
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };
        let parsed: GenerateResponse = self.post_json(&url, &body).await?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| {
                PipelineError::ServiceUnparseable("generation response had no candidates".into())
            })
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PipelineError> {
        let url = self.endpoint(&self.embedding_model, "embedContent");
        let body = EmbedRequest {
            content: Content {
                parts: vec![Part { text }],
            },
            output_dimensionality: Some(self.embedding_dim),
        };
        let parsed: EmbedResponse = self.post_json(&url, &body).await?;
        if parsed.embedding.values.is_empty() {
            return Err(PipelineError::ServiceUnparseable(
                "embedding response had no values".into(),
            ));
        }
        Ok(parsed.embedding.values)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest<'a> {
    content: Content<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dimensionality: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}
