//! Error taxonomy shared by every pipeline stage.

use thiserror::Error;

/// Errors produced while chunking, embedding, or persisting documents.
///
/// The propagation policy differs per stage: configuration errors abort the
/// run before any work starts, segmentation errors are fatal for a single
/// document, and review/embedding/store errors are recovered locally by the
/// calling stage (pass-through fallback or skip-and-continue).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The reasoning or embedding service replied, but the payload could not
    /// be parsed into the expected structure.
    #[error("service returned unparseable output: {0}")]
    ServiceUnparseable(String),

    /// Transport-level failure talking to an external service. Timeouts land
    /// here as well.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Database failure during schema bootstrap or a chunk upsert.
    #[error("store write failed: {0}")]
    StoreWrite(String),

    /// A required environment variable is absent. Fatal at startup.
    #[error("missing required configuration: {0} is not set")]
    ConfigurationMissing(&'static str),

    /// A configuration value is present but unusable. Fatal at startup.
    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),

    /// The source document could not be used (unreadable, empty, bad path).
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        PipelineError::ServiceUnavailable(err.to_string())
    }
}
