//! Environment-driven configuration for the two batch entry points.
//!
//! Settings are loaded once at startup and passed explicitly into the
//! pipeline and store constructors so tests can substitute fakes without
//! touching the environment. Binaries call `dotenvy::dotenv().ok()` before
//! [`ChunkerSettings::from_env`] / [`EmbedSettings::from_env`] so a local
//! `.env` file works the same as exported variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::store::ConflictPolicy;
use crate::types::PipelineError;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GENERATION_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_EMBEDDING_MODEL: &str = "gemini-embedding-001";
pub const DEFAULT_EMBEDDING_DIM: usize = 3072;
pub const DEFAULT_PACING_MS: u64 = 500;

/// Credentials and model selection for the reasoning/embedding service.
#[derive(Clone, Debug)]
pub struct GeminiSettings {
    pub api_key: String,
    pub base_url: String,
    pub generation_model: String,
    pub embedding_model: String,
    pub embedding_dim: usize,
}

impl GeminiSettings {
    pub fn from_env() -> Result<Self, PipelineError> {
        Ok(Self {
            api_key: require("GEMINI_API_KEY")?,
            base_url: env_or("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            generation_model: env_or("GEMINI_GENERATION_MODEL", DEFAULT_GENERATION_MODEL),
            embedding_model: env_or("GEMINI_EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            embedding_dim: parse_or("EMBEDDING_DIM", DEFAULT_EMBEDDING_DIM)?,
        })
    }
}

/// Connection parameters for the pgvector-backed Postgres store.
#[derive(Clone, Debug)]
pub struct StoreSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub sslmode: String,
}

impl StoreSettings {
    pub fn from_env() -> Result<Self, PipelineError> {
        Ok(Self {
            host: require("DB_HOST")?,
            port: parse_required("DB_PORT")?,
            database: require("DB_NAME")?,
            user: require("DB_USER")?,
            password: require("DB_PASSWORD")?,
            sslmode: env_or("DB_SSLMODE", "require"),
        })
    }
}

/// Settings for the segmentation + review run (`docsmith-chunk`).
#[derive(Clone, Debug)]
pub struct ChunkerSettings {
    pub gemini: GeminiSettings,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl ChunkerSettings {
    pub fn from_env() -> Result<Self, PipelineError> {
        Ok(Self {
            gemini: GeminiSettings::from_env()?,
            input_dir: PathBuf::from(require("CHUNKER_INPUT_FOLDER")?),
            output_dir: PathBuf::from(require("CHUNKER_OUTPUT_FOLDER")?),
        })
    }
}

/// Settings for the embedding + persist run (`docsmith-embed`).
#[derive(Clone, Debug)]
pub struct EmbedSettings {
    pub gemini: GeminiSettings,
    pub store: StoreSettings,
    pub chunks_file: PathBuf,
    pub pacing: Duration,
    pub conflict_policy: ConflictPolicy,
}

impl EmbedSettings {
    /// Loads embed-run settings. `CHUNKS_FILE` wins when set; otherwise the
    /// path is derived as `<CHUNKER_OUTPUT_FOLDER>/all_chunks.json`.
    pub fn from_env() -> Result<Self, PipelineError> {
        let chunks_file = match env::var("CHUNKS_FILE") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => PathBuf::from(require("CHUNKER_OUTPUT_FOLDER")?).join("all_chunks.json"),
        };

        let conflict_policy = match env_or("UPSERT_POLICY", "replace").as_str() {
            "replace" => ConflictPolicy::Replace,
            "ignore" => ConflictPolicy::Ignore,
            other => {
                return Err(PipelineError::ConfigurationInvalid(format!(
                    "UPSERT_POLICY must be 'replace' or 'ignore', got '{other}'"
                )));
            }
        };

        Ok(Self {
            gemini: GeminiSettings::from_env()?,
            store: StoreSettings::from_env()?,
            chunks_file,
            pacing: Duration::from_millis(parse_or("EMBED_PACING_MS", DEFAULT_PACING_MS)?),
            conflict_policy,
        })
    }
}

fn require(name: &'static str) -> Result<String, PipelineError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(PipelineError::ConfigurationMissing(name)),
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_or<T>(name: &'static str, default: T) -> Result<T, PipelineError>
where
    T: std::str::FromStr,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse::<T>().map_err(|_| {
            PipelineError::ConfigurationInvalid(format!("{name} has an unparseable value '{raw}'"))
        }),
        _ => Ok(default),
    }
}

fn parse_required<T>(name: &'static str) -> Result<T, PipelineError>
where
    T: std::str::FromStr,
{
    let raw = require(name)?;
    raw.trim().parse::<T>().map_err(|_| {
        PipelineError::ConfigurationInvalid(format!("{name} has an unparseable value '{raw}'"))
    })
}
