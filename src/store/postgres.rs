//! Postgres/pgvector chunk store.

use async_trait::async_trait;
use pgvector::Vector;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use tracing::instrument;

use super::ConflictPolicy;
use crate::config::StoreSettings;
use crate::model::Chunk;
use crate::types::PipelineError;

/// Postgres-backed [`super::ChunkStore`] with schema bootstrap.
///
/// The pool is acquired once per persist run and released when the store is
/// dropped, on every exit path.
pub struct PgChunkStore {
    pool: PgPool,
    policy: ConflictPolicy,
}

impl PgChunkStore {
    /// Connects and ensures the vector extension and chunk table exist.
    ///
    /// `embedding_dim` fixes the dimensionality of the `embedding` column;
    /// vectors of any other length are rejected by the database.
    #[instrument(skip(settings), err)]
    pub async fn connect(
        settings: &StoreSettings,
        embedding_dim: usize,
        policy: ConflictPolicy,
    ) -> Result<Self, PipelineError> {
        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .database(&settings.database)
            .username(&settings.user)
            .password(&settings.password)
            .ssl_mode(parse_ssl_mode(&settings.sslmode)?);

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await
            .map_err(|err| PipelineError::StoreWrite(format!("connect error: {err}")))?;

        ensure_schema(&pool, embedding_dim).await?;

        Ok(Self { pool, policy })
    }
}

#[async_trait]
impl super::ChunkStore for PgChunkStore {
    #[instrument(
        skip(self, chunk, embedding),
        fields(chunk_id = %chunk.chunk_id, source_file = %chunk.source_file),
        err
    )]
    async fn upsert_chunk(&self, chunk: &Chunk, embedding: &[f32]) -> Result<(), PipelineError> {
        // Single statement, auto-committed: chunk k's failure can never roll
        // back or block its neighbours.
        sqlx::query(upsert_sql(self.policy))
            .bind(chunk.chunk_id)
            .bind(&chunk.source_file)
            .bind(chunk.doc_type.as_str())
            .bind(&chunk.section_title)
            .bind(chunk.chunk_index as i64)
            .bind(chunk.self_contained)
            .bind(&chunk.missing_context)
            .bind(&chunk.summary)
            .bind(&chunk.text)
            .bind(&chunk.embed_input)
            .bind(Vector::from(embedding.to_vec()))
            .execute(&self.pool)
            .await
            .map_err(|err| PipelineError::StoreWrite(format!("upsert chunk: {err}")))?;
        Ok(())
    }
}

fn upsert_sql(policy: ConflictPolicy) -> &'static str {
    match policy {
        ConflictPolicy::Replace => {
            r#"
            INSERT INTO document_chunks (
                chunk_id, source_file, doc_type, section_title,
                chunk_index, self_contained, missing_context,
                summary, text, embed_input, embedding
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (chunk_id) DO UPDATE SET
                source_file     = EXCLUDED.source_file,
                doc_type        = EXCLUDED.doc_type,
                section_title   = EXCLUDED.section_title,
                chunk_index     = EXCLUDED.chunk_index,
                self_contained  = EXCLUDED.self_contained,
                missing_context = EXCLUDED.missing_context,
                summary         = EXCLUDED.summary,
                text            = EXCLUDED.text,
                embed_input     = EXCLUDED.embed_input,
                embedding       = EXCLUDED.embedding
            "#
        }
        ConflictPolicy::Ignore => {
            r#"
            INSERT INTO document_chunks (
                chunk_id, source_file, doc_type, section_title,
                chunk_index, self_contained, missing_context,
                summary, text, embed_input, embedding
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (chunk_id) DO NOTHING
            "#
        }
    }
}

async fn ensure_schema(pool: &PgPool, embedding_dim: usize) -> Result<(), PipelineError> {
    if embedding_dim == 0 {
        return Err(PipelineError::StoreWrite(
            "embedding dimension must be positive".to_string(),
        ));
    }

    sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
        .execute(pool)
        .await
        .map_err(|err| PipelineError::StoreWrite(format!("ensure vector extension: {err}")))?;

    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS document_chunks (
            chunk_id        UUID PRIMARY KEY,
            source_file     TEXT NOT NULL,
            doc_type        TEXT NOT NULL,
            section_title   TEXT NOT NULL,
            chunk_index     BIGINT NOT NULL,
            self_contained  BOOLEAN NOT NULL,
            missing_context TEXT,
            summary         TEXT NOT NULL,
            text            TEXT NOT NULL,
            embed_input     TEXT NOT NULL,
            embedding       VECTOR({embedding_dim}) NOT NULL
        )
        "#
    );
    sqlx::query(&ddl)
        .execute(pool)
        .await
        .map_err(|err| PipelineError::StoreWrite(format!("ensure chunk table: {err}")))?;

    Ok(())
}

fn parse_ssl_mode(raw: &str) -> Result<PgSslMode, PipelineError> {
    match raw.to_ascii_lowercase().as_str() {
        "disable" => Ok(PgSslMode::Disable),
        "allow" => Ok(PgSslMode::Allow),
        "prefer" => Ok(PgSslMode::Prefer),
        "require" => Ok(PgSslMode::Require),
        "verify-ca" => Ok(PgSslMode::VerifyCa),
        "verify-full" => Ok(PgSslMode::VerifyFull),
        other => Err(PipelineError::ConfigurationInvalid(format!(
            "unknown DB_SSLMODE '{other}'"
        ))),
    }
}
