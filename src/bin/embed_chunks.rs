//! Embedding + persist batch run: chunk artifact in, pgvector rows out.

use std::sync::Arc;

use docsmith::config::EmbedSettings;
use docsmith::persist::PersistStage;
use docsmith::pipeline::read_artifact;
use docsmith::reasoning::gemini::GeminiClient;
use docsmith::store::PgChunkStore;
use docsmith::types::PipelineError;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let settings = EmbedSettings::from_env()?;
    let chunks = read_artifact(&settings.chunks_file).await?;
    println!(
        "Loaded {} chunks from {}",
        chunks.len(),
        settings.chunks_file.display()
    );

    let embedder = Arc::new(GeminiClient::new(&settings.gemini)?);
    let store = Arc::new(
        PgChunkStore::connect(
            &settings.store,
            settings.gemini.embedding_dim,
            settings.conflict_policy,
        )
        .await?,
    );

    let stage = PersistStage::new(
        embedder,
        store,
        settings.gemini.embedding_dim,
        settings.pacing,
    );
    let report = stage.persist_all(&chunks).await;

    println!("\nPersist complete");
    println!("  chunks persisted : {}", report.persisted);
    println!("  chunks skipped   : {}", report.skipped);

    Ok(())
}

fn init_tracing() {
    let subscriber = FmtSubscriber::builder().with_env_filter("info").finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
