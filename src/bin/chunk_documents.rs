//! Segmentation + review batch run: folder of documents in, JSON artifacts out.

use std::sync::Arc;

use docsmith::config::ChunkerSettings;
use docsmith::pipeline::DocumentPipeline;
use docsmith::reasoning::gemini::GeminiClient;
use docsmith::types::PipelineError;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let settings = ChunkerSettings::from_env()?;
    let model = Arc::new(GeminiClient::new(&settings.gemini)?);
    let pipeline = DocumentPipeline::new(model);

    let report = pipeline
        .run_batch(&settings.input_dir, &settings.output_dir)
        .await?;

    println!("\nChunking complete");
    println!("  documents processed : {}", report.documents_processed);
    println!("  documents failed    : {}", report.documents_failed);
    println!("  chunks written      : {}", report.chunks_written);
    println!(
        "  enriched / passed   : {} / {}",
        report.chunks_enriched,
        report.chunks_passed_through()
    );
    println!("  output folder       : {}", settings.output_dir.display());

    Ok(())
}

fn init_tracing() {
    let subscriber = FmtSubscriber::builder().with_env_filter("info").finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
