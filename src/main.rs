use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rag_assistant::llm::OllamaClient;
use rag_assistant::rag::embeddings::FastEmbedder;
use rag_assistant::rag::RagService;
use rag_assistant::{server, Assistant, Settings};

#[derive(Parser, Debug)]
#[command(name = "rag-assistant")]
#[command(about = "Document-grounded learning assistant API")]
struct Args {
    /// Optional TOML settings file; missing files are skipped
    #[arg(short, long, env = "RAG_ASSISTANT_CONFIG", default_value = "rag-assistant.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rag_assistant=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let settings = Settings::load(Some(&args.config))?;

    let embedder = FastEmbedder::new(&settings.embedding_model, &settings.embedding_model_dir)
        .context("Failed to initialize embedding model")?;

    tracing::info!("Using LLM {} at {}", settings.llm_model, settings.llm_base_url);
    let llm = OllamaClient::new(settings.llm_base_url.clone(), settings.llm_model.clone());

    let rag = RagService::new(
        Arc::new(embedder),
        Arc::new(llm),
        settings.similarity_search_k,
        settings.engine_cache_capacity,
    );

    let bind_address = settings.bind_address();
    let assistant = Arc::new(Assistant::new(settings, rag));
    let app = server::router(assistant);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
