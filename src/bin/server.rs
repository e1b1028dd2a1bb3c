//! RAG server binary
//!
//! Run with: cargo run --bin docqa-server

use std::path::PathBuf;

use docqa_rag::config::RagConfig;
use docqa_rag::server::RagServer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docqa_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Optional TOML config; env vars override either way
    let config_path = std::env::var("DOCQA_CONFIG").ok().map(PathBuf::from);
    let config = RagConfig::load(config_path.as_deref())?;

    tracing::info!("configuration loaded");
    tracing::info!("  - embedding model: {} ({} dims)", config.embedding.model, config.embedding.dimensions);
    tracing::info!("  - generation model: {}", config.generation.model);
    tracing::info!("  - chunking: {} chars, {} overlap", config.chunking.chunk_size, config.chunking.chunk_overlap);
    tracing::info!("  - data dir: {}", config.storage.data_dir.display());

    if config.generation.api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY not set; queries will return sources without generated answers");
    }

    // Probe the embedding backend so a dead Ollama shows up at startup
    // rather than on the first upload
    let client = reqwest::Client::new();
    match client
        .get(format!("{}/api/tags", config.embedding.base_url))
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => {
            tracing::info!("embedding backend reachable at {}", config.embedding.base_url);
        }
        _ => {
            tracing::warn!("embedding backend not reachable at {}", config.embedding.base_url);
            tracing::warn!("start it with: ollama serve && ollama pull {}", config.embedding.model);
        }
    }

    let server = RagServer::new(config)?;

    println!("\nServer starting on http://{}", server.address());
    println!("  POST   /api/upload - upload a document");
    println!("  POST   /api/query  - ask a question");
    println!("  GET    /api/status - store statistics");
    println!("  DELETE /api/clear  - wipe the store\n");

    server.start().await?;

    Ok(())
}
