//! Command-line entry point: loads the TOML config, wires the components and
//! serves the HTTP gateway.

use clap::{Parser, Subcommand};
use docsense_answer::{
    AnswerPipeline, GenerationConfig, GuardrailConfig, GuardrailEvaluator, OpenRouterGenerator,
    TextGenerator,
};
use docsense_extract::ShipmentExtractor;
use docsense_gateway::{AppState, GatewayServer};
use docsense_ingest::{Chunker, ChunkerConfig};
use docsense_retrieval::{DocumentIndexer, DocumentStore, HashedEmbedding, Retriever};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docsense", about = "Docsense - logistics document Q&A service")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "docsense.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct DocsenseConfig {
    server: ServerConfig,
    chunker: ChunkerConfig,
    retrieval: RetrievalConfig,
    guardrails: GuardrailConfig,
    generation: GenerationConfig,
}

#[derive(Deserialize)]
struct ServerConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Deserialize)]
struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_top_k() -> usize {
    3
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();

    // Missing config file means defaults across the board.
    let config: DocsenseConfig = match tokio::fs::read_to_string(&cli.config).await {
        Ok(raw) => toml::from_str(&raw).map_err(|e| {
            anyhow::anyhow!("Failed to parse config '{}': {e}", cli.config.display())
        })?,
        Err(_) => {
            info!(config = %cli.config.display(), "Config file not found, using defaults");
            DocsenseConfig::default()
        }
    };

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);

            let mut generation = config.generation;
            if generation.api_key.is_empty() {
                if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
                    generation.api_key = key;
                }
            }
            let generator: Option<Arc<dyn TextGenerator>> = if generation.api_key.is_empty() {
                info!("No generation API key configured, answers use keyword extraction");
                None
            } else {
                info!(model = %generation.model_id, "Text generation enabled");
                Some(Arc::new(OpenRouterGenerator::new(generation)?))
            };

            let embedder = Arc::new(HashedEmbedding::default());
            let store = Arc::new(DocumentStore::new());
            let indexer = DocumentIndexer::new(store.clone(), embedder.clone());
            let retriever = Arc::new(Retriever::new(store.clone(), embedder));
            let pipeline = AnswerPipeline::new(
                retriever,
                generator,
                GuardrailEvaluator::new(config.guardrails),
                config.retrieval.top_k,
            );

            let state = Arc::new(AppState {
                chunker: Chunker::new(config.chunker),
                store,
                indexer,
                pipeline,
                extractor: ShipmentExtractor::new()?,
            });
            let app = GatewayServer::build(state);

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("Docsense gateway listening on {}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
