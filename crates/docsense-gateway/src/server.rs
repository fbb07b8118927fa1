use crate::handlers::{ask_handler, extract_handler, health_handler, upload_handler};
use axum::routing::{get, post};
use axum::Router;
use docsense_answer::AnswerPipeline;
use docsense_extract::ShipmentExtractor;
use docsense_ingest::Chunker;
use docsense_retrieval::{DocumentIndexer, DocumentStore};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    /// Splits uploaded text into retrieval chunks.
    pub chunker: Chunker,
    /// All indexed documents; shared with the indexer and pipeline.
    pub store: Arc<DocumentStore>,
    /// Embeds and stores uploaded documents.
    pub indexer: DocumentIndexer,
    /// The retrieve, guard, generate, score flow for `/ask`.
    pub pipeline: AnswerPipeline,
    /// Rule-based shipment-field extraction for `/extract`.
    pub extractor: ShipmentExtractor,
}

/// The document question-answering HTTP server.
pub struct GatewayServer;

impl GatewayServer {
    /// Builds the router over already-wired components.
    pub fn build(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/upload", post(upload_handler))
            .route("/ask", post(ask_handler))
            .route("/extract", post(extract_handler))
            .route("/health", get(health_handler))
            .with_state(state)
    }
}
