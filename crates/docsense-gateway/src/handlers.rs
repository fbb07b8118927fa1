use crate::server::AppState;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use docsense_core::DocsenseError;
use docsense_ingest::derive_document_id;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Body of `POST /upload`: already-extracted plain document text.
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    /// Original filename, folded into the document id.
    pub filename: String,
    /// Full document text.
    pub text: String,
}

/// Body of `POST /ask`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// The question to answer.
    pub question: String,
    /// Which indexed document to answer from.
    pub document_id: String,
}

/// Body of `POST /extract`.
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    /// Which indexed document to extract from.
    pub document_id: String,
}

/// Maps domain errors onto HTTP statuses with a JSON `error` body.
fn error_response(error: &DocsenseError) -> (StatusCode, String) {
    let status = match error {
        DocsenseError::NotFound(_) => StatusCode::NOT_FOUND,
        DocsenseError::Validation(_) => StatusCode::BAD_REQUEST,
        DocsenseError::Upstream(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        serde_json::json!({"error": error.to_string()}).to_string(),
    )
}

/// `GET /health`: liveness probe.
pub async fn health_handler() -> impl IntoResponse {
    serde_json::json!({"status": "healthy", "service": "docsense"}).to_string()
}

/// `POST /upload`: chunk, embed and index one document.
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UploadRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() {
        warn!(filename = %req.filename, "Upload rejected: empty text");
        return error_response(&DocsenseError::Validation(
            "Document text must not be empty".to_string(),
        ));
    }

    let document_id = derive_document_id(req.text.as_bytes(), &req.filename);
    let chunks = state.chunker.chunk(&req.text, &document_id);
    let chunks_count = chunks.len();

    if let Err(e) = state
        .indexer
        .index_document(&document_id, chunks, req.text)
        .await
    {
        warn!(document_id = %document_id, error = %e, "Indexing failed");
        return error_response(&e);
    }

    info!(
        document_id = %document_id,
        filename = %req.filename,
        chunks = chunks_count,
        "Document uploaded"
    );

    (
        StatusCode::OK,
        serde_json::json!({
            "status": "success",
            "document_id": document_id,
            "filename": req.filename,
            "chunks_count": chunks_count,
            "message": "Document uploaded and indexed successfully",
        })
        .to_string(),
    )
}

/// `POST /ask`: answer a question against one indexed document.
pub async fn ask_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> impl IntoResponse {
    let outcome = match state.pipeline.ask(&req.question, &req.document_id).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(document_id = %req.document_id, error = %e, "Ask failed");
            return error_response(&e);
        }
    };

    match serde_json::to_string(&outcome) {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => error_response(&DocsenseError::Json(e)),
    }
}

/// `POST /extract`: pull structured shipment fields from an indexed document.
pub async fn extract_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExtractRequest>,
) -> impl IntoResponse {
    let text = match state.store.full_text(&req.document_id).await {
        Ok(text) => text,
        Err(e) => {
            warn!(document_id = %req.document_id, error = %e, "Extract failed");
            return error_response(&e);
        }
    };
    if text.trim().is_empty() {
        return error_response(&DocsenseError::Validation(
            "Document has no text to extract from".to_string(),
        ));
    }

    let fields = state.extractor.extract(&text);
    info!(document_id = %req.document_id, "Structured extraction complete");

    match serde_json::to_string(&serde_json::json!({
        "status": "success",
        "data": fields,
    })) {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => error_response(&DocsenseError::Json(e)),
    }
}
