use std::path::PathBuf;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use trexa_index::IndexOutcome;

use super::json_error::{status_code, ErrorToResponse, StatusError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IndexRequest {
    #[serde(default)]
    pub folder_path: String,
}

#[derive(Debug, Deserialize)]
pub struct FileRequest {
    #[serde(default)]
    pub file_path: String,
}

fn missing(field: &str) -> Response {
    StatusError::new(format!("Missing '{field}' in request body")).to_response(StatusCode::BAD_REQUEST)
}

pub async fn index_directory(State(state): State<AppState>, Json(body): Json<IndexRequest>) -> Response {
    if body.folder_path.trim().is_empty() {
        return missing("folder_path");
    }
    let root = PathBuf::from(&body.folder_path);
    match state.pipeline.indexer.index_directory(&root).await {
        Ok(report) => Json(json!({ "status": "success", "report": report })).into_response(),
        Err(e) => {
            error!("Indexing {} failed: {}", root.display(), e);
            StatusError::new(e.to_string()).to_response(status_code(&e))
        }
    }
}

pub async fn reindex_file(State(state): State<AppState>, Json(body): Json<FileRequest>) -> Response {
    if body.file_path.trim().is_empty() {
        return missing("file_path");
    }
    let outcome = match state.pipeline.indexer.reindex_file(&PathBuf::from(&body.file_path)).await {
        Ok(outcome) => outcome,
        Err(e) => return StatusError::new(e.to_string()).to_response(status_code(&e)),
    };
    let body = match outcome {
        None => json!({ "status": "success", "outcome": "missing" }),
        Some(IndexOutcome::Indexed { chunks }) => json!({ "status": "success", "outcome": "indexed", "chunks": chunks }),
        Some(IndexOutcome::Skipped(reason)) => {
            json!({ "status": "success", "outcome": "skipped", "reason": format!("{reason:?}") })
        }
    };
    Json(body).into_response()
}

pub async fn delete_file(State(state): State<AppState>, Json(body): Json<FileRequest>) -> Response {
    if body.file_path.trim().is_empty() {
        return missing("file_path");
    }
    match state.pipeline.indexer.delete_file(&PathBuf::from(&body.file_path)).await {
        Ok(()) => Json(json!({ "status": "success" })).into_response(),
        Err(e) => StatusError::new(e.to_string()).to_response(status_code(&e)),
    }
}

pub async fn status(State(state): State<AppState>) -> Response {
    Json(state.pipeline.indexer.status().await).into_response()
}
