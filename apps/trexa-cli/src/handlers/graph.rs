use std::path::PathBuf;

use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GraphRequest {
    pub path: String,
}

/// Build the file-tree graph and persist it; failures come back in the body.
pub async fn generate_graph(State(state): State<AppState>, Json(body): Json<GraphRequest>) -> Response {
    let root = PathBuf::from(body.path);
    let output = state.graph_output.clone();
    let built = tokio::task::spawn_blocking(move || trexa_graph::build_and_write(&root, &output)).await;
    let body = match built {
        Ok(Ok(graph)) => json!({ "status": "success", "graph": graph }),
        Ok(Err(e)) => json!({ "status": "error", "message": e.to_string() }),
        Err(e) => json!({ "status": "error", "message": e.to_string() }),
    };
    Json(body).into_response()
}
