use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use trexa_core::Error;

use super::json_error::{ErrorToResponse, JsonError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    pub top_k: Option<usize>,
}

pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let settings = state.pipeline.search.settings();
    if params.query.trim().is_empty() {
        return JsonError::new("query must not be empty").to_response(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let top_k = params.top_k.unwrap_or(settings.default_top_k);
    if !(1..=settings.max_top_k).contains(&top_k) {
        return JsonError::new(format!("top_k must be between 1 and {}", settings.max_top_k))
            .to_response(StatusCode::UNPROCESSABLE_ENTITY);
    }

    match state.pipeline.search.search(&params.query, top_k).await {
        Ok(results) => Json(json!({ "query": params.query, "results": results })).into_response(),
        Err(Error::NotInitialized) => {
            JsonError::new(Error::NotInitialized.to_string()).to_response(StatusCode::CONFLICT)
        }
        Err(e) => {
            error!("Search failed: {}", e);
            JsonError::new(format!("Search failed: {e}")).to_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
