use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{graph, indexing, search};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/index", post(indexing::index_directory))
        .route("/reindex", post(indexing::reindex_file))
        .route("/delete", post(indexing::delete_file))
        .route("/status", get(indexing::status))
        .route("/search", get(search::search))
        .route("/graph", post(graph::generate_graph))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
