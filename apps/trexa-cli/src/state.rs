use std::path::PathBuf;
use std::sync::Arc;

use trexa_core::config::Settings;
use trexa_index::Pipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub graph_output: PathBuf,
}

impl AppState {
    pub fn new(pipeline: Pipeline, settings: &Settings) -> Self {
        Self { pipeline: Arc::new(pipeline), graph_output: settings.graph_output() }
    }
}
